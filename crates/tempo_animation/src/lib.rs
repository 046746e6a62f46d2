//! Tempo Animation
//!
//! Curves, binders, and the updater that keeps animated parameters in sync with time.
//!
//! # Features
//!
//! - **Curves**: constant, piecewise-linear and step keyframes, and per-component vector composites
//! - **Invariance-driven caching**: binders re-evaluate only when time leaves the range
//!   over which their curve is known not to change
//! - **Change notification**: curve edits invalidate exactly the affected time ranges
//! - **Binding blocks**: named, typed parameters bound to curves by name
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use tempo_animation::{ConstantCurve, SharedCurve, Updater};
//! use tempo_core::{Time, Type};
//!
//! let updater = Updater::new();
//! let curve = SharedCurve::new(ConstantCurve::with_value(123.0));
//!
//! let received = Rc::new(Cell::new(0.0));
//! let sink = received.clone();
//! let _binder = updater
//!     .bind(curve, Type::Number, move |v| sink.set(v.as_number().unwrap_or_default()))
//!     .unwrap();
//!
//! updater.update(Time::ZERO);
//! assert_eq!(received.get(), 123.0);
//! ```

pub mod binder;
pub mod binding;
pub mod config;
pub mod curve;
pub mod error;
pub mod keyframe;
pub mod shared;
pub mod updater;

pub use binder::Binder;
pub use binding::{BindingBlock, TypeSolver};
pub use config::{AnimationConfig, ConfigError, TimeConfig, UpdaterConfig};
pub use curve::{ComboVectorCurve, ConstantCurve, Curve};
pub use error::{AnimationError, Result};
pub use keyframe::{find_keyframe_index, KFLinearCurve, KFStepCurve, Keyframe, KeyframeTrack};
pub use shared::{ListenerId, SharedCurve};
pub use updater::{BinderId, Updater};
