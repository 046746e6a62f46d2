//! Tempo Core
//!
//! Foundational primitives for the Tempo animation engine:
//!
//! - **Time**: exact decimal time with unbounded past/future sentinels
//! - **Intervals**: non-empty time ranges with per-end inclusion flags
//! - **Invariance**: normalized interval sets describing where a value stays constant
//! - **Types & Values**: the registry of animatable parameter types
//!
//! # Example
//!
//! ```rust
//! use tempo_core::{Interval, Invariance, Time};
//!
//! let mut invariance = Invariance::universal();
//! invariance.remove(Interval::closed(Time::from(1), Time::from(2)).unwrap());
//!
//! assert!(invariance.contains(Time::from(0)));
//! assert!(!invariance.contains(Time::from_number(1.5)));
//! assert_eq!(invariance.len(), 2);
//! ```

pub mod error;
pub mod interval;
pub mod invariance;
pub mod time;
pub mod value;

pub use error::{CoreError, Result};
pub use interval::Interval;
pub use invariance::Invariance;
pub use time::{Time, DEFAULT_TIME_SCALE, MAX_TIME_SCALE};
pub use value::{Components, Type, Value};

/// The unbounded past
pub const MIN_TIME: Time = Time::MIN;

/// The unbounded future
pub const MAX_TIME: Time = Time::MAX;
