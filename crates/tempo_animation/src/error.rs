//! Animation error types

use tempo_core::{CoreError, Type};
use thiserror::Error;

/// Errors raised while building curves or wiring them to parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// The curve cannot produce the requested type
    #[error("curve producing {curve} cannot supply a {requested} parameter")]
    TypeMismatch { requested: Type, curve: Type },

    /// None of a parameter's accepted types is produced by the curve
    #[error("parameter '{parameter}' accepts no type a {curve} curve can supply")]
    NoCompatibleType { parameter: String, curve: Type },

    /// A keyframe curve needs at least one keyframe
    #[error("keyframe curve requires at least one keyframe")]
    InsufficientData,

    /// Keyframe times must be strictly increasing
    #[error("keyframe {index} is not later than the keyframe before it")]
    UnorderedKeyframes { index: usize },

    #[error("keyframe {index} holds a {found} value, expected {expected}")]
    KeyframeType { index: usize, expected: Type, found: Type },

    #[error("keyframe index {index} out of range for {len} keyframes")]
    KeyframeOutOfRange { index: usize, len: usize },

    /// Linear interpolation needs a numeric or vector type
    #[error("{0} values cannot be interpolated")]
    NotInterpolatable(Type),

    #[error("{0} is not a vector type")]
    NotVector(Type),

    #[error("component {index} out of range for a {dimension}-component vector")]
    ComponentOutOfRange { index: usize, dimension: usize },

    /// A mutation was applied to a curve variant that does not support it
    #[error("{operation} is not supported by {curve} curves")]
    UnsupportedOperation {
        operation: &'static str,
        curve: &'static str,
    },

    #[error("unknown animation parameter '{0}'")]
    UnknownParameter(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
