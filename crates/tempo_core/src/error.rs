//! Core error types

use thiserror::Error;

use crate::time::Time;

/// Errors raised while constructing core values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Interval bounds are inverted, or a degenerate interval is not closed
    #[error("invalid interval from {lower} (included: {lower_included}) to {upper} (included: {upper_included})")]
    InvalidInterval {
        lower: Time,
        upper: Time,
        lower_included: bool,
        upper_included: bool,
    },

    /// A float that has no time equivalent (NaN)
    #[error("cannot convert {0} to a time")]
    InvalidTime(f64),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
