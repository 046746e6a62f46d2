//! Exact animation time
//!
//! [`Time`] wraps a [`Decimal`] so that repeated stepping (`t + dt` every frame)
//! never accumulates binary floating-point error. Two sentinels stand for the
//! unbounded past and future; arithmetic saturates at them.

use std::fmt;
use std::ops::{Add, Sub};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::{CoreError, Result};

/// Decimal places kept by [`Time::from_number`]
pub const DEFAULT_TIME_SCALE: u32 = 9;

/// Largest scale a [`Decimal`] can carry
pub const MAX_TIME_SCALE: u32 = 28;

/// A point on the animation time axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(Decimal);

impl Time {
    /// The unbounded past
    pub const MIN: Time = Time(Decimal::MIN);
    /// The unbounded future
    pub const MAX: Time = Time(Decimal::MAX);
    pub const ZERO: Time = Time(Decimal::ZERO);

    /// Convert a float, keeping [`DEFAULT_TIME_SCALE`] decimal places.
    ///
    /// Infinities and out-of-range magnitudes saturate to [`Time::MIN`] / [`Time::MAX`];
    /// NaN maps to [`Time::ZERO`]. Use [`Time::try_from_number`] to reject NaN.
    pub fn from_number(n: f64) -> Self {
        Self::from_number_with_scale(n, DEFAULT_TIME_SCALE)
    }

    /// Like [`Time::from_number`] with an explicit number of decimal places
    pub fn from_number_with_scale(n: f64, scale: u32) -> Self {
        match Self::try_from_number_with_scale(n, scale) {
            Ok(time) => time,
            Err(_) => {
                tracing::warn!("NaN converted to time zero");
                Self::ZERO
            }
        }
    }

    pub fn try_from_number(n: f64) -> Result<Self> {
        Self::try_from_number_with_scale(n, DEFAULT_TIME_SCALE)
    }

    pub fn try_from_number_with_scale(n: f64, scale: u32) -> Result<Self> {
        if n.is_nan() {
            return Err(CoreError::InvalidTime(n));
        }
        let time = match Decimal::from_f64(n) {
            Some(d) => Time(d.round_dp(scale.min(MAX_TIME_SCALE))),
            None if n > 0.0 => Self::MAX,
            None => Self::MIN,
        };
        Ok(time)
    }

    pub const fn from_decimal(d: Decimal) -> Self {
        Time(d)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Nearest float; sentinels become the infinities
    pub fn to_number(&self) -> f64 {
        if *self == Self::MIN {
            f64::NEG_INFINITY
        } else if *self == Self::MAX {
            f64::INFINITY
        } else {
            self.0.to_f64().unwrap_or(0.0)
        }
    }

    #[inline]
    pub fn less_than(&self, other: &Time) -> bool {
        self < other
    }

    #[inline]
    pub fn less_equal(&self, other: &Time) -> bool {
        self <= other
    }

    pub fn is_min(&self) -> bool {
        *self == Self::MIN
    }

    pub fn is_max(&self) -> bool {
        *self == Self::MAX
    }

    /// Position of `self` between `from` and `to` as a fraction (0 at `from`, 1 at `to`).
    ///
    /// The division is exact; only the final result is rounded to a float.
    pub fn fraction_between(&self, from: Time, to: Time) -> f64 {
        let span = to.0.saturating_sub(from.0);
        if span.is_zero() {
            return 0.0;
        }
        let elapsed = self.0.saturating_sub(from.0);
        match elapsed.checked_div(span) {
            Some(ratio) => ratio.to_f64().unwrap_or(0.0),
            None => (self.to_number() - from.to_number()) / (to.to_number() - from.to_number()),
        }
    }
}

impl Add for Time {
    type Output = Time;

    /// Sentinels absorb: `MAX + x == MAX` and `MIN + x == MIN`; the left operand
    /// wins when both are sentinels.
    fn add(self, rhs: Time) -> Time {
        if self.is_min() || self.is_max() {
            return self;
        }
        if rhs.is_min() || rhs.is_max() {
            return rhs;
        }
        Time(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Time {
    type Output = Time;

    /// Sentinels absorb like in [`Add`]; subtracting one yields the opposite sentinel.
    fn sub(self, rhs: Time) -> Time {
        if self.is_min() || self.is_max() {
            return self;
        }
        if rhs.is_max() {
            return Time::MIN;
        }
        if rhs.is_min() {
            return Time::MAX;
        }
        Time(self.0.saturating_sub(rhs.0))
    }
}

impl From<i64> for Time {
    fn from(n: i64) -> Self {
        Time(Decimal::from(n))
    }
}

impl From<Decimal> for Time {
    fn from(d: Decimal) -> Self {
        Time(d)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_min() {
            write!(f, "-inf")
        } else if self.is_max() {
            write!(f, "+inf")
        } else {
            write!(f, "{}", self.0.normalize())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare() {
        let t1 = Time::from_number(123.0);
        let t2 = Time::from_number(567.0);

        assert!(t1.less_than(&t2));
        assert!(!t2.less_than(&t1));
        assert!(t1.less_equal(&t2));
        assert!(!t2.less_equal(&t1));
        assert!(t1.less_equal(&t1));
        assert!(Time::MIN < t1 && t2 < Time::MAX);
    }

    #[test]
    fn test_repeated_stepping_is_exact() {
        let dt = Time::from_number(0.1);
        let mut t = Time::ZERO;
        for _ in 0..10_000 {
            t = t + dt;
        }
        assert_eq!(t, Time::from(1000));
    }

    #[test]
    fn test_saturation() {
        assert_eq!(Time::MAX + Time::from(1), Time::MAX);
        assert_eq!(Time::MIN - Time::from(1), Time::MIN);
        assert_eq!(Time::MAX - Time::from(1), Time::MAX);
        assert_eq!(Time::MIN + Time::from(1), Time::MIN);
        assert_eq!(Time::from(5) - Time::MAX, Time::MIN);
        assert_eq!(Time::from(5) - Time::MIN, Time::MAX);
        assert_eq!(Time::from(5) + Time::MIN, Time::MIN);
        assert_eq!(Time::MAX - Time::MAX, Time::MAX);
        assert_eq!(Time::from_number(f64::INFINITY), Time::MAX);
        assert_eq!(Time::from_number(f64::NEG_INFINITY), Time::MIN);
        assert_eq!(Time::from_number(1e300), Time::MAX);
    }

    #[test]
    fn test_nan_rejected() {
        assert!(matches!(
            Time::try_from_number(f64::NAN),
            Err(CoreError::InvalidTime(_))
        ));
        assert_eq!(Time::from_number(f64::NAN), Time::ZERO);
    }

    #[test]
    fn test_scale_rounds() {
        let t = Time::from_number_with_scale(1.23456, 2);
        assert_eq!(t, Time::from_number(1.23));
    }

    #[test]
    fn test_fraction_between() {
        let t0 = Time::from(10);
        let t1 = Time::from(20);
        assert_eq!(Time::from(15).fraction_between(t0, t1), 0.5);
        assert_eq!(t0.fraction_between(t0, t1), 0.0);
        assert_eq!(t1.fraction_between(t0, t1), 1.0);
        assert_eq!(t0.fraction_between(t0, t0), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Time::from_number(1.5).to_string(), "1.5");
        assert_eq!(Time::MIN.to_string(), "-inf");
        assert_eq!(Time::MAX.to_string(), "+inf");
    }
}
