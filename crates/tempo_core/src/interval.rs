//! Time intervals
//!
//! An [`Interval`] is never empty: construction rejects inverted bounds and
//! degenerate intervals that are not closed. Operations whose result could be
//! empty return `Option<Interval>` instead.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::time::Time;

/// A non-empty range of [`Time`] with per-end inclusion flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    lower: Time,
    upper: Time,
    lower_included: bool,
    upper_included: bool,
}

impl Interval {
    /// Every time, `[MIN, MAX]`
    pub const UNIVERSAL: Interval = Interval {
        lower: Time::MIN,
        upper: Time::MAX,
        lower_included: true,
        upper_included: true,
    };

    pub fn new(lower: Time, upper: Time, lower_included: bool, upper_included: bool) -> Result<Self> {
        let valid = match lower.cmp(&upper) {
            Ordering::Less => true,
            Ordering::Equal => lower_included && upper_included,
            Ordering::Greater => false,
        };
        if !valid {
            return Err(CoreError::InvalidInterval {
                lower,
                upper,
                lower_included,
                upper_included,
            });
        }
        Ok(Self {
            lower,
            upper,
            lower_included,
            upper_included,
        })
    }

    /// `[lower, upper]`
    pub fn closed(lower: Time, upper: Time) -> Result<Self> {
        Self::new(lower, upper, true, true)
    }

    /// `[time, time]`
    pub fn point(time: Time) -> Self {
        Self {
            lower: time,
            upper: time,
            lower_included: true,
            upper_included: true,
        }
    }

    /// Build from bounds already known to describe a non-empty range
    fn from_bounds(lower: Bound, upper: Bound) -> Option<Self> {
        Self::new(lower.time, upper.time, lower.included, upper.included).ok()
    }

    pub fn lower(&self) -> Time {
        self.lower
    }

    pub fn upper(&self) -> Time {
        self.upper
    }

    pub fn lower_included(&self) -> bool {
        self.lower_included
    }

    pub fn upper_included(&self) -> bool {
        self.upper_included
    }

    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    pub fn is_universal(&self) -> bool {
        *self == Self::UNIVERSAL
    }

    pub fn contains(&self, time: Time) -> bool {
        let above_lower = if self.lower_included {
            self.lower <= time
        } else {
            self.lower < time
        };
        let below_upper = if self.upper_included {
            time <= self.upper
        } else {
            time < self.upper
        };
        above_lower && below_upper
    }

    /// Whether every time in `other` is also in `self`
    pub fn includes(&self, other: &Interval) -> bool {
        cmp_lower(self.lower_bound(), other.lower_bound()) != Ordering::Greater
            && cmp_upper(self.upper_bound(), other.upper_bound()) != Ordering::Less
    }

    /// The overlap of two intervals.
    ///
    /// A shared boundary time is kept only when both intervals include it, so
    /// `[0, 1)` and `[1, 2]` do not intersect.
    pub fn get_intersection(&self, other: &Interval) -> Option<Interval> {
        let lower = max_lower(self.lower_bound(), other.lower_bound());
        let upper = min_upper(self.upper_bound(), other.upper_bound());
        Self::from_bounds(lower, upper)
    }

    /// Everything before this interval.
    ///
    /// The adjoining bound is excluded when `self` includes it and included
    /// otherwise. `None` when nothing precedes (e.g. `self` includes `MIN`).
    pub fn get_precedings(&self) -> Option<Interval> {
        Self::from_bounds(
            Bound::new(Time::MIN, true),
            Bound::new(self.lower, !self.lower_included),
        )
    }

    /// Everything after this interval; see [`Interval::get_precedings`]
    pub fn get_followings(&self) -> Option<Interval> {
        Self::from_bounds(
            Bound::new(self.upper, !self.upper_included),
            Bound::new(Time::MAX, true),
        )
    }

    /// Whether the union of `self` and `other` is one contiguous range
    pub fn is_contiguous_with(&self, other: &Interval) -> bool {
        touches(self.upper_bound(), other.lower_bound()) && touches(other.upper_bound(), self.lower_bound())
    }

    /// Smallest interval covering both
    pub fn get_hull(&self, other: &Interval) -> Interval {
        let lower = min_lower(self.lower_bound(), other.lower_bound());
        let upper = max_upper(self.upper_bound(), other.upper_bound());
        Interval {
            lower: lower.time,
            upper: upper.time,
            lower_included: lower.included,
            upper_included: upper.included,
        }
    }

    pub(crate) fn lower_bound(&self) -> Bound {
        Bound::new(self.lower, self.lower_included)
    }

    pub(crate) fn upper_bound(&self) -> Bound {
        Bound::new(self.upper, self.upper_included)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_included { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_included { ']' } else { ')' }
        )
    }
}

/// One end of an interval
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Bound {
    pub time: Time,
    pub included: bool,
}

impl Bound {
    pub fn new(time: Time, included: bool) -> Self {
        Self { time, included }
    }
}

/// Order lower bounds by where they start; an included bound starts first
pub(crate) fn cmp_lower(a: Bound, b: Bound) -> Ordering {
    a.time.cmp(&b.time).then_with(|| b.included.cmp(&a.included))
}

/// Order upper bounds by where they end; an included bound ends last
pub(crate) fn cmp_upper(a: Bound, b: Bound) -> Ordering {
    a.time.cmp(&b.time).then_with(|| a.included.cmp(&b.included))
}

fn max_lower(a: Bound, b: Bound) -> Bound {
    if cmp_lower(a, b) == Ordering::Less {
        b
    } else {
        a
    }
}

fn min_lower(a: Bound, b: Bound) -> Bound {
    if cmp_lower(a, b) == Ordering::Greater {
        b
    } else {
        a
    }
}

fn min_upper(a: Bound, b: Bound) -> Bound {
    if cmp_upper(a, b) == Ordering::Greater {
        b
    } else {
        a
    }
}

fn max_upper(a: Bound, b: Bound) -> Bound {
    if cmp_upper(a, b) == Ordering::Less {
        b
    } else {
        a
    }
}

/// Whether a range ending at `upper` leaves no gap before a range starting at `lower`
fn touches(upper: Bound, lower: Bound) -> bool {
    match upper.time.cmp(&lower.time) {
        Ordering::Greater => true,
        Ordering::Equal => upper.included || lower.included,
        Ordering::Less => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: i64) -> Time {
        Time::from(n)
    }

    fn ival(l: i64, u: i64, li: bool, ui: bool) -> Interval {
        Interval::new(t(l), t(u), li, ui).unwrap()
    }

    #[test]
    fn test_construction_rules() {
        assert!(Interval::new(t(2), t(1), true, true).is_err());
        assert!(Interval::new(t(1), t(1), true, false).is_err());
        assert!(Interval::new(t(1), t(1), false, false).is_err());
        assert!(Interval::new(t(1), t(1), true, true).unwrap().is_point());
        assert!(Interval::new(t(1), t(2), false, false).is_ok());
    }

    #[test]
    fn test_intersection_overlap() {
        let i1 = ival(123, 345, true, true);
        let i2 = ival(234, 456, true, true);
        let x = i1.get_intersection(&i2).unwrap();
        assert_eq!(x, ival(234, 345, true, true));
        assert_eq!(i2.get_intersection(&i1), Some(x));
    }

    #[test]
    fn test_intersection_boundary_flags() {
        // shared boundary survives only if both include it
        assert_eq!(
            ival(0, 1, true, true).get_intersection(&ival(1, 2, true, true)),
            Some(Interval::point(t(1)))
        );
        assert_eq!(ival(0, 1, true, false).get_intersection(&ival(1, 2, true, true)), None);
        assert_eq!(ival(0, 1, true, true).get_intersection(&ival(1, 2, false, true)), None);
        assert_eq!(
            ival(0, 2, true, false).get_intersection(&ival(0, 2, false, true)),
            Some(ival(0, 2, false, false))
        );
        assert_eq!(ival(0, 1, true, true).get_intersection(&ival(3, 4, true, true)), None);
    }

    #[test]
    fn test_precedings_followings() {
        let open = ival(0, 1, false, false);
        assert_eq!(
            open.get_precedings(),
            Some(Interval::new(Time::MIN, t(0), true, true).unwrap())
        );
        assert_eq!(
            open.get_followings(),
            Some(Interval::new(t(1), Time::MAX, true, true).unwrap())
        );

        let closed = ival(0, 1, true, true);
        assert_eq!(
            closed.get_precedings(),
            Some(Interval::new(Time::MIN, t(0), true, false).unwrap())
        );
        assert_eq!(
            closed.get_followings(),
            Some(Interval::new(t(1), Time::MAX, false, true).unwrap())
        );

        assert_eq!(Interval::UNIVERSAL.get_precedings(), None);
        assert_eq!(Interval::UNIVERSAL.get_followings(), None);
        assert_eq!(Interval::point(Time::MIN).get_precedings(), None);
        assert_eq!(Interval::point(Time::MAX).get_followings(), None);
    }

    #[test]
    fn test_contains_and_includes() {
        let i = ival(0, 10, false, true);
        assert!(!i.contains(t(0)));
        assert!(i.contains(t(10)));
        assert!(i.includes(&ival(1, 10, true, true)));
        assert!(!i.includes(&ival(0, 10, true, true)));
        assert!(Interval::UNIVERSAL.includes(&i));
    }

    #[test]
    fn test_contiguity() {
        assert!(ival(0, 1, true, false).is_contiguous_with(&ival(1, 2, true, true)));
        assert!(!ival(0, 1, true, false).is_contiguous_with(&ival(1, 2, false, true)));
        assert!(ival(0, 5, true, true).is_contiguous_with(&ival(2, 3, true, true)));
        assert!(!ival(0, 1, true, true).is_contiguous_with(&ival(2, 3, true, true)));
        assert_eq!(
            ival(0, 1, false, false).get_hull(&ival(1, 2, true, false)),
            ival(0, 2, false, false)
        );
    }
}
