//! Invariance sets
//!
//! An [`Invariance`] records the time ranges over which a value is known not to
//! change. Storage is kept normalized after every mutation:
//!
//! - intervals are sorted by their lower bound
//! - no two intervals overlap
//! - no two intervals are contiguous (those are coalesced on write)
//!
//! Normalization is what makes the set a faithful "point set": two different
//! storages never describe the same times.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::interval::{cmp_lower, cmp_upper, Interval};
use crate::time::Time;

/// A normalized set of disjoint [`Interval`]s
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invariance {
    intervals: SmallVec<[Interval; 4]>,
}

impl Invariance {
    /// An empty set: nothing is known to be invariant
    pub fn new() -> Self {
        Self::default()
    }

    /// The set covering every time
    pub fn universal() -> Self {
        Self::from_interval(Interval::UNIVERSAL)
    }

    pub fn from_interval(interval: Interval) -> Self {
        let mut intervals = SmallVec::new();
        intervals.push(interval);
        Self { intervals }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Stored intervals in ascending order
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Union `interval` into the set, coalescing everything it overlaps or touches
    pub fn write(&mut self, interval: Interval) -> &mut Self {
        let mut merged = interval;
        let mut kept: SmallVec<[Interval; 4]> = SmallVec::with_capacity(self.intervals.len() + 1);

        for stored in self.intervals.drain(..) {
            if stored.is_contiguous_with(&merged) {
                merged = merged.get_hull(&stored);
            } else {
                kept.push(stored);
            }
        }

        let pos = kept.partition_point(|stored| {
            cmp_lower(stored.lower_bound(), merged.lower_bound()) == Ordering::Less
        });
        kept.insert(pos, merged);
        self.intervals = kept;
        self
    }

    /// Subtract `interval` from the set, splitting stored intervals it falls inside
    pub fn remove(&mut self, interval: Interval) -> &mut Self {
        let precedings = interval.get_precedings();
        let followings = interval.get_followings();
        let mut kept: SmallVec<[Interval; 4]> = SmallVec::with_capacity(self.intervals.len() + 1);

        for stored in self.intervals.drain(..) {
            if stored.get_intersection(&interval).is_none() {
                kept.push(stored);
                continue;
            }
            // what survives lies strictly before or strictly after `interval`
            for side in [precedings, followings].into_iter().flatten() {
                if let Some(piece) = stored.get_intersection(&side) {
                    kept.push(piece);
                }
            }
        }

        self.intervals = kept;
        self
    }

    /// The part of this set that lies within `interval`
    pub fn get_narrowed(&self, interval: &Interval) -> Invariance {
        Invariance {
            intervals: self
                .intervals
                .iter()
                .filter_map(|stored| stored.get_intersection(interval))
                .collect(),
        }
    }

    /// Times invariant in both `self` and `other`
    pub fn get_intersection(&self, other: &Invariance) -> Invariance {
        let mut result = Invariance::new();
        let (mut i, mut j) = (0, 0);

        // both sides are sorted and disjoint, so a merge walk suffices
        while i < self.intervals.len() && j < other.intervals.len() {
            let a = &self.intervals[i];
            let b = &other.intervals[j];
            if let Some(overlap) = a.get_intersection(b) {
                result.write(overlap);
            }
            if cmp_upper(a.upper_bound(), b.upper_bound()) == Ordering::Less {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }

    /// Intersection of every set in `invariances`.
    ///
    /// A time is invariant in the result only if it is invariant in every input.
    /// An empty list carries no information to narrow with, so the result is
    /// [`Invariance::universal`].
    pub fn merge<'a, I>(invariances: I) -> Invariance
    where
        I: IntoIterator<Item = &'a Invariance>,
    {
        let mut iter = invariances.into_iter();
        let Some(first) = iter.next() else {
            return Invariance::universal();
        };
        iter.fold(first.clone(), |acc, next| acc.get_intersection(next))
    }

    /// The stored interval containing `time`, if any
    pub fn get_containing(&self, time: Time) -> Option<Interval> {
        let idx = self.intervals.partition_point(|stored| stored.lower() <= time);
        let candidate = self.intervals.get(idx.checked_sub(1)?)?;
        candidate.contains(time).then_some(*candidate)
    }

    pub fn contains(&self, time: Time) -> bool {
        self.get_containing(time).is_some()
    }

    /// Check the storage invariants (sorted, disjoint, not coalescable)
    pub fn is_normalized(&self) -> bool {
        self.intervals.windows(2).all(|pair| {
            cmp_lower(pair[0].lower_bound(), pair[1].lower_bound()) == Ordering::Less
                && !pair[0].is_contiguous_with(&pair[1])
        })
    }
}

impl FromIterator<Interval> for Invariance {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        let mut invariance = Invariance::new();
        invariance.extend(iter);
        invariance
    }
}

impl Extend<Interval> for Invariance {
    fn extend<T: IntoIterator<Item = Interval>>(&mut self, iter: T) {
        for interval in iter {
            self.write(interval);
        }
    }
}
