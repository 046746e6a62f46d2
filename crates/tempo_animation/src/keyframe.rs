//! Keyframe curves
//!
//! Both keyframe variants share [`KeyframeTrack`] storage: strictly increasing
//! key times with one value per key. Lookup is a binary search with
//! "insert position" semantics, see [`find_keyframe_index`].

use std::ops::Range;

use tempo_core::{Interval, Invariance, Time, Type, Value};

use crate::error::{AnimationError, Result};

/// A `(time, value)` anchor
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    pub time: Time,
    pub value: Value,
}

impl Keyframe {
    pub fn new(time: Time, value: impl Into<Value>) -> Self {
        Self {
            time,
            value: value.into(),
        }
    }
}

/// Index of the first key in `key_times[lower..upper]` strictly later than `time`.
///
/// - `time` before every key: `lower`
/// - `time` at or after every key: `upper`
/// - `time` equal to key `i`: `i + 1`
///
/// `key_times` must be sorted ascending within the searched range.
///
/// # Panics
///
/// If `lower > upper` or `upper > key_times.len()`.
pub fn find_keyframe_index<T: Ord>(time: &T, key_times: &[T], lower: usize, upper: usize) -> usize {
    lower + key_times[lower..upper].partition_point(|key| key <= time)
}

/// Sorted keyframe storage shared by the keyframe curve variants
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeTrack {
    value_type: Type,
    times: Vec<Time>,
    values: Vec<Value>,
}

impl KeyframeTrack {
    pub fn new(value_type: Type, keyframes: Vec<Keyframe>) -> Result<Self> {
        if keyframes.is_empty() {
            return Err(AnimationError::InsufficientData);
        }

        let mut times = Vec::with_capacity(keyframes.len());
        let mut values = Vec::with_capacity(keyframes.len());
        for (index, keyframe) in keyframes.into_iter().enumerate() {
            check_value_type(index, value_type, &keyframe.value)?;
            if times.last().is_some_and(|prev| *prev >= keyframe.time) {
                return Err(AnimationError::UnorderedKeyframes { index });
            }
            times.push(keyframe.time);
            values.push(keyframe.value);
        }

        Ok(Self {
            value_type,
            times,
            values,
        })
    }

    pub fn value_type(&self) -> Type {
        self.value_type
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn keyframe(&self, index: usize) -> Option<Keyframe> {
        Some(Keyframe {
            time: *self.times.get(index)?,
            value: self.values.get(index)?.clone(),
        })
    }

    /// See [`find_keyframe_index`]
    pub fn find(&self, time: Time) -> usize {
        find_keyframe_index(&time, &self.times, 0, self.times.len())
    }

    /// Insert a keyframe, replacing the value of an existing key at the same time.
    ///
    /// Returns the span whose values may have changed.
    pub fn insert(&mut self, keyframe: Keyframe) -> Result<Interval> {
        let index = self.times.partition_point(|t| *t < keyframe.time);
        check_value_type(index, self.value_type, &keyframe.value)?;

        if self.times.get(index) == Some(&keyframe.time) {
            self.values[index] = keyframe.value;
        } else {
            self.times.insert(index, keyframe.time);
            self.values.insert(index, keyframe.value);
        }
        self.neighbour_span(index)
    }

    /// Remove the keyframe at `index`; the last remaining keyframe cannot be removed.
    ///
    /// Returns the span whose values may have changed.
    pub fn remove(&mut self, index: usize) -> Result<Interval> {
        if index >= self.times.len() {
            return Err(AnimationError::KeyframeOutOfRange {
                index,
                len: self.times.len(),
            });
        }
        if self.times.len() == 1 {
            return Err(AnimationError::InsufficientData);
        }
        let span = self.neighbour_span(index)?;
        self.times.remove(index);
        self.values.remove(index);
        Ok(span)
    }

    /// The open span between the neighbours of key `index` (unbounded where it has none)
    fn neighbour_span(&self, index: usize) -> Result<Interval> {
        let (lower, lower_included) = match index.checked_sub(1) {
            Some(prev) => (self.times[prev], false),
            None => (Time::MIN, true),
        };
        let (upper, upper_included) = match self.times.get(index + 1) {
            Some(next) => (*next, false),
            None => (Time::MAX, true),
        };
        Ok(Interval::new(lower, upper, lower_included, upper_included)?)
    }

    /// Keys whose neighbourhood can intersect `interval`
    fn window(&self, interval: &Interval) -> Range<usize> {
        let start = self.find(interval.lower()).saturating_sub(2);
        let end = (self.find(interval.upper()) + 2).min(self.len());
        start..end
    }
}

fn check_value_type(index: usize, expected: Type, value: &Value) -> Result<()> {
    let found = value.value_type();
    if found != expected {
        return Err(AnimationError::KeyframeType {
            index,
            expected,
            found,
        });
    }
    Ok(())
}

/// Piecewise-linear keyframe curve, clamped outside the first and last keys
#[derive(Clone, Debug, PartialEq)]
pub struct KFLinearCurve {
    track: KeyframeTrack,
}

impl KFLinearCurve {
    pub fn new(value_type: Type, keyframes: Vec<Keyframe>) -> Result<Self> {
        if !value_type.is_interpolatable() {
            return Err(AnimationError::NotInterpolatable(value_type));
        }
        Ok(Self {
            track: KeyframeTrack::new(value_type, keyframes)?,
        })
    }

    pub fn track(&self) -> &KeyframeTrack {
        &self.track
    }

    pub(crate) fn track_mut(&mut self) -> &mut KeyframeTrack {
        &mut self.track
    }

    pub(crate) fn replace_keyframes(&mut self, keyframes: Vec<Keyframe>) -> Result<()> {
        self.track = KeyframeTrack::new(self.track.value_type, keyframes)?;
        Ok(())
    }

    pub fn value_type(&self) -> Type {
        self.track.value_type
    }

    pub fn get_value(&self, time: Time) -> Value {
        let track = &self.track;
        let idx = track.find(time);
        if idx == 0 {
            return track.values[0].clone();
        }
        if idx == track.len() {
            return track.values[idx - 1].clone();
        }

        let (t0, t1) = (track.times[idx - 1], track.times[idx]);
        let (v0, v1) = (&track.values[idx - 1], &track.values[idx]);
        let ratio = time.fraction_between(t0, t1);
        v0.lerp(v1, ratio).unwrap_or_else(|| v0.clone())
    }

    pub fn get_invariance(&self, interval: &Interval) -> Invariance {
        self.pieces(self.track.window(interval)).get_narrowed(interval)
    }

    /// Largest known invariant interval around `time`; a single instant between differing keys
    pub fn invariance_at(&self, time: Time) -> Interval {
        let point = Interval::point(time);
        self.pieces(self.track.window(&point))
            .get_containing(time)
            .unwrap_or(point)
    }

    /// Invariant pieces contributed by keys in `window`:
    /// the clamped ends, and every segment whose two keys hold equal values.
    fn pieces(&self, window: Range<usize>) -> Invariance {
        let track = &self.track;
        let n = track.len();
        let mut invariance = Invariance::new();

        if window.start == 0 {
            if let Ok(head) = Interval::closed(Time::MIN, track.times[0]) {
                invariance.write(head);
            }
        }
        if window.end == n {
            if let Ok(tail) = Interval::closed(track.times[n - 1], Time::MAX) {
                invariance.write(tail);
            }
        }
        for i in window.start..window.end.saturating_sub(1) {
            if track.values[i] == track.values[i + 1] {
                if let Ok(segment) = Interval::closed(track.times[i], track.times[i + 1]) {
                    invariance.write(segment);
                }
            }
        }

        invariance
    }
}

/// Step keyframe curve: the value of the latest key at or before the query time
#[derive(Clone, Debug, PartialEq)]
pub struct KFStepCurve {
    track: KeyframeTrack,
}

impl KFStepCurve {
    pub fn new(value_type: Type, keyframes: Vec<Keyframe>) -> Result<Self> {
        Ok(Self {
            track: KeyframeTrack::new(value_type, keyframes)?,
        })
    }

    pub fn track(&self) -> &KeyframeTrack {
        &self.track
    }

    pub(crate) fn track_mut(&mut self) -> &mut KeyframeTrack {
        &mut self.track
    }

    pub(crate) fn replace_keyframes(&mut self, keyframes: Vec<Keyframe>) -> Result<()> {
        self.track = KeyframeTrack::new(self.track.value_type, keyframes)?;
        Ok(())
    }

    pub fn value_type(&self) -> Type {
        self.track.value_type
    }

    pub fn get_value(&self, time: Time) -> Value {
        let idx = self.track.find(time);
        self.track.values[idx.saturating_sub(1)].clone()
    }

    /// Value-changing key instants are left out so neighbouring steps stay distinct.
    pub fn get_invariance(&self, interval: &Interval) -> Invariance {
        let track = &self.track;
        let mut invariance = Invariance::new();

        for i in track.window(interval) {
            // before the first key the curve holds the first value
            let step = match (i, track.times.get(i + 1)) {
                (0, Some(next)) => Interval::new(Time::MIN, *next, true, false),
                (0, None) => Ok(Interval::UNIVERSAL),
                (_, Some(next)) => Interval::new(track.times[i], *next, false, false),
                (_, None) => Interval::new(track.times[i], Time::MAX, false, true),
            };
            if let Ok(step) = step {
                invariance.write(step);
            }
            if i > 0 && track.values[i - 1] == track.values[i] {
                invariance.write(Interval::point(track.times[i]));
            }
        }
        // nothing of `interval` precedes its lower bound, so the step holding it is whole
        if interval.lower_included() {
            if let Some(first) = self.invariance_at(interval.lower()).get_intersection(interval) {
                invariance.write(first);
            }
        }

        invariance.get_narrowed(interval)
    }

    /// The whole step containing `time`, from its key (inclusive) to the next key (exclusive)
    pub fn invariance_at(&self, time: Time) -> Interval {
        let track = &self.track;
        let n = track.len();
        let k = track.find(time).max(1);
        let (lower, lower_included) = if k == 1 {
            (Time::MIN, true)
        } else {
            (track.times[k - 1], true)
        };
        let (upper, upper_included) = if k >= n {
            (Time::MAX, true)
        } else {
            (track.times[k], false)
        };
        Interval::new(lower, upper, lower_included, upper_included).unwrap_or(Interval::point(time))
    }
}
