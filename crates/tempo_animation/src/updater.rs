//! Updater
//!
//! Owns the current time and the set of registered binders, and re-evaluates
//! exactly the binders whose cached interval no longer covers the current time.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tempo_core::{Time, Type, Value};

use crate::binder::{Binder, BinderEntry};
use crate::config::AnimationConfig;
use crate::error::Result;
use crate::shared::SharedCurve;

new_key_type! {
    pub struct BinderId;
}

pub(crate) struct UpdaterState {
    current_time: Option<Time>,
    pub(crate) binders: SlotMap<BinderId, Rc<BinderEntry>>,
    updating: bool,
}

/// The scheduling hub driving every binder registered on it
pub struct Updater {
    state: Rc<RefCell<UpdaterState>>,
}

impl Updater {
    pub fn new() -> Self {
        Self::starting_at(None)
    }

    /// An updater whose current time starts at the configured initial time
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::starting_at(config.updater.initial_time.map(|t| config.time.time(t)))
    }

    fn starting_at(current_time: Option<Time>) -> Self {
        Self {
            state: Rc::new(RefCell::new(UpdaterState {
                current_time,
                binders: SlotMap::with_key(),
                updating: false,
            })),
        }
    }

    /// Shorthand for [`Binder::new`]
    pub fn bind(
        &self,
        curve: SharedCurve,
        value_type: Type,
        callback: impl FnMut(Value) + 'static,
    ) -> Result<Binder> {
        Binder::new(self, curve, value_type, callback)
    }

    /// The time of the last update, if any
    pub fn current_time(&self) -> Option<Time> {
        self.state.borrow().current_time
    }

    /// Number of bound binders
    pub fn binder_count(&self) -> usize {
        self.state
            .borrow()
            .binders
            .values()
            .filter(|entry| entry.is_bound())
            .count()
    }

    pub(crate) fn register(&self, entry: Rc<BinderEntry>) -> BinderId {
        self.state.borrow_mut().binders.insert(entry)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<UpdaterState>> {
        Rc::downgrade(&self.state)
    }

    /// Advance to `time` and re-evaluate every binder whose cached interval does
    /// not contain it. Returns the number of binders re-evaluated.
    ///
    /// Consumer callbacks may bind, unbind, and mutate curves. A nested call to
    /// `update` from inside a callback is ignored.
    pub fn update(&self, time: Time) -> usize {
        let stale: SmallVec<[Rc<BinderEntry>; 16]> = {
            let mut state = match self.state.try_borrow_mut() {
                Ok(state) if !state.updating => state,
                _ => {
                    tracing::warn!("Updater::update({}) re-entered from a callback; ignored", time);
                    return 0;
                }
            };
            state.updating = true;
            state.current_time = Some(time);
            state.binders.retain(|_, entry| entry.is_bound());
            state
                .binders
                .values()
                .filter(|entry| entry.needs_update(time))
                .cloned()
                .collect()
        };

        let _pass = UpdatePass(&self.state);
        for entry in &stale {
            entry.refresh(time);
        }
        tracing::debug!("update at {}: {} binders re-evaluated", time, stale.len());
        stale.len()
    }
}

impl Default for Updater {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the `updating` flag when a pass ends, including by unwinding
struct UpdatePass<'a>(&'a RefCell<UpdaterState>);

impl Drop for UpdatePass<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().updating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ConstantCurve;
    use crate::keyframe::{KFLinearCurve, Keyframe};
    use std::cell::Cell;

    fn t(n: i64) -> Time {
        Time::from(n)
    }

    #[test]
    fn test_current_time() {
        let updater = Updater::new();
        assert_eq!(updater.current_time(), None);
        assert_eq!(updater.update(t(3)), 0);
        assert_eq!(updater.current_time(), Some(t(3)));
    }

    #[test]
    fn test_only_stale_binders_are_evaluated() {
        let updater = Updater::new();
        let constant = SharedCurve::new(ConstantCurve::with_value(1.0));
        let ramp = SharedCurve::new(
            KFLinearCurve::new(
                Type::Number,
                vec![Keyframe::new(t(0), 0.0), Keyframe::new(t(10), 1.0)],
            )
            .unwrap(),
        );
        let _a = updater.bind(constant, Type::Number, |_| {}).unwrap();
        let _b = updater.bind(ramp, Type::Number, |_| {}).unwrap();

        assert_eq!(updater.update(t(1)), 2);
        assert_eq!(updater.update(t(2)), 1);
        assert_eq!(updater.update(t(20)), 1);
        assert_eq!(updater.update(t(30)), 0);
    }

    #[test]
    fn test_reentrant_update_is_ignored() {
        let updater = Rc::new(Updater::new());
        let nested = Rc::new(Cell::new(None));

        let inner = Rc::downgrade(&updater);
        let result = nested.clone();
        let _binder = updater
            .bind(
                SharedCurve::new(ConstantCurve::with_value(1.0)),
                Type::Number,
                move |_| {
                    if let Some(updater) = inner.upgrade() {
                        result.set(Some(updater.update(t(99))));
                    }
                },
            )
            .unwrap();

        assert_eq!(updater.update(t(0)), 1);
        assert_eq!(nested.get(), Some(0));
        assert_eq!(updater.current_time(), Some(t(0)));
    }

    #[test]
    fn test_unbind_from_callback() {
        let updater = Updater::new();
        let curve = SharedCurve::new(ConstantCurve::with_value(1.0));
        let victim_calls = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<Binder>>> = Rc::new(RefCell::new(None));
        let take = slot.clone();
        let _killer = updater
            .bind(curve.clone(), Type::Number, move |_| {
                take.borrow_mut().take();
            })
            .unwrap();
        let calls = victim_calls.clone();
        *slot.borrow_mut() = Some(
            updater
                .bind(curve, Type::Number, move |_| calls.set(calls.get() + 1))
                .unwrap(),
        );

        updater.update(t(0));
        assert!(slot.borrow().is_none());
        assert_eq!(updater.binder_count(), 1);
        assert!(victim_calls.get() <= 1);
        updater.update(t(1));
        assert!(victim_calls.get() <= 1);
    }

    #[test]
    fn test_bind_from_callback() {
        let updater = Rc::new(Updater::new());
        let curve = SharedCurve::new(ConstantCurve::with_value(1.0));
        let spawned: Rc<RefCell<Vec<Binder>>> = Rc::new(RefCell::new(Vec::new()));

        let weak = Rc::downgrade(&updater);
        let sink = spawned.clone();
        let inner_curve = curve.clone();
        let _spawner = updater
            .bind(curve, Type::Number, move |_| {
                if let Some(updater) = weak.upgrade() {
                    sink.borrow_mut()
                        .push(updater.bind(inner_curve.clone(), Type::Number, |_| {}).unwrap());
                }
            })
            .unwrap();

        assert_eq!(updater.update(t(0)), 1);
        assert_eq!(updater.binder_count(), 2);
        assert_eq!(updater.update(t(0)), 1);
    }
}
