//! Binders
//!
//! A [`Binder`] connects one curve output to one consumer callback. It caches the
//! interval around the last evaluated time over which the curve is known not to
//! change, so the [`Updater`] only re-evaluates it once the current time leaves
//! that interval or the curve reports a change overlapping it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tempo_core::{Interval, Time, Type, Value};

use crate::error::{AnimationError, Result};
use crate::shared::{ListenerId, SharedCurve};
use crate::updater::{BinderId, Updater, UpdaterState};

type Callback = Box<dyn FnMut(Value)>;

/// Binder state shared between the handle, the updater, and the curve listener
pub(crate) struct BinderEntry {
    curve: SharedCurve,
    value_type: Type,
    callback: RefCell<Callback>,
    /// `None` until the first evaluation and after a full invalidation
    valid: Cell<Option<Interval>>,
    last_time: Cell<Option<Time>>,
    bound: Cell<bool>,
}

impl BinderEntry {
    pub(crate) fn is_bound(&self) -> bool {
        self.bound.get()
    }

    pub(crate) fn needs_update(&self, time: Time) -> bool {
        self.is_bound() && !self.valid.get().is_some_and(|valid| valid.contains(time))
    }

    /// Evaluate the curve at `time` and hand the value to the consumer
    pub(crate) fn refresh(&self, time: Time) {
        if !self.is_bound() {
            return;
        }
        let (value, valid) = {
            let curve = self.curve.borrow();
            (curve.get_value(time, self.value_type), curve.invariance_at(time))
        };
        // set before the callback so changes made from inside it are not lost
        self.valid.set(Some(valid));
        self.last_time.set(Some(time));
        (self.callback.borrow_mut())(value);
    }

    /// Drop the part of the cached interval that overlaps `changed`.
    ///
    /// What survives is the piece still containing the last evaluated time, if any.
    fn invalidate(&self, changed: &Interval) {
        let Some(valid) = self.valid.get() else {
            return;
        };
        if valid.get_intersection(changed).is_none() {
            return;
        }
        let kept = self.last_time.get().and_then(|time| {
            [changed.get_precedings(), changed.get_followings()]
                .into_iter()
                .flatten()
                .filter_map(|side| valid.get_intersection(&side))
                .find(|piece| piece.contains(time))
        });
        tracing::trace!("binder cache {} invalidated by {} -> {:?}", valid, changed, kept);
        self.valid.set(kept);
    }
}

/// A live connection from a curve to a consumer callback.
///
/// Dropping the binder unbinds it: it leaves its updater and its curve's
/// listeners, and the callback is never invoked again.
#[must_use = "dropping a Binder unbinds it immediately"]
pub struct Binder {
    id: BinderId,
    entry: Rc<BinderEntry>,
    listener: ListenerId,
    updater: Weak<RefCell<UpdaterState>>,
}

impl Binder {
    /// Bind `curve`, sampled as `value_type`, to `callback` on `updater`.
    ///
    /// The callback first runs on the next [`Updater::update`].
    pub fn new(
        updater: &Updater,
        curve: SharedCurve,
        value_type: Type,
        callback: impl FnMut(Value) + 'static,
    ) -> Result<Self> {
        if !curve.is_type_supported(value_type) {
            return Err(AnimationError::TypeMismatch {
                requested: value_type,
                curve: curve.value_type(),
            });
        }

        let entry = Rc::new(BinderEntry {
            curve: curve.clone(),
            value_type,
            callback: RefCell::new(Box::new(callback)),
            valid: Cell::new(None),
            last_time: Cell::new(None),
            bound: Cell::new(true),
        });

        let weak = Rc::downgrade(&entry);
        let listener = curve.add_listener(move |changed| {
            if let Some(entry) = weak.upgrade() {
                entry.invalidate(changed);
            }
        });

        let id = updater.register(entry.clone());
        tracing::debug!("bound {} curve as {} ({:?})", curve.kind_name(), value_type, id);

        Ok(Self {
            id,
            entry,
            listener,
            updater: updater.downgrade(),
        })
    }

    pub fn id(&self) -> BinderId {
        self.id
    }

    pub fn curve(&self) -> &SharedCurve {
        &self.entry.curve
    }

    pub fn value_type(&self) -> Type {
        self.entry.value_type
    }

    /// The interval over which the last delivered value is known to hold
    pub fn valid_interval(&self) -> Option<Interval> {
        self.entry.valid.get()
    }

    /// Detach from the updater and the curve
    pub fn unbind(self) {
        drop(self);
    }
}

impl Drop for Binder {
    fn drop(&mut self) {
        self.entry.bound.set(false);
        self.entry.curve.remove_listener(self.listener);
        if let Some(state) = self.updater.upgrade() {
            // a busy updater prunes unbound entries on its next pass
            if let Ok(mut state) = state.try_borrow_mut() {
                state.binders.remove(self.id);
            }
        }
        tracing::debug!("unbound {:?}", self.id);
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("id", &self.id)
            .field("curve", &self.entry.curve.kind_name())
            .field("value_type", &self.entry.value_type)
            .field("valid", &self.entry.valid.get())
            .finish()
    }
}
