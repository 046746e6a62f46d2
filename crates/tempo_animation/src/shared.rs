//! Shared curve handles and change notification
//!
//! A [`SharedCurve`] is the reference-counted owner of one [`Curve`]. Binders and
//! composite curves hold clones of the handle; every mutation goes through it so
//! that listeners learn which part of the timeline may now produce different
//! values.
//!
//! Listeners live in a per-curve [`SlotMap`] keyed by [`ListenerId`]. Holders keep
//! only the id, so detaching is a single removal and the curve never owns the
//! objects it notifies.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tempo_core::{Interval, Invariance, Time, Type, Value};

use crate::curve::{ChildLink, Curve};
use crate::error::{AnimationError, Result};
use crate::keyframe::Keyframe;

new_key_type! {
    /// Handle to a change listener registered on a curve
    pub struct ListenerId;
}

type Listener = Rc<dyn Fn(&Interval)>;

struct CurveCell {
    curve: RefCell<Curve>,
    listeners: RefCell<SlotMap<ListenerId, Listener>>,
}

/// Reference-counted handle to a curve and its listeners
#[derive(Clone)]
pub struct SharedCurve(Rc<CurveCell>);

impl SharedCurve {
    pub fn new(curve: impl Into<Curve>) -> Self {
        Self(Rc::new(CurveCell {
            curve: RefCell::new(curve.into()),
            listeners: RefCell::new(SlotMap::with_key()),
        }))
    }

    /// Borrow the underlying curve
    pub fn borrow(&self) -> Ref<'_, Curve> {
        self.0.curve.borrow()
    }

    /// Whether both handles point at the same curve
    pub fn ptr_eq(&self, other: &SharedCurve) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn kind_name(&self) -> &'static str {
        self.borrow().kind_name()
    }

    pub fn value_type(&self) -> Type {
        self.borrow().value_type()
    }

    pub fn is_type_supported(&self, ty: Type) -> bool {
        self.borrow().is_type_supported(ty)
    }

    /// See [`Curve::get_value`]
    pub fn get_value(&self, time: Time, ty: Type) -> Value {
        self.borrow().get_value(time, ty)
    }

    pub fn try_get_value(&self, time: Time, ty: Type) -> Result<Value> {
        self.borrow().try_get_value(time, ty)
    }

    pub fn get_invariance(&self, interval: &Interval) -> Invariance {
        self.borrow().get_invariance(interval)
    }

    pub fn invariance_at(&self, time: Time) -> Interval {
        self.borrow().invariance_at(time)
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register `listener` to be called with every interval whose values may change
    pub fn add_listener(&self, listener: impl Fn(&Interval) + 'static) -> ListenerId {
        self.0.listeners.borrow_mut().insert(Rc::new(listener))
    }

    /// Returns whether the listener was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.0.listeners.borrow_mut().remove(id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    /// Tell every listener that values within `interval` may have changed.
    ///
    /// Listeners may add or remove listeners (on this curve or others) while
    /// being notified; the set notified is the one registered when the call began.
    pub fn notify_value_change(&self, interval: &Interval) {
        let listeners: SmallVec<[Listener; 4]> =
            self.0.listeners.borrow().values().cloned().collect();
        tracing::trace!(
            "{} curve changed over {} ({} listeners)",
            self.kind_name(),
            interval,
            listeners.len()
        );
        for listener in listeners {
            listener(interval);
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace the value of a constant curve
    pub fn set_constant_value(&self, value: impl Into<Value>) -> Result<()> {
        let changed = match &mut *self.0.curve.borrow_mut() {
            Curve::Constant(c) => c.set_value(value.into())?,
            other => return Err(unsupported("set_constant_value", other)),
        };
        if changed {
            self.notify_value_change(&Interval::UNIVERSAL);
        }
        Ok(())
    }

    /// Replace all keyframes of a keyframe curve
    pub fn set_keyframes(&self, keyframes: Vec<Keyframe>) -> Result<()> {
        match &mut *self.0.curve.borrow_mut() {
            Curve::KFLinear(c) => c.replace_keyframes(keyframes)?,
            Curve::KFStep(c) => c.replace_keyframes(keyframes)?,
            other => return Err(unsupported("set_keyframes", other)),
        }
        self.notify_value_change(&Interval::UNIVERSAL);
        Ok(())
    }

    /// Insert a keyframe, or replace the value of the key already at its time
    pub fn insert_keyframe(&self, keyframe: Keyframe) -> Result<()> {
        let span = match &mut *self.0.curve.borrow_mut() {
            Curve::KFLinear(c) => c.track_mut().insert(keyframe)?,
            Curve::KFStep(c) => c.track_mut().insert(keyframe)?,
            other => return Err(unsupported("insert_keyframe", other)),
        };
        self.notify_value_change(&span);
        Ok(())
    }

    pub fn remove_keyframe(&self, index: usize) -> Result<()> {
        let span = match &mut *self.0.curve.borrow_mut() {
            Curve::KFLinear(c) => c.track_mut().remove(index)?,
            Curve::KFStep(c) => c.track_mut().remove(index)?,
            other => return Err(unsupported("remove_keyframe", other)),
        };
        self.notify_value_change(&span);
        Ok(())
    }

    /// Plug `child` into component `index` of a combo-vector curve, or clear it.
    ///
    /// The child must be able to produce numbers. Changes to the child are relayed
    /// to this curve's listeners for as long as it stays plugged in.
    pub fn set_child(&self, index: usize, child: Option<SharedCurve>) -> Result<()> {
        {
            let curve = self.borrow();
            let Curve::ComboVector(combo) = &*curve else {
                return Err(unsupported("set_child", &curve));
            };
            if index >= combo.dimension() {
                return Err(AnimationError::ComponentOutOfRange {
                    index,
                    dimension: combo.dimension(),
                });
            }
        }
        if let Some(child) = &child {
            if !child.is_type_supported(Type::Number) {
                return Err(AnimationError::TypeMismatch {
                    requested: Type::Number,
                    curve: child.value_type(),
                });
            }
        }

        let link = child.map(|curve| {
            let parent: Weak<CurveCell> = Rc::downgrade(&self.0);
            let listener = curve.add_listener(move |interval| {
                if let Some(cell) = parent.upgrade() {
                    SharedCurve(cell).notify_value_change(interval);
                }
            });
            ChildLink { curve, listener }
        });

        // the previous link (if any) is dropped here, detaching its listener
        let replaced = match &mut *self.0.curve.borrow_mut() {
            Curve::ComboVector(combo) => combo.set_child_link(index, link),
            other => Err(unsupported("set_child", other)),
        };
        replaced?;
        self.notify_value_change(&Interval::UNIVERSAL);
        Ok(())
    }
}

fn unsupported(operation: &'static str, curve: &Curve) -> AnimationError {
    AnimationError::UnsupportedOperation {
        operation,
        curve: curve.kind_name(),
    }
}

impl fmt::Debug for SharedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SharedCurve");
        match self.0.curve.try_borrow() {
            Ok(curve) => s.field("curve", &*curve),
            Err(_) => s.field("curve", &"<borrowed>"),
        };
        s.field("listeners", &self.0.listeners.borrow().len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{ComboVectorCurve, ConstantCurve};
    use crate::keyframe::{KFLinearCurve, KFStepCurve};
    use std::cell::RefCell;

    fn t(n: i64) -> Time {
        Time::from(n)
    }

    fn recorder(curve: &SharedCurve) -> (ListenerId, Rc<RefCell<Vec<Interval>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = curve.add_listener(move |interval| sink.borrow_mut().push(*interval));
        (id, seen)
    }

    fn linear() -> SharedCurve {
        SharedCurve::new(
            KFLinearCurve::new(
                Type::Number,
                vec![
                    Keyframe::new(t(0), 0.0),
                    Keyframe::new(t(10), 10.0),
                    Keyframe::new(t(20), 0.0),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_listener_registry() {
        let curve = SharedCurve::new(ConstantCurve::with_value(1.0));
        let (id, seen) = recorder(&curve);
        assert_eq!(curve.listener_count(), 1);

        curve.notify_value_change(&Interval::point(t(3)));
        assert_eq!(*seen.borrow(), vec![Interval::point(t(3))]);

        assert!(curve.remove_listener(id));
        assert!(!curve.remove_listener(id));
        curve.notify_value_change(&Interval::UNIVERSAL);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_set_constant_value_notifies_on_change() {
        let curve = SharedCurve::new(ConstantCurve::with_value(1.0));
        let (_, seen) = recorder(&curve);

        curve.set_constant_value(1.0).unwrap();
        assert!(seen.borrow().is_empty());

        curve.set_constant_value(2.0).unwrap();
        assert_eq!(*seen.borrow(), vec![Interval::UNIVERSAL]);
        assert_eq!(curve.get_value(t(0), Type::Number), Value::Number(2.0));

        assert!(matches!(
            curve.set_constant_value("text"),
            Err(AnimationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_insert_keyframe_notifies_neighbour_span() {
        let curve = linear();
        let (_, seen) = recorder(&curve);

        curve.insert_keyframe(Keyframe::new(t(5), 50.0)).unwrap();
        let expected = Interval::new(t(0), t(10), false, false).unwrap();
        assert_eq!(*seen.borrow(), vec![expected]);
        assert_eq!(curve.get_value(t(5), Type::Number), Value::Number(50.0));

        curve.remove_keyframe(1).unwrap();
        assert_eq!(seen.borrow()[1], expected);
        assert_eq!(curve.get_value(t(5), Type::Number), Value::Number(5.0));
    }

    #[test]
    fn test_mutation_on_wrong_variant() {
        let curve = SharedCurve::new(ConstantCurve::with_value(1.0));
        assert_eq!(
            curve.insert_keyframe(Keyframe::new(t(0), 1.0)),
            Err(AnimationError::UnsupportedOperation {
                operation: "insert_keyframe",
                curve: "constant"
            })
        );
        assert!(linear().set_constant_value(3.0).is_err());
    }

    #[test]
    fn test_set_keyframes_validates() {
        let curve = SharedCurve::new(
            KFStepCurve::new(Type::Boolean, vec![Keyframe::new(t(0), false)]).unwrap(),
        );
        assert_eq!(curve.set_keyframes(vec![]), Err(AnimationError::InsufficientData));
        curve
            .set_keyframes(vec![Keyframe::new(t(0), false), Keyframe::new(t(4), true)])
            .unwrap();
        assert_eq!(curve.get_value(t(4), Type::Boolean), Value::Boolean(true));
    }

    #[test]
    fn test_combo_children() {
        let combo = SharedCurve::new(ComboVectorCurve::new(Type::Vector3).unwrap());
        let x = SharedCurve::new(ConstantCurve::with_value(1.0));
        let y = linear();

        combo.set_child(0, Some(x.clone())).unwrap();
        combo.set_child(1, Some(y.clone())).unwrap();
        assert_eq!(x.listener_count(), 1);
        assert_eq!(
            combo.get_value(t(5), Type::Vector3),
            Value::from([1.0, 5.0, 0.0])
        );

        assert_eq!(
            combo.set_child(3, Some(x.clone())),
            Err(AnimationError::ComponentOutOfRange {
                index: 3,
                dimension: 3
            })
        );
        let text = SharedCurve::new(ConstantCurve::with_value("a"));
        assert!(matches!(
            combo.set_child(2, Some(text)),
            Err(AnimationError::TypeMismatch { .. })
        ));

        combo.set_child(0, None).unwrap();
        assert_eq!(x.listener_count(), 0);
    }

    #[test]
    fn test_combo_relays_child_changes() {
        let combo = SharedCurve::new(ComboVectorCurve::new(Type::Vector2).unwrap());
        let child = linear();
        combo.set_child(1, Some(child.clone())).unwrap();
        let (_, seen) = recorder(&combo);

        child.insert_keyframe(Keyframe::new(t(15), 1.0)).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![Interval::new(t(10), t(20), false, false).unwrap()]
        );

        drop(combo);
        assert_eq!(child.listener_count(), 0);
    }

    #[test]
    fn test_combo_invariance() {
        let combo = SharedCurve::new(ComboVectorCurve::new(Type::Vector2).unwrap());
        combo
            .set_child(0, Some(SharedCurve::new(ConstantCurve::with_value(1.0))))
            .unwrap();
        combo.set_child(1, Some(linear())).unwrap();

        let window = Interval::closed(t(-10), t(30)).unwrap();
        let invariance = combo.get_invariance(&window);
        assert!(invariance.contains(t(-5)));
        assert!(!invariance.contains(t(5)));
        assert!(invariance.contains(t(25)));

        assert_eq!(
            combo.invariance_at(t(-5)),
            Interval::closed(Time::MIN, t(0)).unwrap()
        );
        assert_eq!(combo.invariance_at(t(5)), Interval::point(t(5)));
    }
}
