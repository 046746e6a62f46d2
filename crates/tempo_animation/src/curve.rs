//! Curves
//!
//! A [`Curve`] maps [`Time`] to a [`Value`] of one declared type and can report
//! where that value stays constant. The set of variants is closed:
//!
//! - [`ConstantCurve`]: one value for all time
//! - [`KFLinearCurve`]: piecewise-linear keyframes
//! - [`KFStepCurve`]: piecewise-constant keyframes
//! - [`ComboVectorCurve`]: a vector assembled from per-component scalar curves
//!
//! Curves are shared through [`SharedCurve`](crate::shared::SharedCurve), which
//! also owns the listener registry used for change notification.

use smallvec::SmallVec;
use tempo_core::{Interval, Invariance, Time, Type, Value};

use crate::error::{AnimationError, Result};
use crate::keyframe::{KFLinearCurve, KFStepCurve};
use crate::shared::{ListenerId, SharedCurve};

/// A curve holding one value for all time
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantCurve {
    value_type: Type,
    value: Value,
}

impl ConstantCurve {
    /// A curve of `value_type` holding the type's default value
    pub fn new(value_type: Type) -> Self {
        Self {
            value_type,
            value: value_type.default_value(),
        }
    }

    pub fn with_value(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            value_type: value.value_type(),
            value,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_type(&self) -> Type {
        self.value_type
    }

    /// Replace the value; returns whether it changed
    pub(crate) fn set_value(&mut self, value: Value) -> Result<bool> {
        let found = value.value_type();
        if found != self.value_type {
            return Err(AnimationError::TypeMismatch {
                requested: found,
                curve: self.value_type,
            });
        }
        if value == self.value {
            return Ok(false);
        }
        self.value = value;
        Ok(true)
    }
}

/// A child curve plugged into a composite, with the listener relaying its changes
#[derive(Debug)]
pub(crate) struct ChildLink {
    pub curve: SharedCurve,
    pub listener: ListenerId,
}

impl Drop for ChildLink {
    fn drop(&mut self) {
        self.curve.remove_listener(self.listener);
    }
}

/// A vector curve whose components come from independent scalar curves.
///
/// Components without a child curve hold 0.
#[derive(Debug)]
pub struct ComboVectorCurve {
    vector_type: Type,
    children: SmallVec<[Option<ChildLink>; 4]>,
}

impl ComboVectorCurve {
    pub fn new(vector_type: Type) -> Result<Self> {
        let dimension = vector_type
            .dimension()
            .ok_or(AnimationError::NotVector(vector_type))?;
        Ok(Self {
            vector_type,
            children: (0..dimension).map(|_| None).collect(),
        })
    }

    pub fn value_type(&self) -> Type {
        self.vector_type
    }

    pub fn dimension(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&SharedCurve> {
        self.children.get(index)?.as_ref().map(|link| &link.curve)
    }

    /// Plug `link` into component `index`, dropping (and unlinking) the previous child
    pub(crate) fn set_child_link(&mut self, index: usize, link: Option<ChildLink>) -> Result<()> {
        let dimension = self.dimension();
        let slot = self
            .children
            .get_mut(index)
            .ok_or(AnimationError::ComponentOutOfRange { index, dimension })?;
        *slot = link;
        Ok(())
    }

    fn linked_children(&self) -> impl Iterator<Item = &SharedCurve> {
        self.children.iter().flatten().map(|link| &link.curve)
    }

    pub fn get_value(&self, time: Time) -> Value {
        Value::Vector(
            self.children
                .iter()
                .map(|slot| match slot {
                    Some(link) => link.curve.get_value(time, Type::Number).as_number().unwrap_or(0.0),
                    None => 0.0,
                })
                .collect(),
        )
    }

    /// Invariant only where every component is invariant
    pub fn get_invariance(&self, interval: &Interval) -> Invariance {
        let parts: SmallVec<[Invariance; 4]> = self
            .linked_children()
            .map(|child| child.get_invariance(interval))
            .collect();
        Invariance::merge(&parts).get_narrowed(interval)
    }

    pub fn invariance_at(&self, time: Time) -> Interval {
        self.linked_children()
            .try_fold(Interval::UNIVERSAL, |acc, child| {
                acc.get_intersection(&child.invariance_at(time))
            })
            .unwrap_or(Interval::point(time))
    }
}

/// A time-to-value function of one declared type
#[derive(Debug)]
pub enum Curve {
    Constant(ConstantCurve),
    KFLinear(KFLinearCurve),
    KFStep(KFStepCurve),
    ComboVector(ComboVectorCurve),
}

impl Curve {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Curve::Constant(_) => "constant",
            Curve::KFLinear(_) => "keyframe-linear",
            Curve::KFStep(_) => "keyframe-step",
            Curve::ComboVector(_) => "combo-vector",
        }
    }

    /// The type values are produced in before any conversion
    pub fn value_type(&self) -> Type {
        match self {
            Curve::Constant(c) => c.value_type(),
            Curve::KFLinear(c) => c.value_type(),
            Curve::KFStep(c) => c.value_type(),
            Curve::ComboVector(c) => c.value_type(),
        }
    }

    pub fn is_type_supported(&self, ty: Type) -> bool {
        ty.is_convertible(self.value_type())
    }

    /// Sample the curve at `time` as a value of `ty`.
    ///
    /// # Panics
    ///
    /// If `ty` is not supported; check with [`Curve::is_type_supported`] or use
    /// [`Curve::try_get_value`].
    pub fn get_value(&self, time: Time, ty: Type) -> Value {
        assert!(
            self.is_type_supported(ty),
            "{} curve producing {} sampled as {}",
            self.kind_name(),
            self.value_type(),
            ty
        );
        let raw = match self {
            Curve::Constant(c) => c.value().clone(),
            Curve::KFLinear(c) => c.get_value(time),
            Curve::KFStep(c) => c.get_value(time),
            Curve::ComboVector(c) => c.get_value(time),
        };
        ty.convert_value(self.value_type(), raw)
            .unwrap_or_else(|| ty.default_value())
    }

    pub fn try_get_value(&self, time: Time, ty: Type) -> Result<Value> {
        if !self.is_type_supported(ty) {
            return Err(AnimationError::TypeMismatch {
                requested: ty,
                curve: self.value_type(),
            });
        }
        Ok(self.get_value(time, ty))
    }

    /// Ranges within `interval` over which the value is constant
    pub fn get_invariance(&self, interval: &Interval) -> Invariance {
        match self {
            Curve::Constant(_) => Invariance::from_interval(*interval),
            Curve::KFLinear(c) => c.get_invariance(interval),
            Curve::KFStep(c) => c.get_invariance(interval),
            Curve::ComboVector(c) => c.get_invariance(interval),
        }
    }

    /// An interval containing `time` over which the value is constant
    pub fn invariance_at(&self, time: Time) -> Interval {
        match self {
            Curve::Constant(_) => Interval::UNIVERSAL,
            Curve::KFLinear(c) => c.invariance_at(time),
            Curve::KFStep(c) => c.invariance_at(time),
            Curve::ComboVector(c) => c.invariance_at(time),
        }
    }
}

impl From<ConstantCurve> for Curve {
    fn from(curve: ConstantCurve) -> Self {
        Curve::Constant(curve)
    }
}

impl From<KFLinearCurve> for Curve {
    fn from(curve: KFLinearCurve) -> Self {
        Curve::KFLinear(curve)
    }
}

impl From<KFStepCurve> for Curve {
    fn from(curve: KFStepCurve) -> Self {
        Curve::KFStep(curve)
    }
}

impl From<ComboVectorCurve> for Curve {
    fn from(curve: ComboVectorCurve) -> Self {
        Curve::ComboVector(curve)
    }
}
