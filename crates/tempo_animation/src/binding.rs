//! Parameter bindings
//!
//! A [`BindingBlock`] is the animation-facing side of an animatable object: a set of
//! named parameters, each with the types it accepts and a setter. Binding a curve
//! to a parameter creates a [`Binder`] that feeds the curve's values into the setter.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tempo_core::{Type, Value};

use crate::binder::Binder;
use crate::error::{AnimationError, Result};
use crate::shared::SharedCurve;
use crate::updater::Updater;

/// Picks the type a parameter should be sampled as for a given curve
pub type TypeSolver = Box<dyn Fn(&SharedCurve) -> Option<Type>>;

type Setter = Rc<dyn Fn(Value)>;

struct ParameterEntry {
    /// In order of preference
    types: SmallVec<[Type; 2]>,
    type_solver: Option<TypeSolver>,
    setter: Setter,
    binder: Option<Binder>,
}

impl ParameterEntry {
    fn resolve_type(&self, curve: &SharedCurve) -> Option<Type> {
        match &self.type_solver {
            Some(solver) => solver(curve).filter(|ty| curve.is_type_supported(*ty)),
            None => self
                .types
                .iter()
                .copied()
                .find(|ty| curve.is_type_supported(*ty)),
        }
    }
}

/// Named animatable parameters of one object
#[derive(Default)]
pub struct BindingBlock {
    entries: FxHashMap<String, ParameterEntry>,
}

impl BindingBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare parameter `id`, replacing (and unbinding) any previous entry of that name
    pub fn add_entry(
        &mut self,
        id: impl Into<String>,
        types: &[Type],
        type_solver: Option<TypeSolver>,
        setter: impl Fn(Value) + 'static,
    ) {
        self.entries.insert(
            id.into(),
            ParameterEntry {
                types: types.iter().copied().collect(),
                type_solver,
                setter: Rc::new(setter),
                binder: None,
            },
        );
    }

    /// Drive parameter `id` from `curve`, replacing any current binding.
    ///
    /// Returns the type the curve is sampled as.
    pub fn bind(&mut self, id: &str, updater: &Updater, curve: SharedCurve) -> Result<Type> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| AnimationError::UnknownParameter(id.to_owned()))?;

        let value_type = entry
            .resolve_type(&curve)
            .ok_or_else(|| AnimationError::NoCompatibleType {
                parameter: id.to_owned(),
                curve: curve.value_type(),
            })?;

        let setter = entry.setter.clone();
        let binder = Binder::new(updater, curve, value_type, move |value| setter(value))?;
        entry.binder = Some(binder);
        tracing::debug!("parameter '{}' bound as {}", id, value_type);
        Ok(value_type)
    }

    /// Returns whether the parameter was bound
    pub fn unbind(&mut self, id: &str) -> bool {
        let unbound = self
            .entries
            .get_mut(id)
            .and_then(|entry| entry.binder.take())
            .is_some();
        if unbound {
            tracing::debug!("parameter '{}' unbound", id);
        }
        unbound
    }

    pub fn unbind_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.binder = None;
        }
    }

    pub fn is_bound(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.binder.is_some())
    }

    pub fn bound_curve(&self, id: &str) -> Option<SharedCurve> {
        let binder = self.entries.get(id)?.binder.as_ref()?;
        Some(binder.curve().clone())
    }

    pub fn supported_types(&self, id: &str) -> Option<&[Type]> {
        self.entries.get(id).map(|entry| entry.types.as_slice())
    }

    /// Parameter names, sorted
    pub fn entry_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
