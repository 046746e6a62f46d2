//! Animated value types
//!
//! [`Type`] is the closed registry of parameter types a curve can produce and a
//! binder can consume; [`Value`] is the runtime carrier.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

/// Components of a vector value
pub type Components = SmallVec<[f64; 4]>;

/// Parameter type descriptor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Boolean,
    Number,
    String,
    Vector2,
    Vector3,
    Vector4,
}

impl Type {
    pub const ALL: [Type; 6] = [
        Type::Boolean,
        Type::Number,
        Type::String,
        Type::Vector2,
        Type::Vector3,
        Type::Vector4,
    ];

    /// Resolve a registered type name
    pub fn find(name: &str) -> Option<Type> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::Boolean => "boolean",
            Type::Number => "number",
            Type::String => "string",
            Type::Vector2 => "vector2",
            Type::Vector3 => "vector3",
            Type::Vector4 => "vector4",
        }
    }

    /// Component count for vector types
    pub fn dimension(&self) -> Option<usize> {
        match self {
            Type::Vector2 => Some(2),
            Type::Vector3 => Some(3),
            Type::Vector4 => Some(4),
            _ => None,
        }
    }

    pub fn vector(dimension: usize) -> Option<Type> {
        match dimension {
            2 => Some(Type::Vector2),
            3 => Some(Type::Vector3),
            4 => Some(Type::Vector4),
            _ => None,
        }
    }

    /// Fallback value for parameters nothing has produced yet
    pub fn default_value(&self) -> Value {
        match self {
            Type::Boolean => Value::Boolean(false),
            Type::Number => Value::Number(0.0),
            Type::String => Value::String(String::new()),
            Type::Vector2 | Type::Vector3 | Type::Vector4 => {
                Value::Vector(std::iter::repeat(0.0).take(self.dimension().unwrap_or(0)).collect())
            }
        }
    }

    /// Whether values of this type can be linearly interpolated
    pub fn is_interpolatable(&self) -> bool {
        !matches!(self, Type::Boolean | Type::String)
    }

    /// Whether a value of type `from` can be turned into this type
    pub fn is_convertible(&self, from: Type) -> bool {
        *self == from || matches!((self, from), (Type::Boolean, Type::Number) | (Type::Number, Type::Boolean))
    }

    /// Convert `value` (of type `from`) into this type.
    ///
    /// Returns `None` when the conversion is not supported or `value` is not of type `from`.
    pub fn convert_value(&self, from: Type, value: Value) -> Option<Value> {
        if value.value_type() != from || !self.is_convertible(from) {
            return None;
        }
        match (self, value) {
            (Type::Boolean, Value::Number(n)) => Some(Value::Boolean(n >= 0.5)),
            (Type::Number, Value::Boolean(b)) => Some(Value::Number(if b { 1.0 } else { 0.0 })),
            (_, value) => Some(value),
        }
    }
}

impl FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Type::find(s).ok_or_else(|| format!("unknown type '{}'", s))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value produced by a curve
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    /// 2 to 4 components
    Vector(Components),
}

impl Value {
    pub fn vector(components: &[f64]) -> Value {
        Value::Vector(components.iter().copied().collect())
    }

    pub fn value_type(&self) -> Type {
        match self {
            Value::Boolean(_) => Type::Boolean,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Vector(c) => Type::vector(c.len()).unwrap_or(Type::Vector4),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(c) => Some(c),
            _ => None,
        }
    }

    /// Linear blend from `self` (at 0) to `other` (at 1).
    ///
    /// Defined for numbers and for vectors of equal dimension.
    pub fn lerp(&self, other: &Value, ratio: f64) -> Option<Value> {
        let blend = |a: f64, b: f64| a + (b - a) * ratio;
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Some(Value::Number(blend(*a, *b))),
            (Value::Vector(a), Value::Vector(b)) if a.len() == b.len() => Some(Value::Vector(
                a.iter().zip(b.iter()).map(|(a, b)| blend(*a, *b)).collect(),
            )),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<[f64; 2]> for Value {
    fn from(v: [f64; 2]) -> Self {
        Value::vector(&v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::vector(&v)
    }
}

impl From<[f64; 4]> for Value {
    fn from(v: [f64; 4]) -> Self {
        Value::vector(&v)
    }
}
