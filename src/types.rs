//! Type registry: the closed set of value types a setting may hold
//!
//! [`Type`] is the discriminant, [`Value`] is the sum type carrying one of the
//! registered primitives. A `Value` always knows its own `Type`, so a setting's
//! value can never disagree with its tag.
//!
//! Dynamically-typed input enters the registry through [`type_of`],
//! [`Value::from_any`], [`Value::from_json`] or [`Value::parse`]. Anything
//! outside the registry is reported as [`Type::Unsupported`] or
//! [`Error::UnsupportedType`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type
// =============================================================================

/// The type of a setting's value.
///
/// Discriminants are part of the persisted format and never change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Type {
    /// Sentinel for values outside the registry. Never stored.
    #[default]
    Unsupported = 0,
    /// 1 byte unsigned integer
    Uint8 = 1,
    /// 2 byte unsigned integer
    Uint16 = 2,
    /// 4 byte unsigned integer
    Uint32 = 3,
    /// 8 byte unsigned integer
    Uint64 = 4,
    /// 1 byte signed integer
    Int8 = 5,
    /// 2 byte signed integer
    Int16 = 6,
    /// 4 byte signed integer
    Int32 = 7,
    /// 8 byte signed integer
    Int64 = 8,
    /// IEEE 754 single precision float
    Float32 = 9,
    /// IEEE 754 double precision float
    Float64 = 10,
    /// Boolean
    Bool = 11,
    /// UTF-8 string
    String = 12,
}

impl Type {
    /// Every storable type, in declaration order.
    pub const STORABLE: [Type; 12] = [
        Type::Uint8,
        Type::Uint16,
        Type::Uint32,
        Type::Uint64,
        Type::Int8,
        Type::Int16,
        Type::Int32,
        Type::Int64,
        Type::Float32,
        Type::Float64,
        Type::Bool,
        Type::String,
    ];

    /// Stable lowercase name, used in diagnostics and serialized forms
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Type::Unsupported => "unsupported",
            Type::Uint8 => "uint8",
            Type::Uint16 => "uint16",
            Type::Uint32 => "uint32",
            Type::Uint64 => "uint64",
            Type::Int8 => "int8",
            Type::Int16 => "int16",
            Type::Int32 => "int32",
            Type::Int64 => "int64",
            Type::Float32 => "float32",
            Type::Float64 => "float64",
            Type::Bool => "bool",
            Type::String => "string",
        }
    }

    /// Numeric discriminant as persisted
    #[must_use]
    pub const fn discriminant(self) -> u8 {
        self as u8
    }

    /// Look up a type by its persisted discriminant.
    ///
    /// Returns `None` for discriminants that were never assigned.
    #[must_use]
    pub fn from_discriminant(discriminant: u8) -> Option<Type> {
        match discriminant {
            0 => Some(Type::Unsupported),
            d => Type::STORABLE.get(usize::from(d) - 1).copied(),
        }
    }

    /// Whether a setting may durably hold a value of this type
    #[must_use]
    pub const fn is_storable(self) -> bool {
        !matches!(self, Type::Unsupported)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Type::STORABLE
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or(Error::UnsupportedType)
    }
}

/// Returns the [`Type`] that represents the concrete type of `value`.
///
/// Anything that is not one of the registered primitives (`u8` through `u64`,
/// `i8` through `i64`, `f32`, `f64`, `bool`, `String`, `&'static str`) yields
/// [`Type::Unsupported`].
///
/// # Example
///
/// ```
/// use cfgstore::{type_of, Type};
///
/// assert_eq!(type_of(&3i32), Type::Int32);
/// assert_eq!(type_of(&"text"), Type::String);
/// assert_eq!(type_of(&vec![1u8, 2]), Type::Unsupported);
/// ```
#[must_use]
pub fn type_of(value: &dyn Any) -> Type {
    if value.is::<u8>() {
        Type::Uint8
    } else if value.is::<u16>() {
        Type::Uint16
    } else if value.is::<u32>() {
        Type::Uint32
    } else if value.is::<u64>() {
        Type::Uint64
    } else if value.is::<i8>() {
        Type::Int8
    } else if value.is::<i16>() {
        Type::Int16
    } else if value.is::<i32>() {
        Type::Int32
    } else if value.is::<i64>() {
        Type::Int64
    } else if value.is::<f32>() {
        Type::Float32
    } else if value.is::<f64>() {
        Type::Float64
    } else if value.is::<bool>() {
        Type::Bool
    } else if value.is::<String>() || value.is::<&'static str>() {
        Type::String
    } else {
        Type::Unsupported
    }
}

// =============================================================================
// Value
// =============================================================================

/// A setting value: exactly one of the registered primitive types.
///
/// Serialized adjacently tagged, e.g. `{"type": "int32", "value": 3}`, so the
/// type survives a round trip through formats with a single number kind.
///
/// Equality is structural; floats compare by bit pattern, so `NaN == NaN` and
/// `0.0 != -0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
}

impl Value {
    /// The discriminant of this value
    #[must_use]
    pub const fn value_type(&self) -> Type {
        match self {
            Value::Uint8(_) => Type::Uint8,
            Value::Uint16(_) => Type::Uint16,
            Value::Uint32(_) => Type::Uint32,
            Value::Uint64(_) => Type::Uint64,
            Value::Int8(_) => Type::Int8,
            Value::Int16(_) => Type::Int16,
            Value::Int32(_) => Type::Int32,
            Value::Int64(_) => Type::Int64,
            Value::Float32(_) => Type::Float32,
            Value::Float64(_) => Type::Float64,
            Value::Bool(_) => Type::Bool,
            Value::String(_) => Type::String,
        }
    }

    /// Convert a dynamically-typed value into a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] when [`type_of`] reports
    /// [`Type::Unsupported`].
    pub fn from_any(value: &dyn Any) -> Result<Value> {
        let converted = match type_of(value) {
            Type::Uint8 => value.downcast_ref::<u8>().map(|v| Value::Uint8(*v)),
            Type::Uint16 => value.downcast_ref::<u16>().map(|v| Value::Uint16(*v)),
            Type::Uint32 => value.downcast_ref::<u32>().map(|v| Value::Uint32(*v)),
            Type::Uint64 => value.downcast_ref::<u64>().map(|v| Value::Uint64(*v)),
            Type::Int8 => value.downcast_ref::<i8>().map(|v| Value::Int8(*v)),
            Type::Int16 => value.downcast_ref::<i16>().map(|v| Value::Int16(*v)),
            Type::Int32 => value.downcast_ref::<i32>().map(|v| Value::Int32(*v)),
            Type::Int64 => value.downcast_ref::<i64>().map(|v| Value::Int64(*v)),
            Type::Float32 => value.downcast_ref::<f32>().map(|v| Value::Float32(*v)),
            Type::Float64 => value.downcast_ref::<f64>().map(|v| Value::Float64(*v)),
            Type::Bool => value.downcast_ref::<bool>().map(|v| Value::Bool(*v)),
            Type::String => value
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| value.downcast_ref::<&'static str>().map(|s| (*s).to_string()))
                .map(Value::String),
            Type::Unsupported => None,
        };

        converted.ok_or(Error::UnsupportedType)
    }

    /// Convert a JSON scalar into a [`Value`].
    ///
    /// Integers become `Int64` (or `Uint64` above `i64::MAX`), other numbers
    /// `Float64`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] for `null`, arrays and objects.
    pub fn from_json(json: &serde_json::Value) -> Result<Value> {
        use serde_json::Value as Json;

        match json {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int64(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::Uint64(u))
                } else {
                    n.as_f64().map(Value::Float64).ok_or(Error::UnsupportedType)
                }
            }
            Json::Null | Json::Array(_) | Json::Object(_) => Err(Error::UnsupportedType),
        }
    }

    /// Parse text into a value of the requested type.
    ///
    /// # Errors
    ///
    /// * [`Error::UnsupportedType`] if `typ` is [`Type::Unsupported`]
    /// * [`Error::InvalidValue`] if `input` is not a valid literal of `typ`
    pub fn parse(typ: Type, input: &str) -> Result<Value> {
        let value = match typ {
            Type::Unsupported => return Err(Error::UnsupportedType),
            Type::Uint8 => Value::Uint8(parse_literal(typ, input)?),
            Type::Uint16 => Value::Uint16(parse_literal(typ, input)?),
            Type::Uint32 => Value::Uint32(parse_literal(typ, input)?),
            Type::Uint64 => Value::Uint64(parse_literal(typ, input)?),
            Type::Int8 => Value::Int8(parse_literal(typ, input)?),
            Type::Int16 => Value::Int16(parse_literal(typ, input)?),
            Type::Int32 => Value::Int32(parse_literal(typ, input)?),
            Type::Int64 => Value::Int64(parse_literal(typ, input)?),
            Type::Float32 => Value::Float32(parse_literal(typ, input)?),
            Type::Float64 => Value::Float64(parse_literal(typ, input)?),
            Type::Bool => Value::Bool(parse_literal(typ, input)?),
            Type::String => Value::String(input.to_string()),
        };
        Ok(value)
    }

    /// Returns the string slice if this is a `String` value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool` value
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widen any signed or unsigned integer value to `i64`.
    ///
    /// Returns `None` for non-integers and for `Uint64` values above `i64::MAX`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Uint8(v) => Some(i64::from(*v)),
            Value::Uint16(v) => Some(i64::from(*v)),
            Value::Uint32(v) => Some(i64::from(*v)),
            Value::Uint64(v) => i64::try_from(*v).ok(),
            Value::Int8(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widen a float value to `f64`
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(v) => Some(f64::from(*v)),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }
}

fn parse_literal<T>(typ: Type, input: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    input.trim().parse::<T>().map_err(|e| Error::InvalidValue {
        typ,
        input: input.to_string(),
        reason: e.to_string(),
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Uint8(a), Value::Uint8(b)) => a == b,
            (Value::Uint16(a), Value::Uint16(b)) => a == b,
            (Value::Uint32(a), Value::Uint32(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint8(v) => write!(f, "{v}"),
            Value::Uint16(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    String => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================
