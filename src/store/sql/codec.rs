//! Mapping between [`Value`] and the sparse value columns of `settings`
//!
//! A settings row has one nullable column per storable [`Type`], in
//! [`Type::STORABLE`] order. Exactly one of them is populated, the one that
//! `value_type` selects.

use crate::error::{Error, Result};
use crate::types::{Type, Value};
use rusqlite::types::Value as SqlValue;

/// Number of value columns
pub(crate) const VALUE_COLUMN_COUNT: usize = Type::STORABLE.len();

/// Value column names, in [`Type::STORABLE`] order
pub(crate) const VALUE_COLUMNS: [&str; VALUE_COLUMN_COUNT] = [
    "uint8_value",
    "uint16_value",
    "uint32_value",
    "uint64_value",
    "int8_value",
    "int16_value",
    "int32_value",
    "int64_value",
    "float32_value",
    "float64_value",
    "bool_value",
    "string_value",
];

/// Position of a storable type's column
fn column_index(typ: Type) -> Option<usize> {
    Type::STORABLE.iter().position(|t| *t == typ)
}

/// Encode a value into the column set, every other column NULL.
///
/// `uint64` is stored as the `i64` with the same bit pattern; floats are
/// stored as REAL, which holds every `f32` and `f64` exactly.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] for NaN, which SQLite would store as NULL,
/// and for negative zero, which SQLite would read back as positive zero.
pub(crate) fn encode(value: &Value) -> Result<[SqlValue; VALUE_COLUMN_COUNT]> {
    let encoded = match value {
        Value::Uint8(v) => SqlValue::Integer(i64::from(*v)),
        Value::Uint16(v) => SqlValue::Integer(i64::from(*v)),
        Value::Uint32(v) => SqlValue::Integer(i64::from(*v)),
        Value::Uint64(v) => SqlValue::Integer(*v as i64),
        Value::Int8(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int16(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int32(v) => SqlValue::Integer(i64::from(*v)),
        Value::Int64(v) => SqlValue::Integer(*v),
        Value::Float32(v) => SqlValue::Real(storable_float(f64::from(*v), Type::Float32)?),
        Value::Float64(v) => SqlValue::Real(storable_float(*v, Type::Float64)?),
        Value::Bool(v) => SqlValue::Integer(i64::from(*v)),
        Value::String(v) => SqlValue::Text(v.clone()),
    };

    let mut columns: [SqlValue; VALUE_COLUMN_COUNT] = std::array::from_fn(|_| SqlValue::Null);
    // Every Value variant has a storable type
    if let Some(index) = column_index(value.value_type()) {
        columns[index] = encoded;
    }
    Ok(columns)
}

fn storable_float(v: f64, typ: Type) -> Result<f64> {
    let (input, reason) = if v.is_nan() {
        ("NaN", "NaN cannot be stored")
    } else if v == 0.0 && v.is_sign_negative() {
        ("-0", "negative zero cannot be stored")
    } else {
        return Ok(v);
    };
    Err(Error::InvalidValue {
        typ,
        input: input.into(),
        reason: reason.into(),
    })
}

/// Decode the value of settings row `id`.
///
/// # Errors
///
/// Returns [`Error::RowCorrupt`] if `value_type` is unknown or unsupported, if
/// zero or several columns are populated, if the populated column is not the
/// one `value_type` selects, or if its content does not fit the type. A
/// `float32` column must hold a REAL that converts to `f32` exactly.
pub(crate) fn decode(
    id: i64,
    value_type: i64,
    columns: [SqlValue; VALUE_COLUMN_COUNT],
) -> Result<Value> {
    let corrupt = |reason: String| Error::RowCorrupt {
        table: "settings",
        id,
        reason,
    };

    let typ = u8::try_from(value_type)
        .ok()
        .and_then(Type::from_discriminant)
        .filter(|t| t.is_storable())
        .ok_or_else(|| corrupt(format!("unknown value_type {value_type}")))?;

    let mut populated = columns
        .into_iter()
        .enumerate()
        .filter(|(_, v)| !matches!(v, SqlValue::Null));

    let (index, raw) = match (populated.next(), populated.next()) {
        (Some(only), None) => only,
        (None, _) => return Err(corrupt("no value column populated".into())),
        (Some((first, _)), Some((second, _))) => {
            return Err(corrupt(format!(
                "several value columns populated ({}, {})",
                VALUE_COLUMNS[first], VALUE_COLUMNS[second]
            )));
        }
    };

    if column_index(typ) != Some(index) {
        return Err(corrupt(format!(
            "{typ} value stored in {}",
            VALUE_COLUMNS[index]
        )));
    }

    let out_of_range = |raw: &dyn std::fmt::Debug| corrupt(format!("{raw:?} is not a valid {typ}"));

    let value = match (typ, raw) {
        (Type::Uint8, SqlValue::Integer(v)) => {
            Value::Uint8(u8::try_from(v).map_err(|_| out_of_range(&v))?)
        }
        (Type::Uint16, SqlValue::Integer(v)) => {
            Value::Uint16(u16::try_from(v).map_err(|_| out_of_range(&v))?)
        }
        (Type::Uint32, SqlValue::Integer(v)) => {
            Value::Uint32(u32::try_from(v).map_err(|_| out_of_range(&v))?)
        }
        (Type::Uint64, SqlValue::Integer(v)) => Value::Uint64(v as u64),
        (Type::Int8, SqlValue::Integer(v)) => {
            Value::Int8(i8::try_from(v).map_err(|_| out_of_range(&v))?)
        }
        (Type::Int16, SqlValue::Integer(v)) => {
            Value::Int16(i16::try_from(v).map_err(|_| out_of_range(&v))?)
        }
        (Type::Int32, SqlValue::Integer(v)) => {
            Value::Int32(i32::try_from(v).map_err(|_| out_of_range(&v))?)
        }
        (Type::Int64, SqlValue::Integer(v)) => Value::Int64(v),
        (Type::Float32, SqlValue::Real(v)) => {
            let narrowed = v as f32;
            if v.is_finite() && f64::from(narrowed) != v {
                return Err(out_of_range(&v));
            }
            Value::Float32(narrowed)
        }
        (Type::Float64, SqlValue::Real(v)) => Value::Float64(v),
        (Type::Bool, SqlValue::Integer(v)) => match v {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            _ => return Err(out_of_range(&v)),
        },
        (Type::String, SqlValue::Text(v)) => Value::String(v),
        (_, other) => return Err(out_of_range(&other)),
    };

    Ok(value)
}
