//! Conversion of loosely typed input into values of a column's type.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ColumnType, Value};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::domain::common::entities::app_errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Bool,
    Uuid,
    DateTimeUtc,
    Json,
    Text,
}

fn kind_of<C: ColumnTrait>(column: C) -> ColumnKind {
    match column.def().get_column_type() {
        ColumnType::TinyInteger => ColumnKind::TinyInt,
        ColumnType::SmallInteger => ColumnKind::SmallInt,
        ColumnType::Integer => ColumnKind::Int,
        ColumnType::BigInteger => ColumnKind::BigInt,
        ColumnType::Float => ColumnKind::Float,
        ColumnType::Double | ColumnType::Decimal(_) => ColumnKind::Double,
        ColumnType::Boolean => ColumnKind::Bool,
        ColumnType::Uuid => ColumnKind::Uuid,
        ColumnType::TimestampWithTimeZone => ColumnKind::DateTimeUtc,
        ColumnType::Json | ColumnType::JsonBinary => ColumnKind::Json,
        _ => ColumnKind::Text,
    }
}

fn null_of(kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::TinyInt => Value::TinyInt(None),
        ColumnKind::SmallInt => Value::SmallInt(None),
        ColumnKind::Int => Value::Int(None),
        ColumnKind::BigInt => Value::BigInt(None),
        ColumnKind::Float => Value::Float(None),
        ColumnKind::Double => Value::Double(None),
        ColumnKind::Bool => Value::Bool(None),
        ColumnKind::Uuid => Value::Uuid(None),
        ColumnKind::DateTimeUtc => Value::ChronoDateTimeUtc(None),
        ColumnKind::Json => Value::Json(None),
        ColumnKind::Text => Value::String(None),
    }
}

fn parse_text(kind: ColumnKind, raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    match kind {
        ColumnKind::TinyInt => trimmed.parse::<i8>().ok().map(Value::from),
        ColumnKind::SmallInt => trimmed.parse::<i16>().ok().map(Value::from),
        ColumnKind::Int => trimmed.parse::<i32>().ok().map(Value::from),
        ColumnKind::BigInt => trimmed.parse::<i64>().ok().map(Value::from),
        ColumnKind::Float => trimmed.parse::<f32>().ok().map(Value::from),
        ColumnKind::Double => trimmed.parse::<f64>().ok().map(Value::from),
        ColumnKind::Bool => match trimmed {
            "1" | "true" => Some(Value::from(true)),
            "0" | "false" => Some(Value::from(false)),
            _ => None,
        },
        ColumnKind::Uuid => Uuid::parse_str(trimmed).ok().map(Value::from),
        ColumnKind::DateTimeUtc => DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|datetime| Value::from(datetime.with_timezone(&Utc))),
        ColumnKind::Json => serde_json::from_str::<JsonValue>(raw).ok().map(Value::from),
        ColumnKind::Text => Some(Value::from(raw.to_string())),
    }
}

fn parse_json(kind: ColumnKind, json: &JsonValue) -> Option<Value> {
    match (kind, json) {
        (_, JsonValue::Null) => Some(null_of(kind)),
        (ColumnKind::Json, json) => Some(Value::from(json.clone())),
        (ColumnKind::TinyInt, JsonValue::Number(n)) => {
            n.as_i64().and_then(|v| i8::try_from(v).ok()).map(Value::from)
        }
        (ColumnKind::SmallInt, JsonValue::Number(n)) => {
            n.as_i64().and_then(|v| i16::try_from(v).ok()).map(Value::from)
        }
        (ColumnKind::Int, JsonValue::Number(n)) => {
            n.as_i64().and_then(|v| i32::try_from(v).ok()).map(Value::from)
        }
        (ColumnKind::BigInt, JsonValue::Number(n)) => n.as_i64().map(Value::from),
        (ColumnKind::Float, JsonValue::Number(n)) => n.as_f64().map(|v| Value::from(v as f32)),
        (ColumnKind::Double, JsonValue::Number(n)) => n.as_f64().map(Value::from),
        (ColumnKind::Bool, JsonValue::Bool(b)) => Some(Value::from(*b)),
        (ColumnKind::Text, JsonValue::Number(n)) => Some(Value::from(n.to_string())),
        (ColumnKind::Text, JsonValue::Bool(b)) => Some(Value::from(b.to_string())),
        (kind, JsonValue::String(s)) => parse_text(kind, s),
        _ => None,
    }
}

/// Looks up a column by its name.
pub fn column_named<C: ColumnTrait>(name: &str) -> Option<C> {
    name.parse::<C>().ok()
}

/// Coerces a request parameter for a comparison against `column`.
pub fn coerce_param<C: ColumnTrait>(column: C, key: &str, raw: &str) -> Result<Value, CoreError> {
    parse_text(kind_of(column), raw).ok_or_else(|| CoreError::InvalidParameter {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Coerces a JSON attribute into the exact value type of `column`.
pub fn coerce_attribute<C: ColumnTrait>(
    column: C,
    key: &str,
    json: &JsonValue,
) -> Result<Value, CoreError> {
    parse_json(kind_of(column), json)
        .ok_or_else(|| CoreError::DataShape(format!("attribute `{key}` cannot hold {json}")))
}

/// Integer-looking values compare as integers, anything else as text.
pub fn loose_value(raw: &str) -> Value {
    match raw.trim().parse::<i64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::from(raw.to_string()),
    }
}
