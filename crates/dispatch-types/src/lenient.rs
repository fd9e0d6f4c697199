//! Lenient field decoders for producer payloads.
//!
//! Producers are loosely typed: distances arrive as floats or strings,
//! missing coordinates arrive as `""`, ages arrive as numbers or numeric
//! strings. These decoders accept every shape seen in practice and map
//! anything unusable to `None` instead of rejecting the whole envelope.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a display string from a string, number or boolean.
///
/// `null`, arrays and objects decode as absent.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

/// Decode a coordinate component from a number or a numeric string.
///
/// Empty strings, unparseable strings and non-finite numbers decode as
/// absent.
pub fn coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coordinate_from_value(&value))
}

/// Decode a non-negative integer from a number or a numeric string.
pub fn whole_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(whole_number_from_value(&value))
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coordinate_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn whole_number_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
