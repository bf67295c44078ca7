//! Forgiving field decoders for records written by other clients.
//!
//! Numbers may arrive as strings, text may arrive as numbers, and missing or
//! null members fall back to a neutral value instead of failing the record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Any number or numeric string; anything else is 0.
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_f64).unwrap_or(0.0))
}

/// Rounded to a whole unit, at least one.
pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(as_f64)
        .map(|q| q.round().clamp(1.0, f64::from(u32::MAX)) as u32)
        .unwrap_or(1))
}

pub fn one() -> u32 {
    1
}

/// Strings as-is, numbers and booleans in their JSON form, null as empty.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
