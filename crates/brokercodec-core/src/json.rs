//! Type-directed conversion between JSON and `AbiValue`.
//!
//! JSON cannot carry 256-bit integers or raw bytes, so the declared
//! `ParamType` decides how each JSON value is read: integers accept JSON
//! numbers or decimal / `0x` hex strings, byte types accept `0x` hex
//! strings, arrays and tuples accept JSON arrays.

use alloy_primitives::{I256, U256};
use serde_json::{json, Value};

use crate::call::DecodedResult;
use crate::descriptor::parse_address;
use crate::types::{AbiValue, ParamType};

/// Read a JSON value as the given ABI type.
///
/// Range checks against the declared bit width are left to the encoder;
/// this only rejects values that cannot be represented at all.
pub fn value_from_json(ty: &ParamType, json: &Value) -> Result<AbiValue, String> {
    match ty {
        ParamType::Bool => match json {
            Value::Bool(b) => Ok(AbiValue::Bool(*b)),
            Value::String(s) if s == "true" => Ok(AbiValue::Bool(true)),
            Value::String(s) if s == "false" => Ok(AbiValue::Bool(false)),
            other => Err(format!("expected boolean, got {other}")),
        },

        ParamType::Uint(_) => match json {
            Value::Number(n) => n
                .as_u64()
                .map(|v| AbiValue::Uint(U256::from(v)))
                .ok_or_else(|| format!("expected non-negative integer, got {n}")),
            Value::String(s) => parse_uint(s).map(AbiValue::Uint),
            other => Err(format!("expected unsigned integer, got {other}")),
        },

        ParamType::Int(_) => match json {
            Value::Number(n) => {
                let v = n
                    .as_i64()
                    .ok_or_else(|| format!("expected integer, got {n}"))?;
                I256::try_from(v)
                    .map(AbiValue::Int)
                    .map_err(|e| e.to_string())
            }
            Value::String(s) => parse_int(s).map(AbiValue::Int),
            other => Err(format!("expected signed integer, got {other}")),
        },

        ParamType::Address => match json {
            Value::String(s) => parse_address(s).map(AbiValue::Address),
            other => Err(format!("expected address string, got {other}")),
        },

        ParamType::String => match json {
            Value::String(s) => Ok(AbiValue::String(s.clone())),
            other => Err(format!("expected string, got {other}")),
        },

        ParamType::Bytes => parse_hex_bytes(json).map(AbiValue::Bytes),
        ParamType::FixedBytes(_) => parse_hex_bytes(json).map(AbiValue::FixedBytes),

        ParamType::Array(elem) | ParamType::FixedArray(elem, _) => match json {
            Value::Array(items) => items
                .iter()
                .map(|item| value_from_json(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::Array),
            other => Err(format!("expected array, got {other}")),
        },

        ParamType::Tuple(types) => match json {
            Value::Array(items) if items.len() == types.len() => types
                .iter()
                .zip(items)
                .map(|(t, item)| value_from_json(t, item))
                .collect::<Result<Vec<_>, _>>()
                .map(AbiValue::Tuple),
            Value::Array(items) => Err(format!(
                "expected tuple of {} components, got {}",
                types.len(),
                items.len()
            )),
            other => Err(format!("expected tuple array, got {other}")),
        },
    }
}

/// Render a value as JSON. Integers that fit `u64`/`i64` become JSON
/// numbers; larger ones become decimal strings.
pub fn value_to_json(value: &AbiValue) -> Value {
    match value {
        AbiValue::Bool(b) => Value::Bool(*b),
        AbiValue::Uint(u) => match u64::try_from(*u) {
            Ok(v) => json!(v),
            Err(_) => Value::String(u.to_string()),
        },
        AbiValue::Int(i) => match i64::try_from(*i) {
            Ok(v) => json!(v),
            Err(_) => Value::String(i.to_string()),
        },
        AbiValue::Address(a) => Value::String(a.to_checksum(None)),
        AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        AbiValue::String(s) => Value::String(s.clone()),
        AbiValue::Array(items) | AbiValue::Tuple(items) => {
            Value::Array(items.iter().map(value_to_json).collect())
        }
    }
}

/// `[{"name": ..., "value": ...}, ...]` in declaration order.
pub fn result_to_json(result: &DecodedResult) -> Value {
    Value::Array(
        result
            .iter()
            .map(|(name, value)| json!({ "name": name, "value": value_to_json(value) }))
            .collect(),
    )
}

fn parse_uint(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if s.starts_with('-') {
        return Err(format!("'{s}' is negative"));
    }
    match s.strip_prefix("0x") {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16),
        None => U256::from_str_radix(s, 10),
    }
    .map_err(|e| format!("invalid unsigned integer '{s}': {e}"))
}

fn parse_int(s: &str) -> Result<I256, String> {
    let s = s.trim();
    if s.contains("0x") {
        I256::from_hex_str(s).map_err(|e| format!("invalid signed integer '{s}': {e}"))
    } else {
        I256::from_dec_str(s).map_err(|e| format!("invalid signed integer '{s}': {e}"))
    }
}

fn parse_hex_bytes(json: &Value) -> Result<Vec<u8>, String> {
    match json {
        Value::String(s) => {
            hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| format!("invalid hex '{s}': {e}"))
        }
        other => Err(format!("expected 0x-prefixed hex string, got {other}")),
    }
}
