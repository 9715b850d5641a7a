//! Parse response bodies into records, header lists, and write acks.
//!
//! Deployments are inconsistent: some wrap payloads in a `{status,
//! data|message}` envelope, others return a bare JSON array. Both shapes are
//! accepted here; a failure envelope becomes a `ServerError` carrying the
//! server's message.

use super::{Ack, Record};
use crate::retry::FetchError;
use serde_json::Value;
use std::collections::HashMap;

/// Parse a list-refresh body into records.
pub fn parse_records(body: &[u8]) -> Result<Vec<Record>, FetchError> {
    let data = envelope_data(parse_json(body)?)?;
    match data {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(record_from_object(map)),
                other => Err(FetchError::server(format!(
                    "expected a row object, got {}",
                    type_name(&other)
                ))),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(FetchError::server(format!(
            "expected an array of rows, got {}",
            type_name(&other)
        ))),
    }
}

/// Parse a header-list body into column names.
pub fn parse_headers(body: &[u8]) -> Result<Vec<String>, FetchError> {
    let data = envelope_data(parse_json(body)?)?;
    match data {
        Value::Array(items) => Ok(items.iter().map(scalar_to_string).collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(FetchError::server(format!(
            "expected an array of headers, got {}",
            type_name(&other)
        ))),
    }
}

/// Parse a keyed-read body. `Ok(None)` when the id matched nothing.
pub fn parse_one(body: &[u8]) -> Result<Option<Record>, FetchError> {
    let data = envelope_data(parse_json(body)?)?;
    match data {
        Value::Object(map) => Ok(Some(record_from_object(map))),
        Value::Array(items) => Ok(items.into_iter().find_map(|item| match item {
            Value::Object(map) => Some(record_from_object(map)),
            _ => None,
        })),
        Value::Null => Ok(None),
        other => Err(FetchError::server(format!(
            "expected a row object, got {}",
            type_name(&other)
        ))),
    }
}

/// Parse a write acknowledgment. The body is a JSON envelope or plain text;
/// an envelope whose status signals failure becomes a `ServerError`.
pub fn parse_ack(body: &[u8]) -> Result<Ack, FetchError> {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        // Text ack: the 2xx status already established success.
        let text = String::from_utf8_lossy(body).trim().to_string();
        let message = if text.is_empty() { None } else { Some(text) };
        return Ok(Ack { message });
    };

    match value {
        Value::Object(map) => {
            if let Some(status) = map.get("status").map(scalar_to_string) {
                if !is_success_status(&status) {
                    let message = map
                        .get("message")
                        .map(scalar_to_string)
                        .unwrap_or_else(|| format!("status {status}"));
                    return Err(FetchError::server(message));
                }
            }
            Ok(Ack {
                message: map.get("message").map(scalar_to_string),
            })
        }
        Value::String(s) => Ok(Ack { message: Some(s) }),
        _ => Ok(Ack::default()),
    }
}

fn parse_json(body: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(body)
        .map_err(|e| FetchError::server(format!("malformed response body: {e}")))
}

/// Unwrap the `{status, data|message}` envelope when present; pass bare
/// payloads through untouched.
fn envelope_data(value: Value) -> Result<Value, FetchError> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    if let Some(status) = map.get("status").map(scalar_to_string) {
        if !is_success_status(&status) {
            let message = map
                .get("message")
                .map(scalar_to_string)
                .unwrap_or_else(|| format!("status {status}"));
            return Err(FetchError::server(message));
        }
        return Ok(map.remove("data").unwrap_or(Value::Null));
    }
    if let Some(data) = map.remove("data") {
        return Ok(data);
    }
    // Plain object (e.g. a single row from a keyed read).
    Ok(Value::Object(map))
}

fn is_success_status(status: &str) -> bool {
    status.eq_ignore_ascii_case("success") || status.eq_ignore_ascii_case("ok") || status == "200"
}

fn record_from_object(map: serde_json::Map<String, Value>) -> Record {
    let fields: HashMap<String, String> = map
        .into_iter()
        .map(|(name, value)| (name, scalar_to_string(&value)))
        .collect();
    Record::from_fields(fields)
}

/// Cell values arrive as whatever JSON type the sheet produced; the client
/// treats every field as a string.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
