// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS REST response parsing helpers

use serde::Deserialize;
use serde_json::Value;

use super::error::ClientError;
use super::types::{InterfaceInfo, Record, SystemResource};

/// Error payload RouterOS sends with non-2xx replies:
/// `{"error":400,"message":"Bad Request","detail":"no such command"}`
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Decodes a REST body into records
///
/// RouterOS answers with a single object for singleton menus
/// (`/system/resource`) and with an array of objects for lists.
pub(crate) fn decode_records(address: &str, body: &str) -> Result<Vec<Record>, ClientError> {
    let protocol = |message: String| ClientError::Protocol {
        address: address.to_string(),
        message,
    };

    let value: Value = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(80).collect();
        protocol(format!("invalid JSON ({e}), body starts with {preview:?}"))
    })?;

    match value {
        Value::Object(map) => Ok(vec![flatten_object(map).map_err(protocol)?]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(map) => flatten_object(map).map_err(protocol),
                other => Err(protocol(format!(
                    "element {idx} is {}, expected an object",
                    kind_of(&other)
                ))),
            })
            .collect(),
        other => Err(protocol(format!(
            "top-level value is {}, expected an object or array",
            kind_of(&other)
        ))),
    }
}

fn flatten_object(map: serde_json::Map<String, Value>) -> Result<Record, String> {
    let mut record = Record::new();
    for (key, value) in map {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            other => {
                return Err(format!(
                    "field '{key}' is {}, expected a scalar",
                    kind_of(&other)
                ));
            }
        };
        record.insert(key, text);
    }
    Ok(record)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builds a `Device` error from a non-success reply
pub(crate) fn decode_device_error(address: &str, status: u16, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<RestErrorBody>(body).ok();
    let (message, detail) = match parsed {
        Some(err) => (err.message, err.detail),
        None => (None, None),
    };
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_reason(status));
    ClientError::Device {
        address: address.to_string(),
        status,
        message,
        detail,
    }
}

fn default_reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

fn number(record: &Record, key: &str) -> u64 {
    record.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

fn flag(record: &Record, key: &str) -> bool {
    record.get(key).is_some_and(|v| v == "true" || v == "yes")
}

pub(crate) fn parse_identity(records: &[Record]) -> Option<String> {
    records
        .iter()
        .find_map(|r| r.get("name"))
        .filter(|name| !name.is_empty())
        .cloned()
}

pub(crate) fn parse_system(records: &[Record]) -> SystemResource {
    let empty = Record::new();
    let first = records
        .iter()
        .find(|r| r.contains_key("version"))
        .or_else(|| records.first())
        .unwrap_or(&empty);
    SystemResource {
        uptime: first
            .get("uptime")
            .cloned()
            .unwrap_or_else(|| "0s".to_string()),
        cpu_load: number(first, "cpu-load"),
        free_memory: number(first, "free-memory"),
        total_memory: number(first, "total-memory"),
        version: first
            .get("version")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string()),
        board_name: first
            .get("board-name")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string()),
        architecture: first
            .get("architecture-name")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

pub(crate) fn parse_interfaces(records: &[Record]) -> Vec<InterfaceInfo> {
    let mut out = Vec::new();
    for r in records {
        if let Some(name) = r.get("name") {
            out.push(InterfaceInfo {
                name: name.clone(),
                kind: r.get("type").cloned().unwrap_or_default(),
                mac_address: r.get("mac-address").filter(|v| !v.is_empty()).cloned(),
                running: flag(r, "running"),
                disabled: flag(r, "disabled"),
                rx_bytes: number(r, "rx-byte"),
                tx_bytes: number(r, "tx-byte"),
                rx_packets: number(r, "rx-packet"),
                tx_packets: number(r, "tx-packet"),
                rx_errors: number(r, "rx-error"),
                tx_errors: number(r, "tx-error"),
                comment: r.get("comment").filter(|v| !v.is_empty()).cloned(),
            });
        }
    }
    out
}
