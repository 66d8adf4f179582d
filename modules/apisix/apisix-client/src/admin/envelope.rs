//! Response envelopes of the admin API.
//!
//! ```text
//! v2 item:  {"node": {"key": "/apisix/routes/1", "value": {...}}}
//! v2 list:  {"node": {"nodes": [{"key": ..., "value": {...}}, ...]}}
//!           (an empty collection may come back as "nodes": {})
//! v3 item:  {"key": "/apisix/routes/1", "value": {...}}
//! v3 list:  {"total": 1, "list": [{"key": ..., "value": {...}}]}
//! error:    {"error_msg": "..."} or {"message": "..."}
//! ```

use apisix_sdk::{ApisixError, Resource};
use serde_json::Value;

const MAX_RAW_MESSAGE: usize = 256;

/// Decode the stored resource from a single-item response.
pub(super) fn decode_item<T: Resource>(body: &[u8]) -> Result<T, ApisixError> {
    let root = parse(body)?;
    let item = root.get("node").unwrap_or(&root);
    item_value(item)
}

/// Decode every resource from a collection response.
pub(super) fn decode_list<T: Resource>(body: &[u8]) -> Result<Vec<T>, ApisixError> {
    let root = parse(body)?;

    let items = if let Some(node) = root.get("node") {
        match node.get("nodes") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Object(_) | Value::Null) | None => &[],
            Some(other) => {
                return Err(ApisixError::Decode(format!(
                    "unexpected `nodes` value: {other}"
                )));
            }
        }
    } else if let Some(list) = root.get("list") {
        match list {
            Value::Array(items) => items.as_slice(),
            Value::Object(_) | Value::Null => &[],
            other => {
                return Err(ApisixError::Decode(format!(
                    "unexpected `list` value: {other}"
                )));
            }
        }
    } else {
        return Err(ApisixError::Decode(
            "collection response has neither `node` nor `list`".to_owned(),
        ));
    };

    items.iter().map(item_value).collect()
}

/// Best-effort human message from an error response body.
pub(super) fn error_message(body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for field in ["error_msg", "message"] {
            if let Some(Value::String(msg)) = map.get(field) {
                return msg.clone();
            }
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    match raw.char_indices().nth(MAX_RAW_MESSAGE) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_owned(),
    }
}

fn parse(body: &[u8]) -> Result<Value, ApisixError> {
    serde_json::from_slice(body).map_err(|e| ApisixError::Decode(e.to_string()))
}

fn item_value<T: Resource>(item: &Value) -> Result<T, ApisixError> {
    let value = item
        .get("value")
        .ok_or_else(|| ApisixError::Decode(format!("{} item has no `value`", T::KIND)))?;

    let mut resource: T =
        serde_json::from_value(value.clone()).map_err(|e| ApisixError::Decode(e.to_string()))?;

    // Older servers leave the id out of the value; it is the last key segment.
    if resource.id().is_none()
        && let Some(id) = item
            .get("key")
            .and_then(Value::as_str)
            .and_then(|key| key.rsplit('/').next())
            .filter(|id| !id.is_empty())
    {
        resource.set_id(id.to_owned());
    }

    Ok(resource)
}
