//! The uniform `{status, data, message}` envelope returned by every
//! provider operation.
//!
//! A failed envelope always carries `data = null` and a non-empty,
//! human-readable message; [`ProviderResult::failure`] enforces both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message used when a failure carries no usable text of its own.
pub const FALLBACK_FAILURE_MESSAGE: &str = "Error while operating!";

/// Outcome of a single remote operation (or of one slot of a fan-out).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub status: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: String,
}

impl ProviderResult {
    /// A successful outcome carrying the provider payload.
    pub fn success(data: Value, message: impl Into<String>) -> Self {
        Self {
            status: true,
            data,
            message: message.into(),
        }
    }

    /// A failed outcome. Blank messages are replaced by
    /// [`FALLBACK_FAILURE_MESSAGE`].
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            status: false,
            data: Value::Null,
            message,
        }
    }

    /// Convert any displayable error into a failed outcome.
    pub fn from_error(err: &impl std::fmt::Display) -> Self {
        Self::failure(err.to_string())
    }

    /// Serialize the whole envelope into a JSON object, for merging into
    /// persisted fulfillment data.
    pub fn to_object(&self) -> serde_json::Map<String, Value> {
        let mut map = serde_json::Map::new();
        map.insert("status".into(), Value::Bool(self.status));
        map.insert("data".into(), self.data.clone());
        map.insert("message".into(), Value::String(self.message.clone()));
        map
    }
}

/// Render a JSON identifier (provider ids arrive as numbers or strings) as
/// a string. Returns `None` for anything that is not a scalar id.
pub fn json_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
