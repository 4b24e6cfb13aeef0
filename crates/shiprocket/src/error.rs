//! Error taxonomy of the aggregator transport.

use serde_json::Value;

/// Errors from the Shiprocket REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ShiprocketError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A structured business rejection: HTTP 400/412, or an error object
    /// inside an HTTP 200 body.
    #[error("{message}")]
    Business { status: u16, message: String },

    /// Any other non-200 status.
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    /// No bearer token is available and login failed.
    #[error("Not authenticated with Shiprocket: {0}")]
    Unauthenticated(String),

    /// The body could not be read or lacks a required field.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ShiprocketError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Business { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an aggregator error body.
///
/// The `errors` object wins (serialized as JSON), then a non-empty
/// `message` string.
pub fn extract_message(body: &Value) -> Option<String> {
    if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
        return Some(errors.to_string());
    }
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Reject a 200 body that reports a failure through a `status_code` key.
///
/// Only meaningful for endpoints whose success bodies never carry that key
/// (AWB, label, pickup, manifest, invoice).
pub fn reject_embedded_error(body: Value) -> Result<Value, ShiprocketError> {
    match body.get("status_code") {
        Some(code) => Err(ShiprocketError::Business {
            status: code
                .as_u64()
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(200),
            message: extract_message(&body)
                .unwrap_or_else(|| format!("Request failed with status code {code}")),
        }),
        None => Ok(body),
    }
}
