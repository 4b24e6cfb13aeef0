//! Response envelope for the HTTP surface the host mounts in front of the
//! provider, and the status-code allow-list it answers with.

use serde::Serialize;
use serde_json::Value;

use crate::result::ProviderResult;
use crate::validation::ValidationError;

/// Status used when a signalled code is not a standard one.
pub const FALLBACK_STATUS: u16 = 503;

/// Message shown in production instead of internal error text.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again later";

/// Deployment environment, which decides how much error detail is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Parse `APP_ENV`-style values. Anything but `production`/`prod` is
    /// treated as development.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiEnvelope {
    pub status: bool,
    pub message: String,
    pub data: Value,
    pub pagination: Option<Value>,
}

impl ApiEnvelope {
    pub fn success(data: Value, message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data,
            pagination: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: Value::Null,
            pagination: None,
        }
    }
}

impl From<&ProviderResult> for ApiEnvelope {
    fn from(result: &ProviderResult) -> Self {
        if result.status {
            Self::success(result.data.clone(), result.message.clone())
        } else {
            Self::error(result.message.clone())
        }
    }
}

impl From<&ValidationError> for ApiEnvelope {
    fn from(err: &ValidationError) -> Self {
        Self::error(err.message.clone())
    }
}

/// Map a signalled status code onto the allow-list of standard codes.
pub fn http_status_for(code: u16) -> u16 {
    match code {
        100..=101 | 200..=206 | 300..=307 | 400..=417 | 500..=505 => code,
        _ => FALLBACK_STATUS,
    }
}

/// Message safe to show the caller: the original text outside production,
/// a generic one in production.
pub fn public_message(message: &str, environment: Environment) -> String {
    match environment {
        Environment::Production => GENERIC_ERROR_MESSAGE.to_string(),
        Environment::Development => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allow_listed_codes_pass_through() {
        for code in [100, 101, 200, 206, 307, 400, 409, 412, 417, 500, 505] {
            assert_eq!(http_status_for(code), code);
        }
    }

    #[test]
    fn other_codes_fall_back_to_503() {
        for code in [0, 102, 207, 308, 418, 422, 429, 506, 999] {
            assert_eq!(http_status_for(code), FALLBACK_STATUS, "{code}");
        }
    }

    #[test]
    fn error_envelope_shape() {
        let v = serde_json::to_value(ApiEnvelope::error("Invalid shipment ids")).unwrap();
        assert_eq!(
            v,
            json!({"status": false, "message": "Invalid shipment ids", "data": null, "pagination": null})
        );
    }

    #[test]
    fn result_converts_into_envelope() {
        let ok = ProviderResult::success(json!({"awb_code": "A1"}), "AWB assigned successfully!");
        let env = ApiEnvelope::from(&ok);
        assert!(env.status);
        assert_eq!(env.data["awb_code"], "A1");

        let failed = ApiEnvelope::from(&ProviderResult::failure("boom"));
        assert!(!failed.status);
        assert!(failed.data.is_null());
    }

    #[test]
    fn production_hides_internal_messages() {
        assert_eq!(
            public_message("db password wrong", Environment::Production),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            public_message("db password wrong", Environment::Development),
            "db password wrong"
        );
        assert_eq!(Environment::parse("PRODUCTION"), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }
}
