//! Request validators for the package endpoints.
//!
//! Validators are pure and run before any remote call. Every failure is a
//! [`ValidationError`] with code 409.

pub mod package;
pub mod phone;

use serde::Serialize;

pub use package::{CreatePackageRequest, PackageItemRequest};
pub use phone::{PhoneValidator, RegionPhoneValidator};

/// Status code carried by every validator failure.
pub const VALIDATION_CODE: u16 = 409;

/// Structured `{code, message}` rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub code: u16,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: VALIDATION_CODE,
            message: message.into(),
        }
    }
}

/// Reject empty id lists with `Invalid <list_type> ids`.
pub fn validate_id_list<S: AsRef<str>>(ids: &[S], list_type: &str) -> Result<(), ValidationError> {
    if ids.is_empty() || ids.iter().any(|id| id.as_ref().trim().is_empty()) {
        return Err(ValidationError::new(format!("Invalid {list_type} ids")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_rejected() {
        let err = validate_id_list::<String>(&[], "shipment").unwrap_err();
        assert_eq!(err.code, 409);
        assert_eq!(err.message, "Invalid shipment ids");
    }

    #[test]
    fn blank_id_is_rejected() {
        assert!(validate_id_list(&["1", " "], "order").is_err());
    }

    #[test]
    fn populated_list_passes() {
        assert!(validate_id_list(&["1", "2"], "order").is_ok());
    }

    #[test]
    fn serializes_as_code_and_message() {
        let v = serde_json::to_value(ValidationError::new("Invalid comment!")).unwrap();
        assert_eq!(v, serde_json::json!({"code": 409, "message": "Invalid comment!"}));
    }
}
