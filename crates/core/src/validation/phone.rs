//! Phone number validation capability.
//!
//! Constructed once at startup and passed to the validators that need it.

use std::sync::LazyLock;

use regex::Regex;

/// Decides whether a raw phone string is usable for a shipment.
pub trait PhoneValidator: Send + Sync {
    fn is_valid(&self, phone: &str) -> bool;
}

/// Indian mobile numbers, optionally prefixed by `+91`/`91` and a trunk `0`.
static IN_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+?91[\s-]?)?0?[6-9]\d{9}$").expect("valid regex")
});

/// International numbers in E.164 form.
static E164_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("valid regex"));

/// Region-aware validator. Numbers are checked against the default region's
/// pattern first, then accepted if they are valid E.164.
#[derive(Debug, Clone)]
pub struct RegionPhoneValidator {
    region: String,
}

impl RegionPhoneValidator {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into().to_uppercase(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn region_pattern(&self) -> Option<&'static Regex> {
        match self.region.as_str() {
            "IN" => Some(&IN_PHONE_RE),
            _ => None,
        }
    }
}

impl Default for RegionPhoneValidator {
    fn default() -> Self {
        Self::new("IN")
    }
}

impl PhoneValidator for RegionPhoneValidator {
    fn is_valid(&self, phone: &str) -> bool {
        let compact: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        if compact.is_empty() {
            return false;
        }
        if let Some(re) = self.region_pattern() {
            if re.is_match(&compact) {
                return true;
            }
        }
        E164_RE.is_match(&compact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_indian_mobile_formats() {
        let v = RegionPhoneValidator::default();
        assert!(v.is_valid("9876543210"));
        assert!(v.is_valid("+91 98765 43210"));
        assert!(v.is_valid("09876543210"));
        assert!(v.is_valid("91-9876543210"));
    }

    #[test]
    fn rejects_garbage() {
        let v = RegionPhoneValidator::default();
        assert!(!v.is_valid(""));
        assert!(!v.is_valid("12345"));
        assert!(!v.is_valid("phone"));
        assert!(!v.is_valid("1234567890"));
    }

    #[test]
    fn falls_back_to_e164_for_other_regions() {
        let v = RegionPhoneValidator::new("us");
        assert_eq!(v.region(), "US");
        assert!(v.is_valid("+1 415 555 0100"));
        assert!(!v.is_valid("4155550100"));
    }
}
