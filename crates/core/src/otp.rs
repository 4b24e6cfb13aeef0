//! One-time pickup confirmation codes.

use rand::Rng;

/// Number of digits in a pickup confirmation code.
pub const OTP_LENGTH: usize = 6;

/// Generate a numeric one-time code of [`OTP_LENGTH`] digits. Leading zeros
/// are kept.
pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_ascii_digits() {
        for _ in 0..200 {
            let otp = generate_otp();
            assert_eq!(otp.len(), OTP_LENGTH);
            assert!(otp.chars().all(|c| c.is_ascii_digit()), "{otp}");
        }
    }

    #[test]
    fn otps_vary() {
        let codes: std::collections::HashSet<_> = (0..50).map(|_| generate_otp()).collect();
        assert!(codes.len() > 1);
    }
}
