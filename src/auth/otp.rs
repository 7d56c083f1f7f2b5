use rand::Rng;
use time::{Duration, OffsetDateTime};

/// Validity window for verification codes.
pub const VERIFY_TTL: Duration = Duration::hours(24);
/// Validity window for password-reset codes.
pub const RESET_TTL: Duration = Duration::hours(1);

/// Outcome of comparing a supplied code against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    Expired,
    Mismatch,
}

/// Uniform 6-digit numeric code.
pub fn generate() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Expiry timestamp for a code issued now.
pub fn expires_in(ttl: Duration) -> OffsetDateTime {
    OffsetDateTime::now_utc() + ttl
}

/// Compares a supplied code against the stored one. Codes are single use:
/// the caller clears the stored code after a `Valid` result.
pub fn check(
    stored: Option<&str>,
    expires_at: Option<OffsetDateTime>,
    supplied: &str,
) -> OtpCheck {
    let (Some(code), Some(expires_at)) = (stored, expires_at) else {
        return OtpCheck::Mismatch;
    };
    if code.is_empty() || code != supplied {
        return OtpCheck::Mismatch;
    }
    if OffsetDateTime::now_utc() > expires_at {
        return OtpCheck::Expired;
    }
    OtpCheck::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_six_digits() {
        for _ in 0..100 {
            let code = generate();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }

    #[test]
    fn matching_unexpired_code_is_valid() {
        let expiry = expires_in(VERIFY_TTL);
        assert_eq!(check(Some("123456"), Some(expiry), "123456"), OtpCheck::Valid);
    }

    #[test]
    fn expired_code_is_rejected() {
        let expiry = OffsetDateTime::now_utc() - Duration::minutes(1);
        assert_eq!(check(Some("123456"), Some(expiry), "123456"), OtpCheck::Expired);
    }

    #[test]
    fn wrong_code_is_a_mismatch() {
        let expiry = expires_in(RESET_TTL);
        assert_eq!(check(Some("123456"), Some(expiry), "654321"), OtpCheck::Mismatch);
    }

    #[test]
    fn consumed_code_cannot_be_replayed() {
        // A successful check is followed by the repository nulling both
        // columns; re-supplying the same code must then be a mismatch.
        let expiry = expires_in(RESET_TTL);
        assert_eq!(check(Some("123456"), Some(expiry), "123456"), OtpCheck::Valid);
        assert_eq!(check(None, None, "123456"), OtpCheck::Mismatch);
    }

    #[test]
    fn missing_code_is_a_mismatch() {
        assert_eq!(check(None, None, "123456"), OtpCheck::Mismatch);
        assert_eq!(
            check(Some(""), Some(expires_in(VERIFY_TTL)), ""),
            OtpCheck::Mismatch
        );
    }
}
