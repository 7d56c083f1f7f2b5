use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;
use crate::users::dto::{LoginRequest, RegisterRequest, ResetPasswordRequest, VerifyOtpRequest};

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

pub fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.trim().chars().count();
    if len < 3 || len > 30 {
        return Err(invalid("Username must be 3-30 characters"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email.trim()) {
        return Err(invalid("Email is invalid"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 6 {
        return Err(invalid("Password must be at least 6 characters"));
    }
    Ok(())
}

pub fn validate_otp(otp: &str) -> Result<(), ApiError> {
    if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("OTP must be 6 digits"));
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), ApiError> {
    if bio.chars().count() > 200 {
        return Err(invalid("Bio must be at most 200 characters"));
    }
    Ok(())
}

/// All registration checks run before anything is persisted.
pub fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    if req.password != req.confirm_password {
        return Err(invalid("Passwords do not match"));
    }
    Ok(())
}

pub fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    validate_email(&req.email)?;
    if req.password.is_empty() {
        return Err(invalid("Password is required"));
    }
    Ok(())
}

pub fn validate_verify_otp(req: &VerifyOtpRequest) -> Result<(), ApiError> {
    validate_email(&req.email)?;
    validate_otp(&req.otp)
}

pub fn validate_reset_password(req: &ResetPasswordRequest) -> Result<(), ApiError> {
    validate_email(&req.email)?;
    validate_otp(&req.otp)?;
    validate_password(&req.new_password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn accepts_a_well_formed_registration() {
        assert!(validate_register(&register("alice", "alice@x.com", "secret1", "secret1")).is_ok());
    }

    #[test]
    fn rejects_short_or_long_usernames() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
        assert!(validate_username("abc").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "plain", "a@b", "a b@x.com", "@x.com"] {
            assert!(validate_email(email).is_err(), "{email:?} should be invalid");
        }
        assert!(validate_email("alice@x.com").is_ok());
    }

    #[test]
    fn rejects_mismatched_confirm_password() {
        let err =
            validate_register(&register("alice", "alice@x.com", "secret1", "secret2")).unwrap_err();
        assert!(err.to_string().contains("Passwords do not match"));
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn otp_must_be_six_digits() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("12345a").is_err());
        assert!(validate_otp("1234567").is_err());
    }

    #[test]
    fn bio_length_is_capped() {
        assert!(validate_bio(&"b".repeat(200)).is_ok());
        assert!(validate_bio(&"b".repeat(201)).is_err());
    }

    #[test]
    fn email_normalization_lowercases_and_trims() {
        assert_eq!(normalize_email("  Alice@X.Com "), "alice@x.com");
    }
}
