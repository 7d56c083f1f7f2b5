//! Client wrappers for the account lifecycle endpoints. These helpers keep
//! endpoint paths centralized and session-aware requests consistent.

use crate::{
    app_lib::{
        get_optional_json_with_credentials, post_empty_with_credentials,
        post_json_with_credentials, ApiSuccess, AppError,
    },
    features::auth::types::{
        EmailRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, SessionUser,
        VerifyOtpRequest,
    },
};

/// Registers a new account; the server sets the session cookie on success.
pub async fn register(request: &RegisterRequest) -> Result<ApiSuccess<SessionUser>, AppError> {
    post_json_with_credentials("/api/users", request).await
}

/// Logs in; the server sets the session cookie on success.
pub async fn login(request: &LoginRequest) -> Result<ApiSuccess<SessionUser>, AppError> {
    post_json_with_credentials("/api/users/login", request).await
}

/// Clears the session cookie.
pub async fn logout() -> Result<ApiSuccess<serde_json::Value>, AppError> {
    post_empty_with_credentials("/api/users/logout").await
}

/// Confirms the email verification code.
pub async fn verify_otp(
    request: &VerifyOtpRequest,
) -> Result<ApiSuccess<serde_json::Value>, AppError> {
    post_json_with_credentials("/api/users/verify-otp", request).await
}

/// Requests a fresh verification code by email.
pub async fn resend_otp(request: &EmailRequest) -> Result<ApiSuccess<serde_json::Value>, AppError> {
    post_json_with_credentials("/api/users/resend-otp", request).await
}

/// Starts the password reset flow; a code is emailed to the account.
pub async fn forgot_password(
    request: &EmailRequest,
) -> Result<ApiSuccess<serde_json::Value>, AppError> {
    post_json_with_credentials("/api/users/forgot-password", request).await
}

/// Completes the password reset with the emailed code.
pub async fn reset_password(
    request: &ResetPasswordRequest,
) -> Result<ApiSuccess<serde_json::Value>, AppError> {
    post_json_with_credentials("/api/users/reset-password", request).await
}

/// Fetches the current session using cookie-based auth.
/// Returns `None` when the session is missing or expired.
pub async fn fetch_session() -> Result<Option<SessionUser>, AppError> {
    get_optional_json_with_credentials("/api/users/me").await
}
