use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::response::ApiResponse;

/// Unified error taxonomy. Every failure in the API funnels through this
/// type and is rendered as the standard response envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Duplicate field value entered: {0}")]
    Duplicate(String),
    #[error("Invalid email or password")]
    InvalidCredential,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,
    #[error("Account is already verified")]
    AlreadyVerified,
    #[error("Failed to send email")]
    MailDispatch(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Duplicate(_)
            | ApiError::InvalidOrExpiredOtp
            | ApiError::AlreadyVerified => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredential | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MailDispatch(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            // Unique-index violation; the constraint name identifies the field.
            if db.code().as_deref() == Some("23505") {
                let field = match db.constraint() {
                    Some("users_username_key") => "username",
                    Some("users_email_key") => "email",
                    Some(other) => other,
                    None => "unique field",
                };
                return ApiError::Duplicate(field.to_string());
            }
        }
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Record every error before the response leaves the handler.
        if status.is_server_error() {
            error!(error = ?self, %status, "request failed");
        } else {
            warn!(error = %self, %status, "request rejected");
        }
        let message = match &self {
            // Stack traces and error chains stay in the logs.
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        let body = ApiResponse::<serde_json::Value> {
            success: false,
            message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_maps_to_400_envelope() {
        let (status, json) = body_json(ApiError::Validation("Username is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Username is required");
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn duplicate_maps_to_400_with_field_name() {
        let (status, json) = body_json(ApiError::Duplicate("email".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Duplicate field value entered: email");
    }

    #[tokio::test]
    async fn credential_and_authorization_statuses() {
        let (status, _) = body_json(ApiError::InvalidCredential).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = body_json(ApiError::Forbidden("nope".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = body_json(ApiError::NotFound("User not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_hides_the_underlying_message() {
        let (status, json) = body_json(ApiError::Internal(anyhow::anyhow!("pool exhausted"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal server error");
    }
}
