use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{Role, User};

/// Request body for registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Body for resend-otp and forgot-password.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Privileged partial update of any account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
}

/// Query string for the admin listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    20
}

/// Public part of the user returned to clients. Never carries the
/// password hash or pending codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub role: Role,
    pub avatar: Option<String>,
    pub bio: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_verified: user.is_verified,
            role: user.role,
            avatar: user.avatar,
            bio: user.bio,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// One page of the admin listing.
#[derive(Debug, Serialize)]
pub struct UserListPage {
    pub users: Vec<PublicUser>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_uses_camel_case_and_hides_secrets() {
        let mut user = User::stub(Role::User, false);
        user.password_hash = "argon2-secret".into();
        user.verify_otp = Some("123456".into());
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("\"isVerified\":false"));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("argon2-secret"));
        assert!(!json.contains("123456"));
    }

    #[test]
    fn list_query_defaults_apply() {
        let query: UserListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert!(query.role.is_none());
    }

    #[test]
    fn register_request_expects_camel_case_confirm() {
        let body = r#"{"username":"alice","email":"a@x.com","password":"secret1","confirmPassword":"secret1"}"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.confirm_password, "secret1");
    }
}
