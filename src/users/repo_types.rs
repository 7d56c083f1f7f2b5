use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Permission tier gating administrative endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

/// One login event, appended to the user's session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub logged_in_at: OffsetDateTime,
    pub ip: String,
    pub user_agent: String,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    pub verify_otp: Option<String>,
    pub verify_otp_expires_at: Option<OffsetDateTime>,
    pub reset_otp: Option<String>,
    pub reset_otp_expires_at: Option<OffsetDateTime>,
    pub role: Role,
    pub avatar: Option<String>,
    pub bio: String,
    pub sessions: Json<Vec<SessionRecord>>,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
impl User {
    /// Bare record for unit tests that never touch the database.
    pub fn stub(role: Role, is_verified: bool) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: String::new(),
            is_verified,
            verify_otp: None,
            verify_otp_expires_at: None,
            reset_otp: None,
            reset_otp_expires_at: None,
            role,
            avatar: None,
            bio: String::new(),
            sessions: Json(Vec::new()),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let mut user = User::stub(Role::User, false);
        user.password_hash = "argon2-secret".into();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-secret"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"moderator\"").unwrap(),
            Role::Moderator
        );
    }
}
