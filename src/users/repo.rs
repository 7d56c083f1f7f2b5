use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{Role, SessionRecord, User};

const COLUMNS: &str = "id, username, email, password_hash, is_verified, \
     verify_otp, verify_otp_expires_at, reset_otp, reset_otp_expires_at, \
     role, avatar, bio, sessions, last_login_at, created_at, updated_at";

/// Filters and pagination for the admin listing.
#[derive(Debug, Default)]
pub struct ListFilter {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, f: &ListFilter) {
    qb.push(" WHERE true");
    if let Some(username) = &f.username {
        qb.push(" AND username ILIKE ");
        qb.push_bind(format!("%{username}%"));
    }
    if let Some(email) = &f.email {
        qb.push(" AND email ILIKE ");
        qb.push_bind(format!("%{email}%"));
    }
    if let Some(role) = f.role {
        qb.push(" AND role = ");
        qb.push_bind(role);
    }
    if let Some(is_verified) = f.is_verified {
        qb.push(" AND is_verified = ");
        qb.push_bind(is_verified);
    }
}

impl User {
    /// Insert a new account with its pending verification code. A unique
    /// violation on username or email surfaces as a database error with
    /// SQLSTATE 23505.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        verify_otp: &str,
        verify_otp_expires_at: OffsetDateTime,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, verify_otp, verify_otp_expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(verify_otp)
        .bind(verify_otp_expires_at)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = lower($1)"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Filtered, paginated listing plus the total match count.
    pub async fn list(db: &PgPool, filter: &ListFilter) -> sqlx::Result<(Vec<User>, i64)> {
        let mut count_qb = QueryBuilder::new("SELECT count(*) FROM users");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(db).await?;

        let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM users"));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset);
        let users = qb.build_query_as::<User>().fetch_all(db).await?;

        Ok((users, total))
    }

    pub async fn list_by_roles(db: &PgPool, roles: &[Role]) -> sqlx::Result<Vec<User>> {
        if roles.is_empty() {
            return sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users"))
                .fetch_all(db)
                .await;
        }
        let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM users WHERE role IN ("));
        let mut separated = qb.separated(", ");
        for role in roles {
            separated.push_bind(*role);
        }
        qb.push(")");
        qb.build_query_as::<User>().fetch_all(db).await
    }

    /// Append a session record and stamp the login time.
    pub async fn record_login(
        db: &PgPool,
        id: Uuid,
        session: &SessionRecord,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET sessions = sessions || $2, last_login_at = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(session))
        .bind(session.logged_in_at)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn set_verify_otp(
        db: &PgPool,
        id: Uuid,
        code: &str,
        expires_at: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET verify_otp = $2, verify_otp_expires_at = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Flip to verified and clear the code; single use.
    pub async fn mark_verified(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_verified = TRUE, verify_otp = NULL, verify_otp_expires_at = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn set_reset_otp(
        db: &PgPool,
        id: Uuid,
        code: &str,
        expires_at: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET reset_otp = $2, reset_otp_expires_at = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Replace the password hash and consume the reset code in one
    /// statement, so a used code can never be replayed.
    pub async fn apply_password_reset(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, reset_otp = NULL, reset_otp_expires_at = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Self-service profile update; only supplied fields change.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        username: Option<&str>,
        bio: Option<&str>,
        avatar: Option<&str>,
        password_hash: Option<&str>,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                bio = COALESCE($3, bio),
                avatar = COALESCE($4, avatar),
                password_hash = COALESCE($5, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(username)
        .bind(bio)
        .bind(avatar)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Privileged update of another account; only supplied fields change.
    pub async fn admin_update(
        db: &PgPool,
        id: Uuid,
        username: Option<&str>,
        email: Option<&str>,
        role: Option<Role>,
        is_verified: Option<bool>,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE(lower($3), email),
                role = COALESCE($4, role),
                is_verified = COALESCE($5, is_verified),
                updated_at = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(role)
        .bind(is_verified)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// Live-database checks for the single-use code guarantees. Run with
// `cargo test -- --ignored` against a migrated database.
#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::auth::otp::{self, OtpCheck};

    async fn connect() -> Option<PgPool> {
        let url = std::env::var("DATABASE_URL").ok()?;
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .ok()
    }

    async fn seed_user(db: &PgPool) -> User {
        let tag = Uuid::new_v4().simple().to_string();
        User::create(
            db,
            &format!("u{}", &tag[..10]),
            &format!("{}@example.com", &tag[..10]),
            "argon2id-placeholder",
            &otp::generate(),
            otp::expires_in(otp::VERIFY_TTL),
        )
        .await
        .expect("seed user")
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated database"]
    async fn password_reset_nulls_both_otp_columns() {
        let Some(db) = connect().await else { return };
        let user = seed_user(&db).await;

        User::set_reset_otp(&db, user.id, "123456", otp::expires_in(otp::RESET_TTL))
            .await
            .expect("set reset code");
        User::apply_password_reset(&db, user.id, "new-hash")
            .await
            .expect("apply reset");

        let reloaded = User::find_by_id(&db, user.id)
            .await
            .expect("reload")
            .expect("still present");
        assert_eq!(reloaded.password_hash, "new-hash");
        assert!(reloaded.reset_otp.is_none());
        assert!(reloaded.reset_otp_expires_at.is_none());
        assert_eq!(
            otp::check(
                reloaded.reset_otp.as_deref(),
                reloaded.reset_otp_expires_at,
                "123456",
            ),
            OtpCheck::Mismatch,
        );

        User::delete(&db, user.id).await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL pointing at a migrated database"]
    async fn verification_nulls_the_code_and_flips_the_flag() {
        let Some(db) = connect().await else { return };
        let user = seed_user(&db).await;
        let code = user.verify_otp.clone().expect("fresh accounts carry a code");

        User::mark_verified(&db, user.id).await.expect("mark verified");

        let reloaded = User::find_by_id(&db, user.id)
            .await
            .expect("reload")
            .expect("still present");
        assert!(reloaded.is_verified);
        assert!(reloaded.verify_otp.is_none());
        assert!(reloaded.verify_otp_expires_at.is_none());
        assert_eq!(
            otp::check(
                reloaded.verify_otp.as_deref(),
                reloaded.verify_otp_expires_at,
                &code,
            ),
            OtpCheck::Mismatch,
        );

        User::delete(&db, user.id).await.expect("cleanup");
    }
}
