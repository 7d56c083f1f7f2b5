use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::CurrentUser,
        jwt::JwtKeys,
        otp::{self, OtpCheck},
        password,
        policy::{self, Action},
    },
    error::ApiError,
    response::{self, ApiResponse},
    state::AppState,
    storage::AvatarStore,
    users::{
        dto::{
            AdminUpdateRequest, EmailRequest, LoginRequest, PublicUser, RegisterRequest,
            ResetPasswordRequest, UserListPage, UserListQuery, VerifyOtpRequest,
        },
        repo::ListFilter,
        repo_types::{SessionRecord, User},
        validate,
    },
};

const MAX_AVATAR_UPLOAD: usize = 5 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(register).get(list_users))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/verify-otp", post(verify_otp))
        .route("/users/resend-otp", post(resend_otp))
        .route("/users/forgot-password", post(forgot_password))
        .route("/users/reset-password", post(reset_password))
        .route(
            "/users/me",
            get(get_me)
                .patch(update_me)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_UPLOAD)),
        )
        .route(
            "/users/:id",
            get(get_user_by_id)
                .patch(update_user_by_id)
                .delete(delete_user),
        )
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".into())
}

fn client_agent(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".into())
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(CookieJar, (StatusCode, Json<ApiResponse<PublicUser>>)), ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_register(&payload)?;

    let hash = password::hash_password(&payload.password)?;
    let code = otp::generate();
    let expires_at = otp::expires_in(otp::VERIFY_TTL);

    let user = User::create(
        &state.db,
        &payload.username,
        &payload.email,
        &hash,
        &code,
        expires_at,
    )
    .await?;

    // Registration stands even if the welcome mail fails; the code can be
    // re-sent later.
    if let Err(e) = state
        .mailer
        .send(
            &user.email,
            "Welcome to Snippets - verify your email",
            "welcome",
            &[
                ("username".into(), user.username.clone()),
                ("otp".into(), code),
            ],
        )
        .await
    {
        warn!(error = %e, user_id = %user.id, "welcome email failed");
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    info!(actor = %user.id, action = "register", email = %user.email, "user registered");

    Ok((
        jar.add(keys.session_cookie(token)),
        (
            StatusCode::CREATED,
            response::ok("User registered successfully", PublicUser::from(user)),
        ),
    ))
}

#[instrument(skip(state, jar, headers, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<PublicUser>>), ApiError> {
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_login(&payload)?;

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(user) => user,
        None => {
            // Same cost as the wrong-password branch; the response never
            // reveals which check failed.
            password::verify_against_dummy(&payload.password);
            return Err(ApiError::InvalidCredential);
        }
    };

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredential);
    }

    let session = SessionRecord {
        logged_in_at: OffsetDateTime::now_utc(),
        ip: client_ip(&headers),
        user_agent: client_agent(&headers),
    };
    User::record_login(&state.db, user.id, &session).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    info!(actor = %user.id, action = "login", ip = %session.ip, "user logged in");

    Ok((
        jar.add(keys.session_cookie(token)),
        response::ok("User logged in successfully", PublicUser::from(user)),
    ))
}

#[instrument(skip(state, jar, current))]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<serde_json::Value>>) {
    let keys = JwtKeys::from_ref(&state);
    info!(actor = %current.0.id, action = "logout", "user logged out");
    (
        jar.add(keys.clear_session_cookie()),
        response::ok_message("User logged out successfully"),
    )
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(mut payload): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_verify_otp(&payload)?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    if user.is_verified {
        return Err(ApiError::AlreadyVerified);
    }

    match otp::check(
        user.verify_otp.as_deref(),
        user.verify_otp_expires_at,
        &payload.otp,
    ) {
        OtpCheck::Valid => {
            User::mark_verified(&state.db, user.id).await?;
            info!(actor = %user.id, action = "verify_otp", "email verified");
            Ok(response::ok_message("Email verified successfully"))
        }
        OtpCheck::Expired | OtpCheck::Mismatch => Err(ApiError::InvalidOrExpiredOtp),
    }
}

#[instrument(skip(state, payload))]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(mut payload): Json<EmailRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_email(&payload.email)?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    if user.is_verified {
        return Err(ApiError::AlreadyVerified);
    }

    let code = otp::generate();
    User::set_verify_otp(&state.db, user.id, &code, otp::expires_in(otp::VERIFY_TTL)).await?;

    // The email is the only channel for the code, so a dispatch failure
    // fails the request.
    state
        .mailer
        .send(
            &user.email,
            "Your Snippets verification code",
            "verify",
            &[
                ("username".into(), user.username.clone()),
                ("otp".into(), code),
            ],
        )
        .await
        .map_err(ApiError::MailDispatch)?;

    info!(actor = %user.id, action = "resend_otp", "verification code re-sent");
    Ok(response::ok_message("Verification code sent"))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<EmailRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_email(&payload.email)?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let code = otp::generate();
    User::set_reset_otp(&state.db, user.id, &code, otp::expires_in(otp::RESET_TTL)).await?;

    state
        .mailer
        .send(
            &user.email,
            "Your Snippets password reset code",
            "reset",
            &[
                ("username".into(), user.username.clone()),
                ("otp".into(), code),
            ],
        )
        .await
        .map_err(ApiError::MailDispatch)?;

    info!(actor = %user.id, action = "forgot_password", "reset code sent");
    Ok(response::ok_message("Password reset code sent"))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    payload.email = validate::normalize_email(&payload.email);
    validate::validate_reset_password(&payload)?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    match otp::check(
        user.reset_otp.as_deref(),
        user.reset_otp_expires_at,
        &payload.otp,
    ) {
        OtpCheck::Valid => {
            let hash = password::hash_password(&payload.new_password)?;
            User::apply_password_reset(&state.db, user.id, &hash).await?;
            info!(actor = %user.id, action = "reset_password", "password reset");
            Ok(response::ok_message("Password reset successfully"))
        }
        OtpCheck::Expired | OtpCheck::Mismatch => Err(ApiError::InvalidOrExpiredOtp),
    }
}

#[instrument(skip_all)]
pub async fn get_me(
    CurrentUser(user): CurrentUser,
) -> Json<ApiResponse<PublicUser>> {
    response::ok("Fetched current user profile", PublicUser::from(user))
}

#[instrument(skip(state, user, multipart))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let mut username: Option<String> = None;
    let mut bio: Option<String> = None;
    let mut current_password: Option<String> = None;
    let mut new_password: Option<String> = None;
    let mut upload: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "username" => {
                username = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                )
            }
            "bio" => {
                bio = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                )
            }
            "currentPassword" => {
                current_password = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                )
            }
            "newPassword" => {
                new_password = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(e.to_string()))?,
                )
            }
            "avatar" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                if !data.is_empty() {
                    upload = Some((content_type, data));
                }
            }
            _ => {}
        }
    }

    if let Some(value) = &username {
        validate::validate_username(value)?;
    }
    if let Some(value) = &bio {
        validate::validate_bio(value)?;
    }

    // Changing the password requires proving the current one.
    let mut password_hash: Option<String> = None;
    if let Some(new_pw) = &new_password {
        validate::validate_password(new_pw)?;
        let current = current_password.as_deref().ok_or(ApiError::InvalidCredential)?;
        if !password::verify_password(current, &user.password_hash)? {
            return Err(ApiError::InvalidCredential);
        }
        password_hash = Some(password::hash_password(new_pw)?);
    }

    let changed_password = password_hash.is_some();
    let changed_avatar = upload.is_some();
    let db = state.db.clone();
    let user_id = user.id;
    let updated = persist_with_avatar_swap(
        state.avatars.as_ref(),
        user.avatar.as_deref(),
        upload,
        move |avatar_path| async move {
            User::update_profile(
                &db,
                user_id,
                username.as_deref(),
                bio.as_deref(),
                avatar_path.as_deref(),
                password_hash.as_deref(),
            )
            .await
            .map_err(ApiError::from)
        },
    )
    .await?;

    info!(
        actor = %user.id,
        action = "update_profile",
        changed_password,
        changed_avatar,
        "profile updated"
    );
    Ok(response::ok(
        "Updated current user profile",
        PublicUser::from(updated),
    ))
}

/// Writes the new avatar, persists the row, and only then removes the old
/// file. A failed row update leaves the old file in place and removes the
/// fresh upload so the store never disagrees with the database.
async fn persist_with_avatar_swap<F, Fut>(
    avatars: &dyn AvatarStore,
    old_avatar: Option<&str>,
    upload: Option<(String, bytes::Bytes)>,
    persist: F,
) -> Result<User, ApiError>
where
    F: FnOnce(Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<User, ApiError>>,
{
    let avatar_path = match upload {
        Some((content_type, data)) => Some(avatars.put(&content_type, data).await?),
        None => None,
    };

    match persist(avatar_path.clone()).await {
        Ok(user) => {
            if avatar_path.is_some() {
                if let Some(old) = old_avatar {
                    if let Err(e) = avatars.delete(old).await {
                        warn!(error = %e, path = old, "stale avatar cleanup failed");
                    }
                }
            }
            Ok(user)
        }
        Err(err) => {
            if let Some(path) = avatar_path {
                if let Err(e) = avatars.delete(&path).await {
                    warn!(error = %e, path = %path, "orphaned upload cleanup failed");
                }
            }
            Err(err)
        }
    }
}

#[instrument(skip(state, actor, query))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<UserListPage>>, ApiError> {
    policy::authorize(&actor, Action::ListUsers)?;

    let limit = query.limit.clamp(1, 100);
    let page = query.page.max(1);
    let filter = ListFilter {
        username: query.username,
        email: query.email,
        role: query.role,
        is_verified: query.is_verified,
        limit,
        offset: (page - 1) * limit,
    };
    let (users, total) = User::list(&state.db, &filter).await?;
    let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

    Ok(response::ok(
        "Fetched all users",
        UserListPage {
            users: users.into_iter().map(PublicUser::from).collect(),
            total,
            page,
            pages,
            limit,
        },
    ))
}

#[instrument(skip(state, actor))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    policy::authorize(&actor, Action::GetUser)?;
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(response::ok(
        format!("Fetched user with id {id}"),
        PublicUser::from(user),
    ))
}

#[instrument(skip(state, actor, payload))]
pub async fn update_user_by_id(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateRequest>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    policy::authorize(&actor, Action::UpdateUser)?;

    if let Some(username) = &payload.username {
        validate::validate_username(username)?;
    }
    if let Some(email) = &payload.email {
        validate::validate_email(email)?;
    }

    let updated = User::admin_update(
        &state.db,
        id,
        payload.username.as_deref(),
        payload.email.as_deref(),
        payload.role,
        payload.is_verified,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(
        actor = %actor.id,
        action = "admin_update_user",
        target = %id,
        role = ?payload.role,
        is_verified = ?payload.is_verified,
        "user updated by staff"
    );
    Ok(response::ok(
        format!("Updated user with id {id}"),
        PublicUser::from(updated),
    ))
}

#[instrument(skip(state, actor))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    policy::authorize_delete(&actor, &target)?;

    User::delete(&state.db, id).await?;
    if let Some(avatar) = &target.avatar {
        if let Err(e) = state.avatars.delete(avatar).await {
            warn!(error = %e, target = %id, "avatar cleanup failed");
        }
    }

    info!(
        actor = %actor.id,
        action = "delete_user",
        target = %id,
        target_role = target.role.as_str(),
        "user deleted"
    );
    Ok(response::ok_message(format!("Deleted user with id {id}")))
}

#[cfg(test)]
mod router_tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::state::AppState;

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = build_app(AppState::fake());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords_before_any_persistence() {
        let (status, json) = send(post_json(
            "/api/users",
            r#"{"username":"alice","email":"alice@x.com","password":"secret1","confirmPassword":"secret2"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Passwords do not match");
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() {
        let (status, json) = send(post_json(
            "/api/users",
            r#"{"username":"alice","email":"not-an-email","password":"secret1","confirmPassword":"secret1"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Email is invalid");
    }

    #[tokio::test]
    async fn login_rejects_empty_password() {
        let (status, json) = send(post_json(
            "/api/users/login",
            r#"{"email":"alice@x.com","password":""}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Password is required");
    }

    #[tokio::test]
    async fn me_requires_a_session_cookie() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/users/me")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Not authorized, no token");
    }

    #[tokio::test]
    async fn me_rejects_a_garbage_token() {
        let request = Request::builder()
            .method("GET")
            .uri("/api/users/me")
            .header(header::COOKIE, "jwt=not-a-real-token")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Not authorized, token failed");
    }

    #[tokio::test]
    async fn verify_otp_rejects_malformed_codes() {
        let (status, json) = send(post_json(
            "/api/users/verify-otp",
            r#"{"email":"alice@x.com","otp":"12ab"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "OTP must be 6 digits");
    }

    #[tokio::test]
    async fn logout_requires_authentication() {
        let (status, _) = send(post_json("/api/users/logout", "{}")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[cfg(test)]
mod avatar_swap_tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::persist_with_avatar_swap;
    use crate::error::ApiError;
    use crate::storage::AvatarStore;
    use crate::users::repo_types::{Role, User};

    #[derive(Default)]
    struct RecordingStore {
        ops: Mutex<Vec<String>>,
    }

    impl RecordingStore {
        fn ops(&self) -> Vec<String> {
            self.ops.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AvatarStore for RecordingStore {
        async fn put(&self, _content_type: &str, _body: Bytes) -> anyhow::Result<String> {
            self.ops.lock().unwrap().push("put /uploads/new.png".into());
            Ok("/uploads/new.png".into())
        }

        async fn delete(&self, path: &str) -> anyhow::Result<()> {
            self.ops.lock().unwrap().push(format!("delete {path}"));
            Ok(())
        }
    }

    fn upload() -> Option<(String, Bytes)> {
        Some(("image/png".into(), Bytes::from_static(b"png-bytes")))
    }

    #[tokio::test]
    async fn failed_row_update_keeps_the_old_file_and_removes_the_upload() {
        let store = RecordingStore::default();

        let result = persist_with_avatar_swap(
            &store,
            Some("/uploads/old.png"),
            upload(),
            |_| async { Err::<User, _>(ApiError::Duplicate("username".into())) },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(
            store.ops(),
            vec![
                "put /uploads/new.png".to_string(),
                "delete /uploads/new.png".to_string(),
            ],
        );
    }

    #[tokio::test]
    async fn old_file_goes_away_only_after_the_row_points_at_the_new_one() {
        let store = RecordingStore::default();

        let result = persist_with_avatar_swap(
            &store,
            Some("/uploads/old.png"),
            upload(),
            |path| async move {
                assert_eq!(path.as_deref(), Some("/uploads/new.png"));
                let mut user = User::stub(Role::User, true);
                user.avatar = path;
                Ok(user)
            },
        )
        .await;

        assert_eq!(result.unwrap().avatar.as_deref(), Some("/uploads/new.png"));
        assert_eq!(
            store.ops(),
            vec![
                "put /uploads/new.png".to_string(),
                "delete /uploads/old.png".to_string(),
            ],
        );
    }

    #[tokio::test]
    async fn text_only_updates_touch_no_files() {
        let store = RecordingStore::default();

        let result = persist_with_avatar_swap(&store, Some("/uploads/old.png"), None, |path| async move {
            assert!(path.is_none());
            Ok(User::stub(Role::User, true))
        })
        .await;

        assert!(result.is_ok());
        assert!(store.ops().is_empty());
    }
}
