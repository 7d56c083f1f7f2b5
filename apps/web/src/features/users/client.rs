//! Client helpers for profile and user management endpoints. These functions
//! keep endpoint paths centralized and assume the backend enforces
//! authorization.

use web_sys::FormData;

use crate::{
    app_lib::{
        delete_with_credentials, get_json_with_credentials, patch_form_with_credentials,
        patch_json_with_credentials, ApiSuccess, AppError,
    },
    features::{
        auth::types::SessionUser,
        users::types::{AdminUpdateRequest, ListQuery, UserListPage},
    },
};

/// Fetches one page of the user listing with the given filters.
pub async fn list_users(query: &ListQuery) -> Result<ApiSuccess<UserListPage>, AppError> {
    get_json_with_credentials(&format!("/api/users{}", query.to_query_string())).await
}

/// Fetches user details by id after basic input validation.
pub async fn get_user(id: &str) -> Result<ApiSuccess<SessionUser>, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Config("User id is required.".to_string()));
    }
    get_json_with_credentials(&format!("/api/users/{trimmed}")).await
}

/// Applies a privileged update to another account.
pub async fn update_user(
    id: &str,
    request: &AdminUpdateRequest,
) -> Result<ApiSuccess<SessionUser>, AppError> {
    patch_json_with_credentials(&format!("/api/users/{}", id.trim()), request).await
}

/// Deletes an account.
pub async fn delete_user(id: &str) -> Result<ApiSuccess<serde_json::Value>, AppError> {
    delete_with_credentials(&format!("/api/users/{}", id.trim())).await
}

/// Updates the caller's own profile. Multipart so an avatar file can ride
/// along with the text fields.
pub async fn update_profile(form: FormData) -> Result<ApiSuccess<SessionUser>, AppError> {
    patch_form_with_credentials("/api/users/me", form).await
}
