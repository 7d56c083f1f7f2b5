use serde::{Deserialize, Serialize};

use crate::features::auth::types::SessionUser;

/// One page of the admin listing.
#[derive(Clone, Debug, Deserialize)]
pub struct UserListPage {
    pub users: Vec<SessionUser>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
}

/// Filters for the admin listing; empty fields are left out of the query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub username: String,
    pub email: String,
    pub role: String,
    pub page: i64,
}

impl ListQuery {
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if !self.username.trim().is_empty() {
            parts.push(format!("username={}", encode(self.username.trim())));
        }
        if !self.email.trim().is_empty() {
            parts.push(format!("email={}", encode(self.email.trim())));
        }
        if !self.role.trim().is_empty() {
            parts.push(format!("role={}", encode(self.role.trim())));
        }
        if self.page > 1 {
            parts.push(format!("page={}", self.page));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

fn encode(value: &str) -> String {
    js_sys::encode_uri_component(value).into()
}

/// Privileged partial update of another account.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}
