//! Shared frontend utilities for API access, configuration, and errors.
//!
//! Every Snippets API response uses the `{ success, message, data }` envelope
//! and session auth rides in an `HttpOnly` cookie, so all helpers here attach
//! credentials and unwrap the envelope before feature clients see the data.
//! Centralizing these helpers keeps network behavior consistent and avoids
//! duplicated logic in routes and features.

pub(crate) mod api;
pub(crate) mod config;
pub(crate) mod errors;

pub(crate) use api::{
    delete_with_credentials, get_json_with_credentials, get_optional_json_with_credentials,
    patch_form_with_credentials, patch_json_with_credentials, post_empty_with_credentials,
    post_json_with_credentials, ApiSuccess,
};
pub(crate) use errors::AppError;
