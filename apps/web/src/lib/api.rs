//! HTTP helpers for the Snippets API with consistent timeouts and error
//! handling. Every backend response, success or failure, is wrapped in the
//! `{ success, message, data }` envelope; these helpers unwrap it so feature
//! clients work with typed payloads and plain messages. Session auth rides in
//! an `HttpOnly` cookie, so every request includes credentials.

use super::{config::AppConfig, errors::AppError};
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::callback::Timeout;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::to_string;
use web_sys::{AbortController, FormData, RequestCredentials};

/// Default request timeout (milliseconds) applied to all HTTP helpers.
const DEFAULT_TIMEOUT_MS: u32 = 10_000;
/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// The response envelope used by every API endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// Unwrapped success envelope handed to feature clients.
#[derive(Clone, Debug)]
pub struct ApiSuccess<T> {
    pub message: String,
    pub data: Option<T>,
}

/// Fetches JSON with cookies for session-authenticated endpoints.
pub async fn get_json_with_credentials<T: DeserializeOwned>(
    path: &str,
) -> Result<ApiSuccess<T>, AppError> {
    let url = build_url(path);
    let response = send_with_timeout(|signal| {
        Request::get(&url)
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(signal))
            .build()
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
    })
    .await?;

    handle_envelope(response).await
}

/// Fetches JSON with cookies and returns `None` on 401, for session probes.
pub async fn get_optional_json_with_credentials<T: DeserializeOwned>(
    path: &str,
) -> Result<Option<T>, AppError> {
    let url = build_url(path);
    let response = send_with_timeout(|signal| {
        Request::get(&url)
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(signal))
            .build()
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
    })
    .await?;

    if response.status() == 401 {
        return Ok(None);
    }
    handle_envelope(response).await.map(|success| success.data)
}

/// Posts JSON with cookies and parses the response envelope.
pub async fn post_json_with_credentials<B: Serialize, T: DeserializeOwned>(
    path: &str,
    body: &B,
) -> Result<ApiSuccess<T>, AppError> {
    send_json_with_credentials(Request::post(&build_url(path)), body).await
}

/// Sends a JSON PATCH with cookies and parses the response envelope.
pub async fn patch_json_with_credentials<B: Serialize, T: DeserializeOwned>(
    path: &str,
    body: &B,
) -> Result<ApiSuccess<T>, AppError> {
    send_json_with_credentials(Request::patch(&build_url(path)), body).await
}

/// Posts an empty body with cookies, used to clear a session.
pub async fn post_empty_with_credentials<T: DeserializeOwned>(
    path: &str,
) -> Result<ApiSuccess<T>, AppError> {
    let url = build_url(path);
    let response = send_with_timeout(move |signal| {
        Request::post(&url)
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(signal))
            .body("")
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
    })
    .await?;

    handle_envelope(response).await
}

/// Sends multipart form data with cookies, used for profile updates with an
/// avatar upload. The browser sets the multipart boundary header itself.
pub async fn patch_form_with_credentials<T: DeserializeOwned>(
    path: &str,
    form: FormData,
) -> Result<ApiSuccess<T>, AppError> {
    let url = build_url(path);
    let response = send_with_timeout(move |signal| {
        Request::patch(&url)
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(signal))
            .body(form)
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
    })
    .await?;

    handle_envelope(response).await
}

/// Sends a DELETE with cookies and parses the response envelope.
pub async fn delete_with_credentials<T: DeserializeOwned>(
    path: &str,
) -> Result<ApiSuccess<T>, AppError> {
    let url = build_url(path);
    let response = send_with_timeout(|signal| {
        Request::delete(&url)
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(signal))
            .build()
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
    })
    .await?;

    handle_envelope(response).await
}

async fn send_json_with_credentials<B: Serialize, T: DeserializeOwned>(
    builder: RequestBuilder,
    body: &B,
) -> Result<ApiSuccess<T>, AppError> {
    let payload = to_string(body)
        .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;
    let response = send_with_timeout(move |signal| {
        builder
            .header("Content-Type", "application/json")
            .credentials(RequestCredentials::Include)
            .abort_signal(Some(signal))
            .body(payload)
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
    })
    .await?;

    handle_envelope(response).await
}

/// Builds a URL from the configured API base URL and the provided path.
fn build_url(path: &str) -> String {
    let config = AppConfig::load();
    let base = config.api_base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps network errors into user-facing `AppError` variants with timeout
/// detection.
fn map_request_error(err: gloo_net::Error) -> AppError {
    let message = err.to_string();
    let lowered = message.to_lowercase();

    if lowered.contains("timeout") || lowered.contains("abort") {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AppError::Network(format!("Unable to reach the server: {message}"))
    }
}

/// Sends a request with an abort timeout to avoid hanging UI state.
async fn send_with_timeout(
    build_request: impl FnOnce(&web_sys::AbortSignal) -> Result<Request, AppError>,
) -> Result<Response, AppError> {
    let controller = AbortController::new()
        .map_err(|_| AppError::Config("Failed to initialize request timeout.".to_string()))?;
    let signal = controller.signal();
    let timeout_controller = controller.clone();
    let _timeout = Timeout::new(DEFAULT_TIMEOUT_MS, move || timeout_controller.abort());

    let request = build_request(&signal)?;
    request.send().await.map_err(map_request_error)
}

/// Unwraps the response envelope; failures surface the server's message.
async fn handle_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiSuccess<T>, AppError> {
    let status = response.status();
    if response.ok() {
        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))?;
        Ok(ApiSuccess {
            message: envelope.message,
            data: envelope.data,
        })
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Http {
            status,
            message: envelope_message(&body),
        })
    }
}

/// Extracts the envelope message from an error body, falling back to the
/// sanitized raw body.
fn envelope_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        if !envelope.message.trim().is_empty() {
            return envelope.message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
