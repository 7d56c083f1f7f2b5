//! Build-time configuration for the API endpoint with an optional runtime
//! override. The runtime config is read from `window.SNIPPETS_CONFIG` (if
//! present) so static deployments can change the endpoint without rebuilding.

/// Frontend configuration derived from build-time environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
}

impl AppConfig {
    /// Loads config from build-time environment variables and applies
    /// runtime overrides.
    pub fn load() -> Self {
        let api_base_url = option_env!("SNIPPETS_API_BASE_URL").unwrap_or("");

        let mut config = Self {
            api_base_url: api_base_url.to_string(),
        };

        if let Some(value) = runtime_api_base_url() {
            config.api_base_url = value;
        }

        config
    }
}

#[cfg(target_arch = "wasm32")]
fn runtime_api_base_url() -> Option<String> {
    use js_sys::{Object, Reflect};
    use wasm_bindgen::JsValue;

    let window = web_sys::window()?;
    let config = Reflect::get(&window, &JsValue::from_str("SNIPPETS_CONFIG")).ok()?;
    if config.is_null() || config.is_undefined() {
        return None;
    }
    let object = Object::from(config);
    let value = Reflect::get(&object, &JsValue::from_str("api_base_url")).ok()?;
    value.as_string().filter(|v| !v.trim().is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
fn runtime_api_base_url() -> Option<String> {
    None
}
