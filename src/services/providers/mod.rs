use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod gemini;
pub mod openai;
pub mod stream;

use crate::config::Config;
use crate::repositories::api_keys as api_keys_repo;

pub type ChunkCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    OpenAi,
}

impl Provider {
    /// Model-name dispatch: `gemini`-family → Google, `gpt`-family → OpenAI.
    pub fn from_model_name(model: &str) -> Option<Provider> {
        let m = model.trim().to_lowercase();
        if m.contains("gemini") {
            Some(Provider::Google)
        } else if m.contains("gpt") {
            Some(Provider::OpenAi)
        } else {
            None
        }
    }

    /// Value stored in `user_api_keys.provider`.
    pub fn key_name(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAi => "openai",
        }
    }
}

pub fn is_pro_model(model: &str) -> bool {
    model.trim().to_lowercase().contains("pro")
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),
    #[error("{0}")]
    MissingApiKey(String),
    #[error("provider request failed: {0}")]
    Http(String),
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("generation aborted")]
    Cancelled,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProviderError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            ProviderError::UnsupportedModel(_) | ProviderError::MissingApiKey(_) => {
                StatusCode::BAD_REQUEST
            }
            ProviderError::Api { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub temperature: f64,
    pub top_k: i64,
    pub json_mode: bool,
}

/// Pick the API key for a request: the user's own key (exact model or `all`
/// wildcard) first; Gemini non-pro models may fall back to the shared server
/// key, Pro models and all OpenAI models are bring-your-own-key.
pub async fn resolve_api_key(
    user_id: &str,
    provider: Provider,
    model: &str,
) -> Result<String, ProviderError> {
    let user_key = api_keys_repo::find_key(user_id, provider.key_name(), model)
        .await
        .map_err(ProviderError::Internal)?;

    if let Some(key) = user_key {
        tracing::info!(provider = %key.provider, model_name = %key.model_name, "using user API key");
        return Ok(key.api_key);
    }

    match provider {
        Provider::Google => {
            if is_pro_model(model) {
                return Err(ProviderError::MissingApiKey(
                    "Gemini Pro models require a personal API key (BYOK). Add one in Settings."
                        .to_string(),
                ));
            }
            Config::get()
                .gemini_api_key
                .clone()
                .ok_or_else(|| {
                    ProviderError::MissingApiKey("Gemini API key is not configured.".to_string())
                })
        }
        Provider::OpenAi => Err(ProviderError::MissingApiKey(
            "OpenAI API key is not configured for this model. Add one in Settings.".to_string(),
        )),
    }
}

pub async fn generate(
    provider: Provider,
    req: &GenerationRequest,
    api_key: &str,
) -> Result<String, ProviderError> {
    match provider {
        Provider::Google => gemini::generate(req, api_key).await,
        Provider::OpenAi => openai::generate(req, api_key).await,
    }
}

pub async fn generate_stream(
    provider: Provider,
    req: &GenerationRequest,
    api_key: &str,
    on_chunk: ChunkCallback,
    cancel: CancellationToken,
) -> Result<String, ProviderError> {
    match provider {
        Provider::Google => gemini::generate_stream(req, api_key, on_chunk, cancel).await,
        Provider::OpenAi => openai::generate_stream(req, api_key, on_chunk, cancel).await,
    }
}

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(Config::get().request_timeout_secs))
        .build()
        .expect("build http client")
});

pub(super) fn http_client() -> &'static reqwest::Client {
    &HTTP_CLIENT
}

pub(super) fn truncate_log(raw: &str, max: usize) -> String {
    if raw.len() <= max {
        return raw.to_string();
    }
    let mut end = max;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &raw[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_models_by_name() {
        assert_eq!(
            Provider::from_model_name("gemini-3-flash-preview"),
            Some(Provider::Google)
        );
        assert_eq!(
            Provider::from_model_name("Gemini-2.5-Pro"),
            Some(Provider::Google)
        );
        assert_eq!(Provider::from_model_name("gpt-4o"), Some(Provider::OpenAi));
        assert_eq!(Provider::from_model_name("claude-3"), None);
        assert_eq!(Provider::from_model_name(""), None);
    }

    #[test]
    fn detects_pro_models() {
        assert!(is_pro_model("gemini-2.5-pro"));
        assert!(is_pro_model("GEMINI-PRO"));
        assert!(!is_pro_model("gemini-3-flash-preview"));
    }

    #[test]
    fn key_names_match_stored_provider_values() {
        assert_eq!(Provider::Google.key_name(), "google");
        assert_eq!(Provider::OpenAi.key_name(), "openai");
    }

    #[test]
    fn maps_errors_to_http_status() {
        assert_eq!(
            ProviderError::MissingApiKey("x".into()).http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProviderError::UnsupportedModel("x".into()).http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProviderError::Api {
                status: 429,
                message: "quota".into()
            }
            .http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProviderError::Http("boom".into()).http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_log("short", 100), "short");
        let truncated = truncate_log("áéíóú", 3);
        assert!(truncated.ends_with("..."));
    }
}
