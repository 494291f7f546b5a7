use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::auth::current_user::CurrentUser;
use crate::config::Config;
use crate::models::generation::Generation;
use crate::repositories::generations as generations_repo;
use crate::services::audit;
use crate::services::personas::{compose_translation_prompt, DEFAULT_TOP_K};
use crate::services::providers::{self, GenerationRequest, Provider};
use crate::utils::validation::normalize_non_empty;

pub fn router() -> Router {
    Router::new().route("/", post(translate))
}

#[derive(Debug, Deserialize)]
struct TranslateRequest {
    text: Option<String>,
    #[serde(alias = "targetLanguage")]
    target_language: Option<String>,
}

async fn translate(
    CurrentUser(user): CurrentUser,
    Json(req): Json<TranslateRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(text), Some(target_language)) = (
        normalize_non_empty(req.text),
        normalize_non_empty(req.target_language),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Text and target language are required" })),
        );
    };

    let cfg = Config::get();
    let model = cfg.default_model.clone();
    let Some(provider) = Provider::from_model_name(&model) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Unsupported default model: {model}") })),
        );
    };

    let api_key = match providers::resolve_api_key(&user.id, provider, &model).await {
        Ok(key) => key,
        Err(err) => {
            audit::log_error_background(
                Some(user.id.clone()),
                err.to_string(),
                "API /api/translate".to_string(),
            );
            return (err.http_status(), Json(json!({ "error": err.to_string() })));
        }
    };

    let gen_req = GenerationRequest {
        model: model.clone(),
        system_instruction: None,
        prompt: compose_translation_prompt(&text, &target_language),
        temperature: 0.3,
        top_k: DEFAULT_TOP_K,
        json_mode: false,
    };

    let translated_text = match providers::generate(provider, &gen_req, &api_key).await {
        Ok(text) => text,
        Err(err) => {
            audit::log_error_background(
                Some(user.id.clone()),
                err.to_string(),
                "API /api/translate".to_string(),
            );
            return (err.http_status(), Json(json!({ "error": err.to_string() })));
        }
    };

    let generation = Generation {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        topic: format!("Translation to {target_language}"),
        text_type: "translation".to_string(),
        instructions: Some(format!(
            "Source language auto-detected. Translated to: {target_language}"
        )),
        ai_model: model,
        generated_text: translated_text.clone(),
        agent_id: None,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let saved = match generations_repo::create_generation(&generation).await {
        Ok(()) => Some(generation),
        Err(err) => {
            warn!(error = %err, "failed to save translation");
            None
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "translated_text": translated_text, "saved": saved })),
    )
}
