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
use crate::models::text_doc::TextDocument;
use crate::repositories::generations as generations_repo;
use crate::repositories::texts as texts_repo;
use crate::services::audit;
use crate::services::personas::{compose_prompt, resolve_persona};
use crate::services::providers::{self, GenerationRequest, Provider};
use crate::utils::validation::{normalize_non_empty, normalize_non_empty_str};

pub fn router() -> Router {
    Router::new().route("/", post(chat))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    topic: Option<String>,
    #[serde(alias = "textType")]
    text_type: Option<String>,
    instructions: Option<String>,
    agent: Option<String>,
}

/// Non-streaming generation on the configured default model. The result is
/// saved to `texts` and `generations`; both writes are best-effort and never
/// fail the response.
async fn chat(
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(topic), Some(text_type)) = (
        normalize_non_empty(req.topic),
        normalize_non_empty(req.text_type),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "topic and textType are required" })),
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
                "API /api/chat".to_string(),
            );
            return (err.http_status(), Json(json!({ "error": err.to_string() })));
        }
    };

    let persona = resolve_persona(req.agent.as_deref(), &user.id).await;
    let instructions = req.instructions.as_deref().and_then(normalize_non_empty_str);
    let prompt = compose_prompt(&topic, &text_type, instructions.as_deref());

    let gen_req = GenerationRequest {
        model: model.clone(),
        system_instruction: Some(persona.system_instruction),
        prompt,
        temperature: persona.temperature,
        top_k: persona.top_k,
        json_mode: false,
    };

    let generated_text = match providers::generate(provider, &gen_req, &api_key).await {
        Ok(text) => text,
        Err(err) => {
            audit::log_error_background(
                Some(user.id.clone()),
                err.to_string(),
                "API /api/chat".to_string(),
            );
            return (err.http_status(), Json(json!({ "error": err.to_string() })));
        }
    };

    let now = chrono::Utc::now().to_rfc3339();
    let doc = TextDocument {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        title: topic.clone(),
        content: generated_text.clone(),
        category: text_type.clone(),
        created_at: now.clone(),
    };
    if let Err(err) = texts_repo::create_text(&doc).await {
        warn!(error = %err, "failed to save text document");
    }

    let generation = Generation {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        topic,
        text_type,
        instructions,
        ai_model: model,
        generated_text: generated_text.clone(),
        agent_id: None,
        created_at: now,
    };
    if let Err(err) = generations_repo::create_generation(&generation).await {
        warn!(error = %err, "failed to save generation");
    }

    (StatusCode::OK, Json(json!({ "text": generated_text })))
}
