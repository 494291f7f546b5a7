use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::current_user::CurrentUser;
use crate::config::Config;
use crate::services::audit;
use crate::services::personas::{compose_plagiarism_prompt, DEFAULT_TEMPERATURE, DEFAULT_TOP_K};
use crate::services::providers::{self, GenerationRequest, Provider};
use crate::utils::validation::normalize_non_empty;

pub fn router() -> Router {
    Router::new().route("/", post(check_plagiarism))
}

#[derive(Debug, Deserialize)]
struct PlagiarismRequest {
    text: Option<String>,
}

/// Originality report via the default model in JSON mode. The model is asked
/// for `{originalityScore, plagiarismRisk, analysis}` and the parsed object
/// is returned as-is.
async fn check_plagiarism(
    CurrentUser(user): CurrentUser,
    Json(req): Json<PlagiarismRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(text) = normalize_non_empty(req.text) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Text is required" })),
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
                "API /api/plagiarism".to_string(),
            );
            return (err.http_status(), Json(json!({ "error": err.to_string() })));
        }
    };

    let gen_req = GenerationRequest {
        model,
        system_instruction: None,
        prompt: compose_plagiarism_prompt(&text),
        temperature: DEFAULT_TEMPERATURE,
        top_k: DEFAULT_TOP_K,
        json_mode: true,
    };

    let raw = match providers::generate(provider, &gen_req, &api_key).await {
        Ok(text) => text,
        Err(err) => {
            audit::log_error_background(
                Some(user.id.clone()),
                err.to_string(),
                "API /api/plagiarism".to_string(),
            );
            return (err.http_status(), Json(json!({ "error": err.to_string() })));
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(report) => (StatusCode::OK, Json(report)),
        Err(err) => {
            audit::log_error_background(
                Some(user.id.clone()),
                format!("invalid originality report: {err}"),
                "API /api/plagiarism".to_string(),
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to check plagiarism" })),
            )
        }
    }
}
