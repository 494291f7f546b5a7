use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::current_user::CurrentUser;
use crate::models::generation::Generation;
use crate::repositories::generations as generations_repo;
use crate::utils::validation::{clamp_limit, normalize_non_empty};

pub fn router() -> Router {
    Router::new().route("/", get(list_history).post(save_history))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SaveHistoryRequest {
    topic: Option<String>,
    #[serde(alias = "textType")]
    text_type: Option<String>,
    content: Option<String>,
    instructions: Option<String>,
    #[serde(alias = "agentId")]
    agent_id: Option<String>,
    #[serde(alias = "aiModel")]
    ai_model: Option<String>,
}

async fn list_history(
    CurrentUser(user): CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> (StatusCode, Json<Value>) {
    let limit = clamp_limit(query.limit, 20, 100);
    match generations_repo::list_generations(&user.id, limit).await {
        Ok(items) => (StatusCode::OK, Json(json!(items))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch history", "detail": err })),
        ),
    }
}

/// Record a generation observed client-side (the writing UI saves finished
/// chat results through this endpoint).
async fn save_history(
    CurrentUser(user): CurrentUser,
    Json(req): Json<SaveHistoryRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(topic), Some(text_type), Some(content)) = (
        normalize_non_empty(req.topic),
        normalize_non_empty(req.text_type),
        normalize_non_empty(req.content),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "topic, textType and content are required" })),
        );
    };

    let generation = Generation {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        topic,
        text_type,
        instructions: normalize_non_empty(req.instructions),
        ai_model: normalize_non_empty(req.ai_model).unwrap_or_else(|| "unspecified".to_string()),
        generated_text: content,
        agent_id: normalize_non_empty(req.agent_id),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    match generations_repo::create_generation(&generation).await {
        Ok(()) => (StatusCode::CREATED, Json(json!(generation))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to save history", "detail": err })),
        ),
    }
}
