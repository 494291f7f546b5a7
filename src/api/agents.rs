use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::current_user::CurrentUser;
use crate::models::agent::Agent;
use crate::repositories::agents as agents_repo;
use crate::utils::validation::normalize_non_empty;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_agents).post(create_agent))
        .route(
            "/{agent_id}",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
}

#[derive(Debug, Deserialize)]
struct AgentRequest {
    name: Option<String>,
    prompt: Option<String>,
    temperature: Option<f64>,
    top_k: Option<i64>,
}

async fn list_agents(CurrentUser(user): CurrentUser) -> (StatusCode, Json<Value>) {
    match agents_repo::list_agents(&user.id).await {
        Ok(agents) => (StatusCode::OK, Json(json!(agents))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to list agents", "detail": err })),
        ),
    }
}

async fn create_agent(
    CurrentUser(user): CurrentUser,
    Json(req): Json<AgentRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(name), Some(prompt)) = (
        normalize_non_empty(req.name),
        normalize_non_empty(req.prompt),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "name and prompt are required" })),
        );
    };

    let now = chrono::Utc::now().to_rfc3339();
    let agent = Agent {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        name,
        prompt,
        temperature: req.temperature,
        top_k: req.top_k,
        created_at: now.clone(),
        updated_at: now,
    };

    match agents_repo::create_agent(&agent).await {
        Ok(()) => (StatusCode::CREATED, Json(json!(agent))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to create agent", "detail": err })),
        ),
    }
}

async fn get_agent(
    CurrentUser(user): CurrentUser,
    Path(agent_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match agents_repo::get_agent_by_id(&agent_id, &user.id).await {
        Ok(Some(agent)) => (StatusCode::OK, Json(json!(agent))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Agent not found" })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch agent", "detail": err })),
        ),
    }
}

async fn update_agent(
    CurrentUser(user): CurrentUser,
    Path(agent_id): Path<String>,
    Json(req): Json<AgentRequest>,
) -> (StatusCode, Json<Value>) {
    let name = normalize_non_empty(req.name);
    let prompt = normalize_non_empty(req.prompt);

    match agents_repo::update_agent(
        &agent_id,
        &user.id,
        name,
        prompt,
        req.temperature,
        req.top_k,
    )
    .await
    {
        Ok(Some(agent)) => (StatusCode::OK, Json(json!(agent))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Agent not found" })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update agent", "detail": err })),
        ),
    }
}

async fn delete_agent(
    CurrentUser(user): CurrentUser,
    Path(agent_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match agents_repo::delete_agent(&agent_id, &user.id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete agent", "detail": err })),
        ),
    }
}
