use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::current_user::CurrentUser;
use crate::repositories::api_keys as api_keys_repo;
use crate::utils::validation::normalize_non_empty;

pub fn router() -> Router {
    Router::new().route("/", get(list_keys).post(save_key).delete(delete_key))
}

#[derive(Debug, Deserialize)]
struct SaveKeyRequest {
    provider: Option<String>,
    model_name: Option<String>,
    #[serde(alias = "apiKey")]
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteKeyRequest {
    provider: Option<String>,
    model_name: Option<String>,
}

fn normalize_provider(provider: Option<String>) -> Option<String> {
    let provider = normalize_non_empty(provider)?.to_lowercase();
    matches!(provider.as_str(), "google" | "openai").then_some(provider)
}

async fn list_keys(CurrentUser(user): CurrentUser) -> (StatusCode, Json<Value>) {
    match api_keys_repo::list_key_meta(&user.id).await {
        Ok(keys) => (StatusCode::OK, Json(json!({ "keys": keys }))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch keys", "detail": err })),
        ),
    }
}

async fn save_key(
    CurrentUser(user): CurrentUser,
    Json(req): Json<SaveKeyRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(provider), Some(model_name), Some(api_key)) = (
        normalize_provider(req.provider),
        normalize_non_empty(req.model_name),
        normalize_non_empty(req.api_key),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Provider, model and API key are required" })),
        );
    };

    match api_keys_repo::upsert_key(&user.id, &provider, &model_name, &api_key).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to save key", "detail": err })),
        ),
    }
}

async fn delete_key(
    CurrentUser(user): CurrentUser,
    Json(req): Json<DeleteKeyRequest>,
) -> (StatusCode, Json<Value>) {
    let (Some(provider), Some(model_name)) = (
        normalize_provider(req.provider),
        normalize_non_empty(req.model_name),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Provider and model are required" })),
        );
    };

    match api_keys_repo::delete_key(&user.id, &provider, &model_name).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to delete key", "detail": err })),
        ),
    }
}
