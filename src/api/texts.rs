use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::current_user::CurrentUser;
use crate::repositories::texts as texts_repo;
use crate::utils::validation::clamp_limit;

pub fn router() -> Router {
    Router::new().route("/", get(list_texts))
}

#[derive(Debug, Deserialize)]
struct TextsQuery {
    limit: Option<i64>,
}

async fn list_texts(
    CurrentUser(user): CurrentUser,
    Query(query): Query<TextsQuery>,
) -> (StatusCode, Json<Value>) {
    let limit = clamp_limit(query.limit, 20, 100);
    match texts_repo::list_texts(&user.id, limit).await {
        Ok(items) => (StatusCode::OK, Json(json!(items))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to fetch texts", "detail": err })),
        ),
    }
}
