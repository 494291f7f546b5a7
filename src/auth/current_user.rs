use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use crate::auth::session::verify_session_token;
use crate::config::Config;
use crate::models::user::User;
use crate::repositories::users as users_repo;

/// Authenticated user extracted from the `Authorization: Bearer` header.
/// Missing or invalid token rejects with 401, a token whose user row no
/// longer exists with 404.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn unauthorized(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg })))
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Unauthorized"))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| unauthorized("Unauthorized"))?;

        let claims = verify_session_token(token, &Config::get().jwt_secret)
            .map_err(|_| unauthorized("Unauthorized"))?;

        let user = users_repo::get_user_by_id(&claims.sub)
            .await
            .map_err(|err| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to load user", "detail": err })),
                )
            })?
            .ok_or_else(|| {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "User not found" })),
                )
            })?;

        Ok(CurrentUser(user))
    }
}
