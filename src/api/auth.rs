use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::current_user::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::create_session_token;
use crate::config::Config;
use crate::repositories::users as users_repo;
use crate::utils::validation::{normalize_email, normalize_non_empty};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/preferences", put(update_preferences))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

async fn register(Json(req): Json<RegisterRequest>) -> (StatusCode, Json<Value>) {
    let Some(email) = req.email.as_deref().and_then(normalize_email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "A valid email is required" })),
        );
    };
    let Some(password) = req.password.filter(|p| p.len() >= 8) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Password must be at least 8 characters" })),
        );
    };
    // Fall back to the mailbox name, like the original signup flow did.
    let name = normalize_non_empty(req.name)
        .unwrap_or_else(|| email.split('@').next().unwrap_or("user").to_string());

    match users_repo::email_exists(&email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Email is already registered" })),
            )
        }
        Ok(false) => {}
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Registration failed", "detail": err })),
            )
        }
    }

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Registration failed", "detail": err })),
            )
        }
    };

    let id = Uuid::new_v4().to_string();
    let user = match users_repo::create_user(&id, &name, &email, &password_hash).await {
        Ok(user) => user,
        // Two concurrent registrations can pass the existence check; the
        // UNIQUE constraint settles it.
        Err(err) if err.contains("UNIQUE") => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Email is already registered" })),
            )
        }
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Registration failed", "detail": err })),
            )
        }
    };

    let cfg = Config::get();
    match create_session_token(&user, &cfg.jwt_secret, cfg.token_ttl_hours) {
        Ok(token) => (
            StatusCode::CREATED,
            Json(json!({ "token": token, "user": user })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Registration failed", "detail": err })),
        ),
    }
}

async fn login(Json(req): Json<LoginRequest>) -> (StatusCode, Json<Value>) {
    let Some(email) = req.email.as_deref().and_then(normalize_email) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email and password are required" })),
        );
    };
    let Some(password) = req.password.filter(|p| !p.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email and password are required" })),
        );
    };

    let row = match users_repo::get_user_row_by_email(&email).await {
        Ok(row) => row,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Login failed", "detail": err })),
            )
        }
    };

    let Some(row) = row else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        );
    };

    if !verify_password(&password, &row.password_hash) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        );
    }

    let user = row.to_user();
    let cfg = Config::get();
    match create_session_token(&user, &cfg.jwt_secret, cfg.token_ttl_hours) {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({ "token": token, "user": user })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Login failed", "detail": err })),
        ),
    }
}

async fn me(CurrentUser(user): CurrentUser) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
struct PreferencesRequest {
    // Opaque JSON string holding theme, default agent and similar UI state.
    preferences: Option<String>,
}

async fn update_preferences(
    CurrentUser(user): CurrentUser,
    Json(req): Json<PreferencesRequest>,
) -> (StatusCode, Json<Value>) {
    match users_repo::update_preferences(&user.id, req.preferences.as_deref()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to update preferences", "detail": err })),
        ),
    }
}
