use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::current_user::CurrentUser;
use crate::models::generation::Generation;
use crate::models::user::User;
use crate::repositories::generations as generations_repo;
use crate::services::audit;
use crate::services::personas::{compose_prompt, resolve_persona_detailed, PersonaSettings};
use crate::services::providers::{self, ChunkCallback, GenerationRequest, Provider, ProviderError};
use crate::utils::abort_registry;
use crate::utils::events::Events;
use crate::utils::sse::{sse_channel, SseSender};
use crate::utils::validation::{normalize_non_empty, normalize_non_empty_str};

pub fn router() -> Router {
    Router::new()
        .route("/", post(generate))
        .route("/abort", post(abort))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    topic: Option<String>,
    #[serde(alias = "textType")]
    text_type: Option<String>,
    instructions: Option<String>,
    agent: Option<String>,
    #[serde(alias = "modelName")]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AbortRequest {
    request_id: Option<String>,
}

struct StreamJob {
    user: User,
    topic: String,
    text_type: String,
    instructions: Option<String>,
    agent_id: Option<String>,
    provider: Provider,
    api_key: String,
    gen_req: GenerationRequest,
    request_id: String,
    token: CancellationToken,
}

/// Streaming generation. Validation and provider routing happen up front so
/// the client gets a plain JSON error instead of a broken stream; after that
/// the provider output is forwarded as `start`/`chunk`/`complete` SSE events.
async fn generate(
    CurrentUser(user): CurrentUser,
    Json(req): Json<GenerateRequest>,
) -> Result<impl axum::response::IntoResponse, (StatusCode, Json<Value>)> {
    let (Some(topic), Some(text_type), Some(model)) = (
        normalize_non_empty(req.topic),
        normalize_non_empty(req.text_type),
        normalize_non_empty(req.model),
    ) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "topic, textType and model are required" })),
        ));
    };

    let Some(provider) = Provider::from_model_name(&model) else {
        let err = ProviderError::UnsupportedModel(model.clone());
        audit::log_error_background(
            Some(user.id.clone()),
            err.to_string(),
            "API /api/generate".to_string(),
        );
        return Err((
            err.http_status(),
            Json(json!({ "error": err.to_string() })),
        ));
    };

    let api_key = match providers::resolve_api_key(&user.id, provider, &model).await {
        Ok(key) => key,
        Err(err) => {
            audit::log_error_background(
                Some(user.id.clone()),
                err.to_string(),
                "API /api/generate".to_string(),
            );
            return Err((
                err.http_status(),
                Json(json!({ "error": err.to_string() })),
            ));
        }
    };

    let (persona, agent_id) = resolve_persona_detailed(req.agent.as_deref(), &user.id).await;
    let instructions = req.instructions.as_deref().and_then(normalize_non_empty_str);
    let prompt = compose_prompt(&topic, &text_type, instructions.as_deref());

    let PersonaSettings {
        system_instruction,
        temperature,
        top_k,
    } = persona;
    let gen_req = GenerationRequest {
        model,
        system_instruction: Some(system_instruction),
        prompt,
        temperature,
        top_k,
        json_mode: false,
    };

    let request_id = Uuid::new_v4().to_string();
    let token = CancellationToken::new();
    abort_registry::register(&request_id, token.clone());

    let (sse, sender) = sse_channel();
    task::spawn(stream_generation(
        sender,
        StreamJob {
            user,
            topic,
            text_type,
            instructions,
            agent_id,
            provider,
            api_key,
            gen_req,
            request_id,
            token,
        },
    ));

    Ok(sse)
}

async fn stream_generation(sender: SseSender, job: StreamJob) {
    let request_id = job.request_id.clone();
    info!(request_id = %request_id, model = %job.gen_req.model, "generation stream start");

    sender.send_event(
        Events::START,
        json!({ "request_id": request_id, "model": job.gen_req.model }),
    );

    let chunk_sender = sender.clone();
    let chunk_request_id = request_id.clone();
    let on_chunk: ChunkCallback = Arc::new(move |chunk: String| {
        if abort_registry::is_aborted(&chunk_request_id) {
            return;
        }
        chunk_sender.send_event(Events::CHUNK, json!({ "content": chunk }));
    });

    let result = providers::generate_stream(
        job.provider,
        &job.gen_req,
        &job.api_key,
        on_chunk,
        job.token.clone(),
    )
    .await;

    match result {
        Ok(full_text) => {
            let generation = Generation {
                id: Uuid::new_v4().to_string(),
                user_id: job.user.id.clone(),
                topic: job.topic,
                text_type: job.text_type,
                instructions: job.instructions,
                ai_model: job.gen_req.model.clone(),
                generated_text: full_text.clone(),
                agent_id: job.agent_id,
                created_at: chrono::Utc::now().to_rfc3339(),
            };
            if let Err(err) = generations_repo::create_generation(&generation).await {
                warn!(error = %err, "failed to save generation");
            }
            sender.send_event(
                Events::COMPLETE,
                json!({ "content": full_text, "model": job.gen_req.model }),
            );
        }
        Err(ProviderError::Cancelled) => {
            info!(request_id = %request_id, "generation stream cancelled");
            sender.send_event(Events::CANCELLED, json!({ "request_id": request_id }));
        }
        Err(err) => {
            audit::log_error_background(
                Some(job.user.id.clone()),
                err.to_string(),
                "API /api/generate".to_string(),
            );
            sender.send_event(Events::ERROR, json!({ "error": err.to_string() }));
        }
    }

    abort_registry::clear(&request_id);
}

async fn abort(
    CurrentUser(_user): CurrentUser,
    Json(req): Json<AbortRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(request_id) = normalize_non_empty(req.request_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "request_id is required" })),
        );
    };
    let aborted = abort_registry::abort(&request_id);
    (StatusCode::OK, Json(json!({ "success": aborted })))
}
