use futures::StreamExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::stream::SseFrameBuffer;
use super::{http_client, truncate_log, ChunkCallback, GenerationRequest, ProviderError};
use crate::config::Config;

fn endpoint() -> String {
    let base = Config::get().openai_base_url.trim_end_matches('/').to_string();
    format!("{base}/chat/completions")
}

// top_k is not part of the chat completions surface; only temperature is
// forwarded.
fn build_payload(req: &GenerationRequest, stream: bool) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &req.system_instruction {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": req.prompt }));

    let mut payload = json!({
        "model": req.model,
        "messages": messages,
        "temperature": req.temperature,
    });
    if stream {
        payload["stream"] = Value::Bool(true);
    }
    payload
}

fn extract_message_text(response: &Value) -> String {
    response
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn extract_delta(event: &Value) -> Option<String> {
    event
        .pointer("/choices/0/delta/content")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub async fn generate(req: &GenerationRequest, api_key: &str) -> Result<String, ProviderError> {
    let url = endpoint();
    info!(model = %req.model, "[OpenAI] chat completion start");

    let resp = http_client()
        .post(&url)
        .bearer_auth(api_key)
        .json(&build_payload(req, false))
        .send()
        .await
        .map_err(|e| ProviderError::Http(e.to_string()))?;

    let status = resp.status();
    let raw = resp
        .text()
        .await
        .map_err(|e| ProviderError::Http(e.to_string()))?;
    if !status.is_success() {
        let message = truncate_log(&raw, 2000);
        error!(status = %status, error = %message, "[OpenAI] request failed");
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| ProviderError::Http(format!("invalid JSON response: {e}")))?;
    let text = extract_message_text(&value);
    if text.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

pub async fn generate_stream(
    req: &GenerationRequest,
    api_key: &str,
    on_chunk: ChunkCallback,
    cancel: CancellationToken,
) -> Result<String, ProviderError> {
    let url = endpoint();
    info!(model = %req.model, "[OpenAI] chat completion stream start");

    let send = http_client()
        .post(&url)
        .bearer_auth(api_key)
        .json(&build_payload(req, true))
        .send();

    let resp = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        res = send => res.map_err(|e| ProviderError::Http(e.to_string()))?,
    };

    let status = resp.status();
    if !status.is_success() {
        let raw = resp.text().await.unwrap_or_default();
        let message = truncate_log(&raw, 2000);
        error!(status = %status, error = %message, "[OpenAI] stream request failed");
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let mut stream = resp.bytes_stream();
    let mut frames = SseFrameBuffer::new();
    let mut full_content = String::new();
    let mut done = false;

    while let Some(chunk) = stream.next().await {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        let bytes = chunk.map_err(|e| ProviderError::Http(e.to_string()))?;
        for payload in frames.push(&String::from_utf8_lossy(&bytes)) {
            if payload == "[DONE]" {
                done = true;
                break;
            }
            let Ok(event) = serde_json::from_str::<Value>(&payload) else {
                continue;
            };
            if let Some(delta) = extract_delta(&event) {
                full_content.push_str(&delta);
                on_chunk(delta);
            }
        }
        if done {
            break;
        }
    }

    if full_content.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(full_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "gpt-4o".to_string(),
            system_instruction: Some("You are a professional editor.".to_string()),
            prompt: "Write an essay about \"time\".".to_string(),
            temperature: 0.3,
            top_k: 20,
            json_mode: false,
        }
    }

    #[test]
    fn payload_has_system_then_user_messages() {
        let payload = build_payload(&request(), true);
        assert_eq!(payload.pointer("/messages/0/role").unwrap(), "system");
        assert_eq!(payload.pointer("/messages/1/role").unwrap(), "user");
        assert_eq!(payload["stream"], json!(true));
        assert_eq!(payload["temperature"], json!(0.3));
        assert!(payload.get("top_k").is_none());
    }

    #[test]
    fn payload_without_system_instruction() {
        let mut req = request();
        req.system_instruction = None;
        let payload = build_payload(&req, false);
        assert_eq!(payload.pointer("/messages/0/role").unwrap(), "user");
        assert!(payload.get("stream").is_none());
    }

    #[test]
    fn extracts_full_message_text() {
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Done." } }]
        });
        assert_eq!(extract_message_text(&response), "Done.");
        assert_eq!(extract_message_text(&json!({})), "");
    }

    #[test]
    fn extracts_stream_deltas() {
        let event = json!({ "choices": [{ "delta": { "content": "Hel" } }] });
        assert_eq!(extract_delta(&event), Some("Hel".to_string()));

        let empty = json!({ "choices": [{ "delta": { "content": "" } }] });
        assert_eq!(extract_delta(&empty), None);

        let finish = json!({ "choices": [{ "delta": {}, "finish_reason": "stop" }] });
        assert_eq!(extract_delta(&finish), None);
    }
}
