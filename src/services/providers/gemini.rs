use futures::StreamExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::stream::SseFrameBuffer;
use super::{http_client, truncate_log, ChunkCallback, GenerationRequest, ProviderError};
use crate::config::Config;

fn endpoint(model: &str, stream: bool) -> String {
    let base = Config::get().gemini_base_url.trim_end_matches('/').to_string();
    if stream {
        format!("{base}/v1beta/models/{model}:streamGenerateContent?alt=sse")
    } else {
        format!("{base}/v1beta/models/{model}:generateContent")
    }
}

fn build_payload(req: &GenerationRequest) -> Value {
    let mut generation_config = json!({
        "temperature": req.temperature,
        "topK": req.top_k,
    });
    if req.json_mode {
        generation_config["responseMimeType"] = Value::String("application/json".to_string());
    }

    let mut payload = json!({
        "contents": [{ "role": "user", "parts": [{ "text": req.prompt }] }],
        "generationConfig": generation_config,
    });
    if let Some(system) = &req.system_instruction {
        payload["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    payload
}

/// Concatenate the text parts of the first candidate. Both full responses and
/// stream events share this shape.
fn extract_text(response: &Value) -> String {
    let mut out = String::new();
    if let Some(parts) = response
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
    {
        for part in parts {
            if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                out.push_str(text);
            }
        }
    }
    out
}

pub async fn generate(req: &GenerationRequest, api_key: &str) -> Result<String, ProviderError> {
    let url = endpoint(&req.model, false);
    info!(model = %req.model, "[Gemini] generateContent start");

    let resp = http_client()
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&build_payload(req))
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
        error!(status = %status, error = %message, "[Gemini] request failed");
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| ProviderError::Http(format!("invalid JSON response: {e}")))?;
    let text = extract_text(&value);
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
    let url = endpoint(&req.model, true);
    info!(model = %req.model, "[Gemini] streamGenerateContent start");

    let send = http_client()
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&build_payload(req))
        .send();

    let resp = tokio::select! {
        _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        res = send => res.map_err(|e| ProviderError::Http(e.to_string()))?,
    };

    let status = resp.status();
    if !status.is_success() {
        let raw = resp.text().await.unwrap_or_default();
        let message = truncate_log(&raw, 2000);
        error!(status = %status, error = %message, "[Gemini] stream request failed");
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let mut stream = resp.bytes_stream();
    let mut frames = SseFrameBuffer::new();
    let mut full_content = String::new();

    while let Some(chunk) = stream.next().await {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        let bytes = chunk.map_err(|e| ProviderError::Http(e.to_string()))?;
        for payload in frames.push(&String::from_utf8_lossy(&bytes)) {
            if payload == "[DONE]" {
                continue;
            }
            let Ok(value) = serde_json::from_str::<Value>(&payload) else {
                continue;
            };
            let delta = extract_text(&value);
            if !delta.is_empty() {
                full_content.push_str(&delta);
                on_chunk(delta);
            }
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
            model: "gemini-3-flash-preview".to_string(),
            system_instruction: Some("You are a helpful AI writing assistant.".to_string()),
            prompt: "Write a poem about \"rain\".".to_string(),
            temperature: 0.7,
            top_k: 40,
            json_mode: false,
        }
    }

    #[test]
    fn payload_carries_system_instruction_and_sampling() {
        let payload = build_payload(&request());
        assert_eq!(
            payload.pointer("/contents/0/parts/0/text").unwrap(),
            "Write a poem about \"rain\"."
        );
        assert_eq!(
            payload.pointer("/systemInstruction/parts/0/text").unwrap(),
            "You are a helpful AI writing assistant."
        );
        assert_eq!(
            payload.pointer("/generationConfig/topK").unwrap(),
            &json!(40)
        );
        assert!(payload.pointer("/generationConfig/responseMimeType").is_none());
    }

    #[test]
    fn json_mode_sets_response_mime_type() {
        let mut req = request();
        req.json_mode = true;
        req.system_instruction = None;
        let payload = build_payload(&req);
        assert_eq!(
            payload.pointer("/generationConfig/responseMimeType").unwrap(),
            "application/json"
        );
        assert!(payload.get("systemInstruction").is_none());
    }

    #[test]
    fn extracts_candidate_text_parts() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }]
        });
        assert_eq!(extract_text(&response), "Hello world");
        assert_eq!(extract_text(&json!({ "candidates": [] })), "");
        assert_eq!(extract_text(&json!({})), "");
    }
}
