use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::warn;

#[derive(Clone)]
pub struct SseSender {
    tx: mpsc::UnboundedSender<Result<Event, Infallible>>,
}

impl SseSender {
    pub fn send_json(&self, value: &serde_json::Value) {
        let event = Event::default().data(value.to_string());
        if let Err(err) = self.tx.send(Ok(event)) {
            warn!(error = %err, "sse send_json failed");
        }
    }

    /// Emit a typed stream event: `{"type": ..., "timestamp": ..., ...payload}`.
    pub fn send_event(&self, event_type: &str, payload: serde_json::Value) {
        let mut value = serde_json::json!({
            "type": event_type,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let (Some(obj), Some(extra)) = (value.as_object_mut(), payload.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        self.send_json(&value);
    }
}

pub fn sse_channel() -> (
    Sse<impl Stream<Item = Result<Event, Infallible>>>,
    SseSender,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx);
    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    );
    (sse, SseSender { tx })
}
