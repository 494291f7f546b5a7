// Canonical event type constants for generation SSE streams
pub struct Events;

impl Events {
    pub const START: &'static str = "start";
    pub const CHUNK: &'static str = "chunk";
    pub const COMPLETE: &'static str = "complete";
    pub const CANCELLED: &'static str = "cancelled";
    pub const ERROR: &'static str = "error";
}
