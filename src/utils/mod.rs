pub mod abort_registry;
pub mod events;
pub mod sse;
pub mod validation;
