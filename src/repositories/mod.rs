pub mod agents;
pub mod api_keys;
pub mod error_logs;
pub mod generations;
pub mod texts;
pub mod users;
