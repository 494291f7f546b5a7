use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Used only inside provider routing; the key never reaches a response body.
#[derive(Debug, Clone, FromRow)]
pub struct UserApiKey {
    pub provider: String,
    pub model_name: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiKeyMeta {
    pub provider: String,
    pub model_name: String,
}
