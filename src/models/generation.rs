use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Generation {
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub text_type: String,
    pub instructions: Option<String>,
    pub ai_model: String,
    pub generated_text: String,
    pub agent_id: Option<String>,
    pub created_at: String,
}
