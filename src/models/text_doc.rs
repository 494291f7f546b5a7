use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TextDocument {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: String,
}
