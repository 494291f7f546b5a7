use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agent {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub prompt: String,
    pub temperature: Option<f64>,
    pub top_k: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}
