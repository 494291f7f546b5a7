use crate::db;
use crate::models::generation::Generation;

pub async fn create_generation(generation: &Generation) -> Result<(), String> {
    sqlx::query(
        "INSERT INTO generations \
         (id, user_id, topic, text_type, instructions, ai_model, generated_text, agent_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&generation.id)
    .bind(&generation.user_id)
    .bind(&generation.topic)
    .bind(&generation.text_type)
    .bind(&generation.instructions)
    .bind(&generation.ai_model)
    .bind(&generation.generated_text)
    .bind(&generation.agent_id)
    .bind(&generation.created_at)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn list_generations(user_id: &str, limit: i64) -> Result<Vec<Generation>, String> {
    sqlx::query_as::<_, Generation>(
        "SELECT * FROM generations WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db::pool())
    .await
    .map_err(|e| e.to_string())
}
