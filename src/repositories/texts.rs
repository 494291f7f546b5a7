use crate::db;
use crate::models::text_doc::TextDocument;

pub async fn create_text(doc: &TextDocument) -> Result<(), String> {
    sqlx::query(
        "INSERT INTO texts (id, user_id, title, content, category, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&doc.id)
    .bind(&doc.user_id)
    .bind(&doc.title)
    .bind(&doc.content)
    .bind(&doc.category)
    .bind(&doc.created_at)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn list_texts(user_id: &str, limit: i64) -> Result<Vec<TextDocument>, String> {
    sqlx::query_as::<_, TextDocument>(
        "SELECT * FROM texts WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db::pool())
    .await
    .map_err(|e| e.to_string())
}
