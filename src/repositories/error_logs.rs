use crate::db;

pub async fn insert_error_log(
    user_id: Option<&str>,
    error_message: &str,
    stack_trace: Option<&str>,
    context: Option<&str>,
) -> Result<(), String> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO error_logs (id, user_id, error_message, stack_trace, context, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(error_message)
    .bind(stack_trace)
    .bind(context)
    .bind(&now)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;
    Ok(())
}
