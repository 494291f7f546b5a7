use crate::db;
use crate::models::user::{User, UserRow};

pub async fn create_user(
    id: &str,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, String> {
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, preferences, created_at, updated_at) \
         VALUES (?, ?, ?, ?, NULL, ?, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(&now)
    .bind(&now)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;

    get_user_by_id(id)
        .await?
        .ok_or_else(|| "user not found after insert".to_string())
}

pub async fn get_user_by_id(id: &str) -> Result<Option<User>, String> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db::pool())
        .await
        .map_err(|e| e.to_string())?;
    Ok(row.map(|r| r.to_user()))
}

pub async fn get_user_row_by_email(email: &str) -> Result<Option<UserRow>, String> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(db::pool())
        .await
        .map_err(|e| e.to_string())
}

pub async fn email_exists(email: &str) -> Result<bool, String> {
    Ok(get_user_row_by_email(email).await?.is_some())
}

pub async fn update_preferences(id: &str, preferences: Option<&str>) -> Result<(), String> {
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE users SET preferences = ?, updated_at = ? WHERE id = ?")
        .bind(preferences)
        .bind(&now)
        .bind(id)
        .execute(db::pool())
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}
