use crate::db;
use crate::models::api_key::{ApiKeyMeta, UserApiKey};

/// Listing exposes only (provider, model_name); key material stays server-side.
pub async fn list_key_meta(user_id: &str) -> Result<Vec<ApiKeyMeta>, String> {
    sqlx::query_as::<_, ApiKeyMeta>(
        "SELECT provider, model_name FROM user_api_keys WHERE user_id = ? \
         ORDER BY provider, model_name",
    )
    .bind(user_id)
    .fetch_all(db::pool())
    .await
    .map_err(|e| e.to_string())
}

/// A key matches on provider plus either the exact model name or the `all`
/// wildcard. Exact matches win over the wildcard.
pub async fn find_key(
    user_id: &str,
    provider: &str,
    model: &str,
) -> Result<Option<UserApiKey>, String> {
    sqlx::query_as::<_, UserApiKey>(
        "SELECT provider, model_name, api_key FROM user_api_keys \
         WHERE user_id = ? AND provider = ? AND model_name IN (?, 'all') \
         ORDER BY CASE model_name WHEN 'all' THEN 1 ELSE 0 END \
         LIMIT 1",
    )
    .bind(user_id)
    .bind(provider)
    .bind(model)
    .fetch_optional(db::pool())
    .await
    .map_err(|e| e.to_string())
}

/// Replace any existing row for (user, provider, model_name), then insert.
pub async fn upsert_key(
    user_id: &str,
    provider: &str,
    model_name: &str,
    api_key: &str,
) -> Result<(), String> {
    delete_key(user_id, provider, model_name).await?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO user_api_keys (id, user_id, provider, model_name, api_key, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(provider)
    .bind(model_name)
    .bind(api_key)
    .bind(&now)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn delete_key(user_id: &str, provider: &str, model_name: &str) -> Result<(), String> {
    sqlx::query("DELETE FROM user_api_keys WHERE user_id = ? AND provider = ? AND model_name = ?")
        .bind(user_id)
        .bind(provider)
        .bind(model_name)
        .execute(db::pool())
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}
