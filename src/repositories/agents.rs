use crate::db;
use crate::models::agent::Agent;

pub async fn list_agents(user_id: &str) -> Result<Vec<Agent>, String> {
    sqlx::query_as::<_, Agent>(
        "SELECT * FROM ai_agents WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db::pool())
    .await
    .map_err(|e| e.to_string())
}

pub async fn get_agent_by_id(id: &str, user_id: &str) -> Result<Option<Agent>, String> {
    sqlx::query_as::<_, Agent>("SELECT * FROM ai_agents WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .fetch_optional(db::pool())
        .await
        .map_err(|e| e.to_string())
}

pub async fn create_agent(agent: &Agent) -> Result<(), String> {
    sqlx::query(
        "INSERT INTO ai_agents (id, user_id, name, prompt, temperature, top_k, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&agent.id)
    .bind(&agent.user_id)
    .bind(&agent.name)
    .bind(&agent.prompt)
    .bind(agent.temperature)
    .bind(agent.top_k)
    .bind(&agent.created_at)
    .bind(&agent.updated_at)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn update_agent(
    id: &str,
    user_id: &str,
    name: Option<String>,
    prompt: Option<String>,
    temperature: Option<f64>,
    top_k: Option<i64>,
) -> Result<Option<Agent>, String> {
    let Some(current) = get_agent_by_id(id, user_id).await? else {
        return Ok(None);
    };
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "UPDATE ai_agents SET name = ?, prompt = ?, temperature = ?, top_k = ?, updated_at = ? \
         WHERE id = ? AND user_id = ?",
    )
    .bind(name.unwrap_or(current.name))
    .bind(prompt.unwrap_or(current.prompt))
    .bind(temperature.or(current.temperature))
    .bind(top_k.or(current.top_k))
    .bind(&now)
    .bind(id)
    .bind(user_id)
    .execute(db::pool())
    .await
    .map_err(|e| e.to_string())?;

    get_agent_by_id(id, user_id).await
}

pub async fn delete_agent(id: &str, user_id: &str) -> Result<(), String> {
    sqlx::query("DELETE FROM ai_agents WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db::pool())
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}
