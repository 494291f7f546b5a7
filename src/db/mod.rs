use std::path::Path;
use std::time::Duration;

use once_cell::sync::OnceCell;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::config::Config;

static DB_POOL: OnceCell<SqlitePool> = OnceCell::new();

pub async fn init_global() -> Result<(), String> {
    let cfg = Config::get();
    let pool = init_sqlite(&cfg.sqlite_path).await?;
    DB_POOL
        .set(pool)
        .map_err(|_| "Database already initialized".to_string())?;
    Ok(())
}

pub fn pool() -> &'static SqlitePool {
    DB_POOL.get().expect("Database not initialized")
}

async fn init_sqlite(db_path: &str) -> Result<SqlitePool, String> {
    let path = Path::new(db_path);
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("create sqlite dir failed: {e}"))?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(30_000));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| format!("sqlite connect failed: {e}"))?;

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await
        .ok();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .ok();

    create_tables(&pool).await?;

    info!("[SQLite] database initialized: {}", db_path);
    Ok(pool)
}

pub async fn create_tables(pool: &SqlitePool) -> Result<(), String> {
    let statements = vec![
        r#"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            preferences TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS ai_agents (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            prompt TEXT NOT NULL,
            temperature REAL,
            top_k INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS user_api_keys (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            provider TEXT NOT NULL,
            model_name TEXT NOT NULL,
            api_key TEXT NOT NULL,
            created_at TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS generations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            topic TEXT NOT NULL,
            text_type TEXT NOT NULL,
            instructions TEXT,
            ai_model TEXT NOT NULL,
            generated_text TEXT NOT NULL,
            agent_id TEXT,
            created_at TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS texts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS error_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            error_message TEXT NOT NULL,
            stack_trace TEXT,
            context TEXT,
            created_at TEXT NOT NULL
        )"#,
        "CREATE INDEX IF NOT EXISTS idx_ai_agents_user ON ai_agents(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_api_keys_user ON user_api_keys(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_generations_user ON generations(user_id, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_texts_user ON texts(user_id, created_at)",
    ];

    for stmt in statements {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| format!("create table failed: {e}"))?;
    }

    Ok(())
}
