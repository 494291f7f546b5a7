use once_cell::sync::OnceCell;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_max_files: String,
    pub sqlite_path: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub openai_base_url: String,
    pub default_model: String,
    pub request_timeout_secs: u64,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    pub fn init_global() -> Result<&'static Config, String> {
        let cfg = Config::from_env()?;
        CONFIG
            .set(cfg)
            .map_err(|_| "Config already initialized".to_string())?;
        Ok(CONFIG.get().expect("config"))
    }

    pub fn get() -> &'static Config {
        CONFIG.get().expect("Config not initialized")
    }

    fn from_env() -> Result<Config, String> {
        let read_int = |key: &str, def: i64| -> i64 {
            match std::env::var(key) {
                Ok(v) => v.parse::<i64>().unwrap_or(def),
                Err(_) => def,
            }
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3001);

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_max_files = std::env::var("LOG_MAX_FILES").unwrap_or_else(|_| "7d".to_string());

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(v) => v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => vec!["*".to_string()],
        };

        let sqlite_path =
            std::env::var("SQLITE_PATH").unwrap_or_else(|_| "data/writer_app.db".to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET is required".to_string())?;
        if jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET must not be empty".to_string());
        }
        let token_ttl_hours = read_int("TOKEN_TTL_HOURS", 72);

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let gemini_base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let openai_base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let default_model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "gemini-3-flash-preview".to_string());
        let request_timeout_secs = read_int("REQUEST_TIMEOUT_SECS", 300).max(1) as u64;

        Ok(Config {
            host,
            port,
            cors_origins,
            log_level,
            log_max_files,
            sqlite_path,
            jwt_secret,
            token_ttl_hours,
            gemini_api_key,
            gemini_base_url,
            openai_base_url,
            default_model,
            request_timeout_secs,
        })
    }

    pub fn print(&self) {
        info!("Effective configuration:");
        info!("  - HOST: {}", self.host);
        info!("  - PORT: {}", self.port);
        info!("  - SQLITE_PATH: {}", self.sqlite_path);
        info!("  - LOG_LEVEL: {}", self.log_level);
        info!("  - CORS_ORIGINS: {}", self.cors_origins.join(","));
        info!("  - DEFAULT_MODEL: {}", self.default_model);
        info!("  - GEMINI_BASE_URL: {}", self.gemini_base_url);
        info!("  - OPENAI_BASE_URL: {}", self.openai_base_url);
        info!(
            "  - GEMINI_API_KEY: {}",
            if self.gemini_api_key.is_some() {
                "set"
            } else {
                "not set"
            }
        );
        info!("  - TOKEN_TTL_HOURS: {}", self.token_ttl_hours);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so they
    // cannot race each other.
    #[test]
    fn reads_env_with_fallbacks() {
        std::env::remove_var("JWT_SECRET");
        assert!(Config::from_env().is_err());

        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("PORT", "not-a-number");
        std::env::set_var("TOKEN_TTL_HOURS", "abc");
        std::env::set_var("CORS_ORIGINS", "http://a.test, http://b.test,");

        let cfg = Config::from_env().expect("config");
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.token_ttl_hours, 72);
        assert_eq!(cfg.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(cfg.default_model, "gemini-3-flash-preview");
        assert!(cfg.gemini_base_url.starts_with("https://"));

        std::env::remove_var("PORT");
        std::env::remove_var("TOKEN_TTL_HOURS");
        std::env::remove_var("CORS_ORIGINS");
        std::env::remove_var("JWT_SECRET");
    }
}
