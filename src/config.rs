//! Service configuration.
//!
//! Everything is read once from environment variables at startup. Missing
//! persistence settings mean the board runs local-only from the start;
//! a missing OpenRouter key disables the command channel.

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Skips auth checks and uses a fixed identity. Never enable in
    /// production.
    pub dev_mode: bool,
    /// The active board. Only one board is served per process today.
    pub board_id: String,
    pub persistence: Option<PersistenceConfig>,
    pub openrouter_api_key: Option<String>,
    /// Model hint passed to the text-generation provider.
    pub ai_model: String,
    pub auth: AuthConfig,
}

/// Connection settings for the remote board store.
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub url: String,
    pub service_key: String,
}

/// Dashboard auth settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub dashboard_password: Option<String>,
    pub jwt_ttl_days: i64,
}

impl AuthConfig {
    /// Whether requests must carry a valid token.
    pub fn auth_required(&self, dev_mode: bool) -> bool {
        !dev_mode
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// - `HOST` / `PORT` - bind address (default `0.0.0.0:8080`)
    /// - `DEV_MODE` - `true`/`1` to skip auth
    /// - `BOARD_ID` - active board (default `board-1`)
    /// - `PERSIST_URL` / `PERSIST_SERVICE_KEY` - remote board store
    /// - `OPENROUTER_API_KEY` / `AI_MODEL` - command channel
    /// - `JWT_SECRET` / `DASHBOARD_PASSWORD` / `JWT_TTL_DAYS` - dashboard auth
    pub fn from_env() -> Self {
        let persistence = match (env_opt("PERSIST_URL"), env_opt("PERSIST_SERVICE_KEY")) {
            (Some(url), Some(service_key)) => Some(PersistenceConfig { url, service_key }),
            _ => None,
        };

        Self {
            host: env_opt("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_opt("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            dev_mode: env_opt("DEV_MODE").map(|v| parse_bool(&v)).unwrap_or(false),
            board_id: env_opt("BOARD_ID").unwrap_or_else(|| "board-1".to_string()),
            persistence,
            openrouter_api_key: env_opt("OPENROUTER_API_KEY"),
            ai_model: env_opt("AI_MODEL").unwrap_or_else(|| "openai/gpt-4o-mini".to_string()),
            auth: AuthConfig {
                jwt_secret: env_opt("JWT_SECRET"),
                dashboard_password: env_opt("DASHBOARD_PASSWORD"),
                jwt_ttl_days: env_opt("JWT_TTL_DAYS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            },
        }
    }
}

/// Non-empty environment variable, if set.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
