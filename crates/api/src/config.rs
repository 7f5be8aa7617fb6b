use std::str::FromStr;

use boardwalk_core::types::DbId;

use crate::auth::jwt::JwtConfig;

/// Which collaborator implementations back the board service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `boards`/`accounts` tables via sqlx. Requires `DATABASE_URL`.
    Postgres,
    /// Process-local maps; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown board store '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub board_store: StoreBackend,
    /// Cache board listings per viewer (default: `true`).
    pub board_list_cache: bool,
    /// Accounts seeded as active when running on the memory store.
    pub memory_accounts: Vec<DbId>,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `BOARD_STORE`          | `postgres`                 |
    /// | `BOARD_LIST_CACHE`     | `true`                     |
    /// | `MEMORY_ACCOUNTS`      | (empty)                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let board_store: StoreBackend = std::env::var("BOARD_STORE")
            .unwrap_or_else(|_| "postgres".into())
            .parse()
            .unwrap_or_else(|e| panic!("BOARD_STORE: {e}"));

        let board_list_cache = parse_flag(
            &std::env::var("BOARD_LIST_CACHE").unwrap_or_else(|_| "true".into()),
        )
        .expect("BOARD_LIST_CACHE must be true or false");

        let memory_accounts = split_list(&std::env::var("MEMORY_ACCOUNTS").unwrap_or_default())
            .iter()
            .map(|id| id.parse::<DbId>())
            .collect::<Result<Vec<_>, _>>()
            .expect("MEMORY_ACCOUNTS must be a comma-separated list of ids");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            board_store,
            board_list_cache,
            memory_accounts,
            jwt,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
