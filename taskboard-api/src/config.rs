/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_PRODUCTION`: Production mode, marks cookies `Secure` (default: false)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: `*`)
/// - `TASKBOARD_STORE`: `postgres` (default) or `memory`
/// - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for session signing (required, >= 32 chars)
/// - `SESSION_COOKIE`: Session cookie name (default: taskboard_session)
/// - `SESSION_TTL_SECS`: Lifetime of issued sessions (default: 86400)
/// - `SESSION_REFRESH_SECS`: Refresh window before expiry (default: 3600)
/// - `AUTH_URL`, `AUTH_PUBLIC_KEY`: Public auth settings served at `/api/config`
/// - `RUST_LOG`: Log filter (default: taskboard_api=debug,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Where tasks are stored
    pub store: StoreConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Settings served to clients by `/api/config`
    pub public: PublicSettings,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode
    pub production: bool,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Task store backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// PostgreSQL
    Postgres {
        /// PostgreSQL connection URL
        url: String,

        /// Maximum number of connections in pool
        max_connections: u32,
    },

    /// In-process store; contents are lost on restart
    Memory,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for session signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Session cookie name
    pub cookie_name: String,

    /// Session lifetime (seconds)
    pub ttl_secs: i64,

    /// Refresh the cookie when less than this remains (seconds)
    pub refresh_secs: i64,
}

/// Public client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicSettings {
    pub auth_url: Option<String>,
    pub auth_public_key: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(&var, "API_PORT", 8080)?;
        let production: bool = parse_or(&var, "API_PRODUCTION", false)?;
        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let store = match var("TASKBOARD_STORE").as_deref() {
            None | Some("postgres") => StoreConfig::Postgres {
                url: var("DATABASE_URL")
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            Some("memory") => StoreConfig::Memory,
            Some(other) => anyhow::bail!("TASKBOARD_STORE must be `postgres` or `memory`, got `{}`", other),
        };

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let ttl_secs: i64 = parse_or(&var, "SESSION_TTL_SECS", 86_400)?;
        let refresh_secs: i64 = parse_or(&var, "SESSION_REFRESH_SECS", 3_600)?;

        if ttl_secs <= 0 || refresh_secs < 0 {
            anyhow::bail!("SESSION_TTL_SECS must be positive and SESSION_REFRESH_SECS non-negative");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                cors_origins,
            },
            store,
            session: SessionConfig {
                jwt_secret,
                cookie_name: var("SESSION_COOKIE").unwrap_or_else(|| "taskboard_session".to_string()),
                ttl_secs,
                refresh_secs,
            },
            public: PublicSettings {
                auth_url: var("AUTH_URL"),
                auth_public_key: var("AUTH_PUBLIC_KEY"),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when every origin is allowed
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}
