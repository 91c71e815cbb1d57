use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    /// Optional JSON overlay on the built-in holiday tables
    pub holidays_file: Option<String>,
    /// (username, password) of the administrator created on an empty store
    pub bootstrap_admin: Option<(String, String)>,
    pub active_cache_ttl: Duration,
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = optional("JWT_SECRET").context("JWT_SECRET must be set")?;

        let bootstrap_admin = match (
            optional("BOOTSTRAP_ADMIN_USERNAME"),
            optional("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(user), Some(password)) => Some((user, password)),
            (None, None) => None,
            _ => bail!("BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            database_url: optional("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://timeoff.db".to_string()),
            jwt_secret,
            server_addr: optional("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            access_token_ttl: var_or("ACCESS_TOKEN_TTL", 900)?, // default 15 min

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: optional("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            holidays_file: optional("HOLIDAYS_FILE"),
            bootstrap_admin,
            active_cache_ttl: Duration::from_secs(var_or("ACTIVE_CACHE_TTL_SECS", 60)?),
        })
    }

    /// Settings for in-process HTTP tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 900,
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            log_dir: "logs".into(),
            holidays_file: None,
            bootstrap_admin: None,
            active_cache_ttl: Duration::from_secs(60),
        }
    }
}
