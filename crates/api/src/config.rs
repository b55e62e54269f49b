use std::fmt::Display;
use std::str::FromStr;

use msgdesk_core::channels::{ChannelRates, DEFAULT_RATES};

use crate::auth::jwt::JwtConfig;

/// Credentials for the super admin seeded on an empty database.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum pooled database connections (default: `20`).
    pub db_max_connections: u32,
    /// Largest accepted request body, which bounds CSV uploads
    /// (default: 10 MiB).
    pub max_upload_bytes: usize,
    /// Per-message rates for clients without a plan.
    pub default_rates: ChannelRates,
    /// Super admin created at startup when no super admin exists yet.
    pub admin_seed: Option<AdminSeed>,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `4000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DB_MAX_CONNECTIONS`   | `20`                       |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`                 |
    /// | `RATE_SMS_CENTS`       | `25`                       |
    /// | `RATE_RCS_CENTS`       | `40`                       |
    /// | `RATE_WHATSAPP_CENTS`  | `60`                       |
    ///
    /// `BOOTSTRAP_ADMIN_USERNAME`, `BOOTSTRAP_ADMIN_EMAIL` and
    /// `BOOTSTRAP_ADMIN_PASSWORD` enable admin seeding only when all three are set.
    pub fn from_env() -> Self {
        let cors_origins = env_or::<String>("CORS_ORIGINS", "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let default_rates = ChannelRates {
            sms: rate_from_env("RATE_SMS_CENTS", DEFAULT_RATES.sms),
            rcs: rate_from_env("RATE_RCS_CENTS", DEFAULT_RATES.rcs),
            whatsapp: rate_from_env("RATE_WHATSAPP_CENTS", DEFAULT_RATES.whatsapp),
        };

        let admin_seed = match (
            std::env::var("BOOTSTRAP_ADMIN_USERNAME"),
            std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(email), Ok(password)) => Some(AdminSeed {
                username,
                email,
                password,
            }),
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host: env_or("HOST", "0.0.0.0".into()),
            port: env_or("PORT", 4000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            default_rates,
            admin_seed,
            jwt,
        }
    }
}

/// Parse `var` when set, else use `default`.
///
/// # Panics
///
/// Panics when the variable is set but does not parse.
pub(crate) fn env_or<T>(var: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{var}={raw:?} is invalid: {e}")),
        Err(_) => default,
    }
}

fn rate_from_env(var: &str, default: i64) -> i64 {
    let rate = env_or(var, default);
    assert!(rate >= 0, "{var} must not be negative");
    rate
}
