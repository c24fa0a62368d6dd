/**
 * Server Configuration
 *
 * Settings are read from the environment (after `.env` is loaded by `main`)
 * into a `ServerConfig`. Missing required values or unparsable ones fail
 * start-up with a `ConfigError`.
 *
 * The database stays optional: without `DATABASE_URL` the server starts and
 * every database-backed route answers 503.
 */

use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::PgPool;
use thiserror::Error;

use crate::backend::auth::cookies::CookieSettings;
use crate::backend::auth::sessions::SessionConfig;
use crate::backend::mail::SmtpConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 5000;
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: Option<String>,
    pub port: u16,
    /// Front-end origin, used for CORS and verification links
    pub app_origin: String,
    pub allowed_origin: HeaderValue,
    pub session: SessionConfig,
    pub cookie: CookieSettings,
    pub bcrypt_cost: u32,
    /// Upper bound for bracket generation and edits
    pub operation_timeout: Duration,
    pub smtp: Option<SmtpConfig>,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::MissingValue(key))
    }

    fn parsed<T: std::str::FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value }),
        }
    }

    fn flag(&self, key: &'static str) -> Result<bool, ConfigError> {
        match self.optional(key) {
            None => Ok(false),
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue { key, value }),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let app_origin = env
            .optional("APP_ORIGIN")
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
            .trim_end_matches('/')
            .to_string();
        let allowed_origin = HeaderValue::from_str(&app_origin).map_err(|_| ConfigError::InvalidValue {
            key: "APP_ORIGIN",
            value: app_origin.clone(),
        })?;

        let ttl_hours: i64 = env.parsed("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "SESSION_TTL_HOURS",
                value: ttl_hours.to_string(),
            });
        }

        let bcrypt_cost: u32 = env.parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let timeout_ms: u64 = env.parsed("OPERATION_TIMEOUT_MS", DEFAULT_OPERATION_TIMEOUT_MS)?;

        let smtp = match env.optional("SMTP_HOST") {
            None => None,
            Some(host) => Some(SmtpConfig {
                host,
                port: env.parsed("SMTP_PORT", DEFAULT_SMTP_PORT)?,
                username: env.required("SMTP_USER")?,
                password: env.required("SMTP_PASS")?,
                from: env.required("MAIL_FROM")?,
            }),
        };

        Ok(Self {
            database_url: env.optional("DATABASE_URL"),
            port: env.parsed("SERVER_PORT", DEFAULT_PORT)?,
            app_origin,
            allowed_origin,
            session: SessionConfig {
                secret: env.required("JWT_SECRET")?,
                ttl: chrono::Duration::hours(ttl_hours),
            },
            cookie: CookieSettings {
                secure: env.flag("COOKIE_SECURE")?,
                domain: env.optional("COOKIE_DOMAIN"),
            },
            bcrypt_cost,
            operation_timeout: Duration::from_millis(timeout_ms),
            smtp,
        })
    }
}

/// Connect to PostgreSQL and run pending migrations
///
/// Returns `None` when no URL is configured or the connection fails; the
/// server then runs without database features.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
