/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * The `AppState` struct holds:
 * - the optional PostgreSQL pool
 * - per-tournament broadcast channels for live updates
 * - the parsed server configuration
 * - the verification mailer
 *
 * Everything is cheap to clone; handlers receive a clone per request.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::error::BackendError;
use crate::backend::mail::Mailer;
use crate::backend::realtime::TournamentChannels;
use crate::backend::server::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    ///
    /// `None` if `DATABASE_URL` is not set or the connection failed.
    /// Database-backed handlers answer 503 in that case.
    pub db_pool: Option<PgPool>,

    /// Live update channels, one per followed tournament
    pub channels: TournamentChannels,

    pub config: Arc<ServerConfig>,

    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: ServerConfig, db_pool: Option<PgPool>, mailer: Mailer) -> Self {
        Self {
            db_pool,
            channels: TournamentChannels::new(),
            config: Arc::new(config),
            mailer,
        }
    }

    /// The pool, or a 503 when the database is not configured
    pub fn pool(&self) -> Result<&PgPool, BackendError> {
        self.db_pool.as_ref().ok_or_else(|| {
            tracing::error!("Database not configured");
            BackendError::database_unavailable()
        })
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for TournamentChannels {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.channels.clone()
    }
}

impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
