/**
 * Server Initialization
 *
 * Builds the application from a `ServerConfig`:
 * 1. Connect to the database and run migrations (optional)
 * 2. Set up the mailer
 * 3. Create the app state and router
 * 4. Start the periodic sweep of unused tournament channels
 *
 * A missing or unreachable database does not stop start-up; the mailer
 * settings do.
 */

use std::time::Duration;

use axum::Router;

use crate::backend::mail::{MailError, Mailer};
use crate::backend::realtime::TournamentChannels;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

const CHANNEL_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Load services and assemble the shared state
pub async fn build_state(config: ServerConfig) -> Result<AppState, MailError> {
    let db_pool = load_database(config.database_url.as_deref()).await;
    let mailer = Mailer::from_config(config.smtp.as_ref())?;
    Ok(AppState::new(config, db_pool, mailer))
}

fn spawn_channel_sweeper(channels: TournamentChannels) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CHANNEL_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = channels.cleanup_inactive_channels();
            tracing::debug!("Cleaned up {} inactive tournament channels", removed);
        }
    });
}

/// Create and configure the Axum application
pub async fn create_app(config: ServerConfig) -> Result<Router<()>, MailError> {
    tracing::info!("Initializing knockout backend server");

    let app_state = build_state(config).await?;
    spawn_channel_sweeper(app_state.channels.clone());

    let app = create_router(app_state);
    tracing::info!("Router configured with periodic channel cleanup");

    Ok(app)
}
