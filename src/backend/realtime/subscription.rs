/**
 * Live Tournament Subscription
 *
 * GET /api/knockout-tournament/{id}/live streams the events of one
 * tournament as Server-Sent Events. Visibility follows the read rule:
 * public tournaments are open to anyone, private ones to their admins.
 *
 * Each SSE event is named after its `EventType` (`tournament-update`,
 * `broadcast-match`) and carries the serialized `RealtimeEvent` as data.
 *
 * # Connection Management
 *
 * - Connections are kept alive using the SSE keep-alive mechanism
 * - Lagged events are logged but don't cause connection drops
 * - The stream ends when the channel closes
 */

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};

use crate::backend::error::BackendError;
use crate::backend::knockout::store::PgKnockoutTx;
use crate::backend::knockout::tournaments::authorize_subscription;
use crate::backend::middleware::MaybeAuthUser;
use crate::backend::server::state::AppState;
use crate::shared::knockout::TournamentId;
use crate::shared::RealtimeEvent;

/// Turn a channel receiver into a stream of SSE events
///
/// The stream ends once every sender of the channel is gone.
pub fn event_stream(
    receiver: broadcast::Receiver<RealtimeEvent>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    BroadcastStream::new(receiver).filter_map(|received| match received {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(data) => Some(Ok(Event::default().event(event.event_type.as_str()).data(data))),
            Err(e) => {
                tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
            None
        }
    })
}

pub async fn handle_tournament_subscription(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    let pool = state.pool()?;

    let mut tx = PgKnockoutTx::begin(pool).await?;
    authorize_subscription(&mut tx, tournament_id, viewer.user_id()).await?;
    tx.commit().await?;

    let receiver = state.channels.subscribe(tournament_id);
    tracing::info!(
        "[Realtime] New subscriber for tournament {} ({} total)",
        tournament_id,
        state.channels.subscriber_count(tournament_id)
    );

    Ok(Sse::new(event_stream(receiver)).keep_alive(KeepAlive::default()))
}
