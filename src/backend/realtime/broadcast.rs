/**
 * Per-tournament Event Channels
 *
 * Every tournament with at least one live subscriber owns a
 * `tokio::sync::broadcast` channel. Publishing to a tournament nobody
 * follows is a no-op, and channels whose receivers are all gone are swept
 * by `cleanup_inactive_channels`.
 *
 * Delivery is fire-and-forget: a lagging receiver drops events and the
 * subscription handler logs the gap.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::shared::knockout::TournamentId;
use crate::shared::RealtimeEvent;

/// Buffered events per tournament channel
pub const CHANNEL_CAPACITY: usize = 100;

pub type RealtimeEventBroadcast = broadcast::Sender<RealtimeEvent>;

#[derive(Clone, Default)]
pub struct TournamentChannels {
    channels: Arc<Mutex<HashMap<TournamentId, RealtimeEventBroadcast>>>,
}

impl TournamentChannels {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TournamentId, RealtimeEventBroadcast>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to a tournament, creating its channel on first use
    pub fn subscribe(&self, tournament_id: TournamentId) -> broadcast::Receiver<RealtimeEvent> {
        self.lock()
            .entry(tournament_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send an event to everyone following a tournament
    ///
    /// Returns the number of receivers that got it.
    pub fn publish(&self, tournament_id: TournamentId, event: RealtimeEvent) -> usize {
        let channels = self.lock();
        let Some(sender) = channels.get(&tournament_id) else {
            tracing::debug!("[Realtime] No channel for tournament {}", tournament_id);
            return 0;
        };

        match sender.send(event) {
            Ok(count) => {
                tracing::info!("[Realtime] Tournament {} event sent to {} subscribers", tournament_id, count);
                count
            }
            Err(_) => {
                tracing::debug!("[Realtime] No subscribers left for tournament {}", tournament_id);
                0
            }
        }
    }

    /// Drop channels without receivers
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.lock();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    pub fn subscriber_count(&self, tournament_id: TournamentId) -> usize {
        self.lock()
            .get(&tournament_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}
