//! Real-time Update Module
//!
//! Live tournament updates over Server-Sent Events.
//!
//! - **`broadcast`** - per-tournament broadcast channels
//! - **`subscription`** - SSE subscription handler
//!
//! Match edits publish a `tournament-update` event after their transaction
//! commits; admins can push a `broadcast-match` highlight. Events only reach
//! viewers of the tournament they belong to.

pub mod broadcast;
pub mod subscription;

pub use broadcast::{RealtimeEventBroadcast, TournamentChannels};
pub use subscription::handle_tournament_subscription;
