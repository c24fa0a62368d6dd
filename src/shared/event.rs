/**
 * Real-time Event System
 *
 * This module defines the events pushed to viewers of a tournament.
 * Each event carries a JSON payload and is delivered on the channel of
 * exactly one tournament.
 */
use serde::{Deserialize, Serialize};

use crate::shared::knockout::{MatchEditResult, MatchHighlight};

/// Type of real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// Matches changed after an edit and its cascade
    TournamentUpdate,
    /// An admin highlighted a match for viewers
    BroadcastMatch,
}

impl EventType {
    /// Name used as the SSE `event:` field
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TournamentUpdate => "tournament-update",
            EventType::BroadcastMatch => "broadcast-match",
        }
    }
}

/// Real-time event that can be broadcast to all subscribers of a tournament
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event_type: EventType,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a `tournament-update` event from the result of a match edit
    pub fn tournament_update(result: &MatchEditResult) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::TournamentUpdate, serde_json::to_value(result)?))
    }

    /// Create a `broadcast-match` event
    pub fn broadcast_match(highlight: MatchHighlight) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::BroadcastMatch, serde_json::to_value(highlight)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_new() {
        let event = RealtimeEvent::new(EventType::BroadcastMatch, serde_json::json!({}));
        assert_eq!(event.event_type, EventType::BroadcastMatch);
        assert!(!event.timestamp.is_empty());
    }

    #[test]
    fn test_tournament_update_payload() {
        let result = MatchEditResult {
            tournament_id: 7,
            mutated_matches: Vec::new(),
        };
        let event = RealtimeEvent::tournament_update(&result).unwrap();
        assert_eq!(event.event_type, EventType::TournamentUpdate);
        assert_eq!(event.payload["tournamentId"], 7);
    }

    #[test]
    fn test_broadcast_match_payload() {
        let event = RealtimeEvent::broadcast_match(MatchHighlight {
            stage_index: 1,
            match_index: 0,
        })
        .unwrap();
        assert_eq!(event.payload["stageIndex"], 1);
        assert_eq!(event.payload["matchIndex"], 0);
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(
            serde_json::to_string(&EventType::TournamentUpdate).unwrap(),
            "\"tournament-update\""
        );
        assert_eq!(EventType::BroadcastMatch.as_str(), "broadcast-match");
    }
}
