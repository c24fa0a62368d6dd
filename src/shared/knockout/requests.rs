//! Knockout API Types
//!
//! Request and response bodies for the knockout endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::model::{Match, MatchStatus, Participant, ParticipantId, Tournament, TournamentId, Winner};
use super::plan::Lineup;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Participant entry of a create request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewParticipant {
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub country_id: Option<String>,
}

/// Body of `POST /api/knockout-create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateKnockoutRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public_access: bool,
    pub participants: Vec<NewParticipant>,
    /// Explicit stage-0 pairings by participant index
    #[serde(default)]
    pub lineups: Option<Vec<Lineup>>,
}

/// Everything written by bracket generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedKnockout {
    pub tournament: Tournament,
    pub participants: Vec<Participant>,
    /// Matches grouped by stage
    pub matches: Vec<Vec<Match>>,
}

/// Fields of a match an admin may change
///
/// Only fields that are present are written. Nullable columns use a nested
/// option so that an explicit `null` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEdit {
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub information: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub participant_1_id: Option<Option<ParticipantId>>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub participant_2_id: Option<Option<ParticipantId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
}

impl MatchEdit {
    /// Apply the present fields to a copy of `current`
    pub fn applied_to(&self, current: &Match) -> Match {
        let mut next = current.clone();
        if let Some(date) = self.date {
            next.date = date;
        }
        if let Some(information) = &self.information {
            next.information = information.clone();
        }
        if let Some(participant) = self.participant_1_id {
            next.participant_1_id = participant;
        }
        if let Some(participant) = self.participant_2_id {
            next.participant_2_id = participant;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(winner) = self.winner {
            next.winner = winner;
        }
        next
    }
}

/// Body of `PUT /api/knockout-edit-match/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMatchRequest {
    #[serde(flatten)]
    pub edit: MatchEdit,
    /// `updated` timestamp of the match as last seen by the caller
    pub updated: DateTime<Utc>,
}

/// Matches written by one edit, the edited match first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchEditResult {
    pub tournament_id: TournamentId,
    pub mutated_matches: Vec<Match>,
}

/// Body of `PUT /api/knockout-edit-tournament/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditTournamentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub public_access: Option<bool>,
    /// `updated` timestamp of the tournament as last seen by the caller
    pub updated: DateTime<Utc>,
}

/// Full bracket as served by `GET /api/knockout-tournament/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub participants: Vec<Participant>,
    pub matches: Vec<Vec<Match>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentView {
    /// Whether the caller administers the tournament
    pub edit_permission: bool,
    pub tournament: TournamentDetail,
}

/// Row of `GET /api/tournaments-user`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub description: Option<String>,
    pub public_access: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Number of participants entered
    pub participants: i64,
}

/// Body of the `broadcast-match` event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchHighlight {
    pub stage_index: i16,
    pub match_index: i16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_edit_distinguishes_null_from_absent() {
        let body = r#"{"participant_1_id": null, "winner": 2, "updated": "2024-05-01T10:00:00Z"}"#;
        let request: EditMatchRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.edit.participant_1_id, Some(None));
        assert_eq!(request.edit.participant_2_id, None);
        assert_eq!(request.edit.winner, Some(Winner::Participant2));
    }

    #[test]
    fn test_edit_rejects_invalid_winner() {
        let body = r#"{"winner": 5, "updated": "2024-05-01T10:00:00Z"}"#;
        assert!(serde_json::from_str::<EditMatchRequest>(body).is_err());
    }

    #[test]
    fn test_empty_edit() {
        let body = r#"{"updated": "2024-05-01T10:00:00Z"}"#;
        let request: EditMatchRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.edit, MatchEdit::default());
    }

    #[test]
    fn test_create_request_with_lineups() {
        let body = r#"{
            "name": "Spring Cup",
            "participants": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
            "lineups": [[2, 0], [1, null]]
        }"#;
        let request: CreateKnockoutRequest = serde_json::from_str(body).unwrap();
        assert!(!request.public_access);
        assert_eq!(
            request.lineups,
            Some(vec![[Some(2), Some(0)], [Some(1), None]])
        );
    }

    #[test]
    fn test_edit_result_uses_camel_case() {
        let result = MatchEditResult {
            tournament_id: 4,
            mutated_matches: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["tournamentId"], 4);
        assert!(json["mutatedMatches"].is_array());
    }

    #[test]
    fn test_view_uses_edit_permission_key() {
        let now = Utc::now();
        let view = TournamentView {
            edit_permission: true,
            tournament: TournamentDetail {
                tournament: Tournament {
                    id: 1,
                    name: "Cup".to_string(),
                    description: None,
                    public_access: true,
                    created: now,
                    updated: now,
                },
                participants: Vec::new(),
                matches: Vec::new(),
            },
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["editPermission"], true);
        assert_eq!(json["tournament"]["name"], "Cup");
    }
}
