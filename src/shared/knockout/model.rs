//! Knockout Bracket Model
//!
//! Tournaments, participants and matches as they are stored and served.
//!
//! A bracket is a tree of matches addressed by `(stage_number, match_number)`.
//! Stage 0 is the first round. Match `i` of stage `s` feeds match `i / 2` of
//! stage `s + 1`: even match numbers fill the parent's first slot, odd ones the
//! second. The final is the only match of the highest stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

pub type TournamentId = i64;
pub type ParticipantId = i64;
pub type MatchId = i64;

/// Lifecycle of a single match
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ssr", derive(sqlx::Type))]
#[cfg_attr(feature = "ssr", sqlx(type_name = "match_status", rename_all = "lowercase"))]
pub enum MatchStatus {
    /// Not started yet
    #[default]
    Future,
    /// Currently being played
    Live,
    /// Finished
    Past,
}

/// Recorded result of a match
///
/// Serialized as the number `0`, `1` or `2`. Any other number is rejected
/// while deserializing, so a `Winner` value is always valid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
#[cfg_attr(feature = "ssr", derive(sqlx::Type))]
#[repr(i16)]
pub enum Winner {
    /// No winner recorded
    #[default]
    Undetermined = 0,
    /// The participant in the first slot won
    Participant1 = 1,
    /// The participant in the second slot won
    Participant2 = 2,
}

impl TryFrom<u8> for Winner {
    type Error = SharedError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Winner::Undetermined),
            1 => Ok(Winner::Participant1),
            2 => Ok(Winner::Participant2),
            other => Err(SharedError::validation(
                "winner",
                format!("Winner must be 0, 1 or 2, got {}", other),
            )),
        }
    }
}

impl From<Winner> for u8 {
    fn from(winner: Winner) -> Self {
        winner as u8
    }
}

/// One of the two participant slots of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSlot {
    Participant1,
    Participant2,
}

/// A knockout tournament
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct Tournament {
    /// Server-assigned id
    pub id: TournamentId,
    /// Display name
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Whether anonymous viewers may read the bracket
    pub public_access: bool,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every mutation
    pub updated: DateTime<Utc>,
}

/// A participant entered into a tournament
///
/// Participants never change once the bracket exists; matches refer to them
/// by id only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct Participant {
    pub id: ParticipantId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub team: Option<String>,
    /// Country code
    pub country_id: Option<String>,
}

/// A single match of the bracket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ssr", derive(sqlx::FromRow))]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Round index, 0 is the first round
    pub stage_number: i16,
    /// Position within the stage
    pub match_number: i16,
    /// First slot, `None` while undetermined or for a bye
    pub participant_1_id: Option<ParticipantId>,
    /// Second slot, `None` while undetermined or for a bye
    pub participant_2_id: Option<ParticipantId>,
    pub date: Option<DateTime<Utc>>,
    pub information: Option<String>,
    pub status: MatchStatus,
    pub winner: Winner,
    pub created: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every write to the match
    pub updated: DateTime<Utc>,
}

impl Match {
    /// Coordinates `(stage, match)` of the match this one feeds into
    ///
    /// The returned match does not exist when this match is the final.
    pub fn parent_coordinates(&self) -> (i16, i16) {
        (self.stage_number + 1, self.match_number / 2)
    }

    /// Slot of the parent match this match's winner advances into
    pub fn feeds_slot(&self) -> MatchSlot {
        if self.match_number % 2 == 0 {
            MatchSlot::Participant1
        } else {
            MatchSlot::Participant2
        }
    }

    /// Participant currently occupying `slot`
    pub fn participant(&self, slot: MatchSlot) -> Option<ParticipantId> {
        match slot {
            MatchSlot::Participant1 => self.participant_1_id,
            MatchSlot::Participant2 => self.participant_2_id,
        }
    }

    /// The participant that moves on, or `None` while no winner is recorded
    pub fn advancing_participant(&self) -> Option<ParticipantId> {
        match self.winner {
            Winner::Undetermined => None,
            Winner::Participant1 => self.participant_1_id,
            Winner::Participant2 => self.participant_2_id,
        }
    }
}

/// Group matches into stages ordered by stage then match number
pub fn group_by_stage(mut matches: Vec<Match>) -> Vec<Vec<Match>> {
    matches.sort_by_key(|m| (m.stage_number, m.match_number));

    let mut stages: Vec<Vec<Match>> = Vec::new();
    for m in matches {
        match stages.last_mut() {
            Some(stage) if stage[0].stage_number == m.stage_number => stage.push(m),
            _ => stages.push(vec![m]),
        }
    }
    stages
}
