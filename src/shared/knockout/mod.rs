//! Knockout Tournament Types
//!
//! Bracket model, bracket planning and the request/response bodies of the
//! knockout API. Nothing in here touches storage.

/// Tournaments, participants, matches
pub mod model;

/// Stage and match layout
pub mod plan;

/// API request and response bodies
pub mod requests;

pub use model::{
    group_by_stage, Match, MatchId, MatchSlot, MatchStatus, Participant, ParticipantId, Tournament,
    TournamentId, Winner,
};
pub use plan::{plan_bracket, stage_sizes, Lineup, PlannedMatch, StagePlan};
pub use requests::{
    CreateKnockoutRequest, CreatedKnockout, EditMatchRequest, EditTournamentRequest, MatchEdit,
    MatchEditResult, MatchHighlight, NewParticipant, TournamentDetail, TournamentSummary,
    TournamentView,
};
