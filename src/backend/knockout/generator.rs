/**
 * Bracket Generator
 *
 * Creates a tournament with its participants, admin link and complete match
 * tree. The whole bracket is planned and validated before the first write,
 * and every write goes through the caller's transaction, so a failure at any
 * step leaves nothing behind once the transaction is dropped.
 *
 * No event is broadcast on creation.
 */

use uuid::Uuid;

use super::guard::{self, Action};
use super::store::KnockoutStore;
use crate::backend::error::BackendError;
use crate::shared::knockout::{plan_bracket, CreateKnockoutRequest, CreatedKnockout, ParticipantId};

/// Validate fields that planning does not cover
fn validate_request(request: &CreateKnockoutRequest) -> Result<(), BackendError> {
    if request.name.trim().is_empty() {
        return Err(BackendError::validation("name", "Tournament name cannot be empty"));
    }
    if let Some(index) = request.participants.iter().position(|p| p.name.trim().is_empty()) {
        return Err(BackendError::validation(
            "participants",
            format!("Participant {} has an empty name", index),
        ));
    }
    Ok(())
}

/// Generate and persist a knockout bracket
///
/// Order of operations: action permission, validation and planning, then
/// tournament, participants, admin link and one insert per stage.
pub async fn create_knockout<S: KnockoutStore>(
    store: &mut S,
    user_id: Uuid,
    request: &CreateKnockoutRequest,
) -> Result<CreatedKnockout, BackendError> {
    guard::assert_action_permission(store, Action::CreateTournament, user_id).await?;

    validate_request(request)?;
    let plan = plan_bracket(request.participants.len(), request.lineups.as_deref())?;

    let tournament = store
        .insert_tournament(
            request.name.trim(),
            request.description.as_deref(),
            request.public_access,
        )
        .await?;

    let participants = store
        .insert_participants(tournament.id, &request.participants)
        .await?;
    if participants.len() != request.participants.len() {
        return Err(BackendError::handler(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Participant insert returned an unexpected row count",
        ));
    }

    store.link_admin(tournament.id, user_id).await?;

    let id_of = |index: Option<usize>| -> Option<ParticipantId> { index.map(|i| participants[i].id) };
    let mut matches = Vec::with_capacity(plan.len());
    for stage in &plan {
        let slots: Vec<_> = stage
            .matches
            .iter()
            .map(|m| (id_of(m.participant_1), id_of(m.participant_2)))
            .collect();
        matches.push(store.insert_stage(tournament.id, stage.stage_number, &slots).await?);
    }

    tracing::info!(
        "Created knockout tournament {} with {} participants in {} stages",
        tournament.id,
        participants.len(),
        matches.len()
    );

    Ok(CreatedKnockout {
        tournament,
        participants,
        matches,
    })
}
