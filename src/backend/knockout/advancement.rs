/**
 * Advancement Engine
 *
 * Applies an admin's edit to one match and carries the result forward
 * through the bracket.
 *
 * # Cascade
 *
 * Starting from the edited match, each step looks up the parent at
 * `(stage + 1, match_number / 2)`. If it exists, the slot fed by the current
 * match (first slot for even match numbers, second for odd) receives the
 * current match's advancing participant. A current winner of 0 writes `None`
 * and also resets the parent's winner, so clearing a result clears every
 * result that depended on it. The step then continues from the parent as
 * stored after the write, until there is no parent (the final was reached).
 *
 * Every read and write happens in the caller's transaction; the tournament
 * row lock serializes concurrent edits of one bracket.
 */

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::guard;
use super::store::KnockoutStore;
use crate::backend::error::BackendError;
use crate::shared::knockout::{Match, MatchEdit, MatchEditResult, MatchId, Winner};

/// Apply `edit` to a match and cascade the outcome
///
/// Returns every written match, the edited one first and then the cascaded
/// ones in propagation order. A stale `expected_updated` fails with a
/// conflict before anything is written.
pub async fn apply_match_edit<S: KnockoutStore>(
    store: &mut S,
    match_id: MatchId,
    edit: &MatchEdit,
    expected_updated: DateTime<Utc>,
    user_id: Uuid,
) -> Result<MatchEditResult, BackendError> {
    let target = store
        .find_match(match_id)
        .await?
        .ok_or_else(|| BackendError::not_found(format!("Match {} not found", match_id)))?;
    let tournament_id = target.tournament_id;

    guard::assert_tournament_admin(store, tournament_id, user_id).await?;

    store
        .lock_tournament(tournament_id)
        .await?
        .ok_or_else(|| BackendError::not_found(format!("Tournament {} not found", tournament_id)))?;

    // Re-read under the lock; an edit may have committed since the first read
    let current = store
        .find_match(match_id)
        .await?
        .ok_or_else(|| BackendError::not_found(format!("Match {} not found", match_id)))?;
    guard::assert_fresh("match", current.updated, expected_updated)?;

    let overrides = [edit.participant_1_id, edit.participant_2_id];
    for participant_id in overrides.into_iter().flatten().flatten() {
        if !store.participant_in_tournament(tournament_id, participant_id).await? {
            return Err(BackendError::validation(
                "participant",
                format!("Participant {} is not part of tournament {}", participant_id, tournament_id),
            ));
        }
    }

    let edited = store.update_match(&edit.applied_to(&current)).await?;
    let mutated_matches = cascade(store, edited).await?;
    store.touch_tournament(tournament_id).await?;

    tracing::info!(
        "Match {} of tournament {} edited, {} matches written",
        match_id,
        tournament_id,
        mutated_matches.len()
    );

    Ok(MatchEditResult {
        tournament_id,
        mutated_matches,
    })
}

/// Propagate `edited` towards the final, returning every written match
async fn cascade<S: KnockoutStore>(store: &mut S, edited: Match) -> Result<Vec<Match>, BackendError> {
    let mut mutated = vec![edited.clone()];
    let mut current = edited;

    loop {
        let (stage_number, match_number) = current.parent_coordinates();
        let Some(parent) = store
            .match_at(current.tournament_id, stage_number, match_number)
            .await?
        else {
            break;
        };

        let reset_winner = current.winner == Winner::Undetermined;
        let written = store
            .write_slot(parent.id, current.feeds_slot(), current.advancing_participant(), reset_winner)
            .await?;

        tracing::debug!(
            "Cascaded match {} into match {} ({:?})",
            current.id,
            written.id,
            current.feeds_slot()
        );

        mutated.push(written.clone());
        current = written;
    }

    Ok(mutated)
}
