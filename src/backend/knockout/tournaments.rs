//! Tournament reads and tournament-level edits
//!
//! Loading a bracket for display, editing tournament details under the same
//! optimistic concurrency rule as match edits, listing a user's tournaments
//! and checking a match highlight before it is broadcast.

use uuid::Uuid;

use super::guard;
use super::store::KnockoutStore;
use crate::backend::error::BackendError;
use crate::shared::knockout::{
    group_by_stage, EditTournamentRequest, MatchHighlight, Tournament, TournamentDetail, TournamentId,
    TournamentSummary, TournamentView,
};

async fn require_tournament<S: KnockoutStore>(
    store: &mut S,
    tournament_id: TournamentId,
) -> Result<Tournament, BackendError> {
    store
        .find_tournament(tournament_id)
        .await?
        .ok_or_else(|| BackendError::not_found(format!("Tournament {} not found", tournament_id)))
}

/// Load the full bracket if `viewer` may see it
pub async fn load_tournament_view<S: KnockoutStore>(
    store: &mut S,
    tournament_id: TournamentId,
    viewer: Option<Uuid>,
) -> Result<TournamentView, BackendError> {
    let tournament = require_tournament(store, tournament_id).await?;
    let edit_permission = guard::authorize_viewer(store, &tournament, viewer).await?;

    let participants = store.tournament_participants(tournament_id).await?;
    let matches = group_by_stage(store.tournament_matches(tournament_id).await?);

    Ok(TournamentView {
        edit_permission,
        tournament: TournamentDetail {
            tournament,
            participants,
            matches,
        },
    })
}

/// Check that `viewer` may follow the live channel of a tournament
pub async fn authorize_subscription<S: KnockoutStore>(
    store: &mut S,
    tournament_id: TournamentId,
    viewer: Option<Uuid>,
) -> Result<(), BackendError> {
    let tournament = require_tournament(store, tournament_id).await?;
    guard::authorize_viewer(store, &tournament, viewer).await?;
    Ok(())
}

/// Change name, description or visibility of a tournament
pub async fn apply_tournament_edit<S: KnockoutStore>(
    store: &mut S,
    tournament_id: TournamentId,
    request: &EditTournamentRequest,
    user_id: Uuid,
) -> Result<Tournament, BackendError> {
    require_tournament(store, tournament_id).await?;
    guard::assert_tournament_admin(store, tournament_id, user_id).await?;

    let current = store
        .lock_tournament(tournament_id)
        .await?
        .ok_or_else(|| BackendError::not_found(format!("Tournament {} not found", tournament_id)))?;
    guard::assert_fresh("tournament", current.updated, request.updated)?;

    let name = match &request.name {
        Some(name) if name.trim().is_empty() => {
            return Err(BackendError::validation("name", "Tournament name cannot be empty"));
        }
        Some(name) => name.trim().to_string(),
        None => current.name.clone(),
    };
    let description = match &request.description {
        Some(description) => description.clone(),
        None => current.description.clone(),
    };
    let public_access = request.public_access.unwrap_or(current.public_access);

    let updated = store
        .update_tournament(tournament_id, &name, description.as_deref(), public_access)
        .await?;
    tracing::info!("Tournament {} updated", tournament_id);
    Ok(updated)
}

pub async fn list_user_tournaments<S: KnockoutStore>(
    store: &mut S,
    user_id: Uuid,
) -> Result<Vec<TournamentSummary>, BackendError> {
    Ok(store.tournaments_for_user(user_id).await?)
}

/// Admin check plus existence of the highlighted match
pub async fn validate_highlight<S: KnockoutStore>(
    store: &mut S,
    tournament_id: TournamentId,
    highlight: MatchHighlight,
    user_id: Uuid,
) -> Result<(), BackendError> {
    require_tournament(store, tournament_id).await?;
    guard::assert_tournament_admin(store, tournament_id, user_id).await?;

    store
        .match_at(tournament_id, highlight.stage_index, highlight.match_index)
        .await?
        .map(|_| ())
        .ok_or_else(|| {
            BackendError::not_found(format!(
                "No match {} in stage {}",
                highlight.match_index, highlight.stage_index
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::knockout::generator::create_knockout;
    use crate::backend::knockout::guard::Action;
    use crate::backend::knockout::memory::MemoryStore;
    use crate::shared::knockout::{CreateKnockoutRequest, NewParticipant};
    use assert_matches::assert_matches;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    async fn seeded(public_access: bool) -> (MemoryStore, Uuid, TournamentId) {
        let mut store = MemoryStore::new();
        let admin = Uuid::new_v4();
        store.grant(admin, Action::CreateTournament.id());
        let request = CreateKnockoutRequest {
            name: "League Finals".to_string(),
            description: None,
            public_access,
            participants: ["A", "B", "C"]
                .iter()
                .map(|name| NewParticipant {
                    name: name.to_string(),
                    team: Some("Club".to_string()),
                    country_id: None,
                })
                .collect(),
            lineups: None,
        };
        let mut tx = store.begin();
        let created = create_knockout(&mut tx, admin, &request).await.unwrap();
        store.commit(tx);
        (store, admin, created.tournament.id)
    }

    #[tokio::test]
    async fn test_public_view_for_anonymous() {
        let (store, _, id) = seeded(true).await;
        let mut tx = store.begin();

        let view = load_tournament_view(&mut tx, id, None).await.unwrap();

        assert!(!view.edit_permission);
        assert_eq!(view.tournament.participants.len(), 3);
        let sizes: Vec<_> = view.tournament.matches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_private_view_rules() {
        let (store, admin, id) = seeded(false).await;
        let mut tx = store.begin();

        assert!(load_tournament_view(&mut tx, id, Some(admin)).await.unwrap().edit_permission);
        assert_matches!(
            load_tournament_view(&mut tx, id, None).await,
            Err(BackendError::Unauthorized { .. })
        );
        assert_matches!(
            load_tournament_view(&mut tx, id, Some(Uuid::new_v4())).await,
            Err(BackendError::Permission { .. })
        );
        assert_matches!(
            load_tournament_view(&mut tx, id + 100, None).await,
            Err(BackendError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_edit_tournament() {
        let (mut store, admin, id) = seeded(false).await;
        let current = store.data().tournaments[&id].clone();
        let mut tx = store.begin();
        let request = EditTournamentRequest {
            name: Some("  Renamed ".to_string()),
            description: Some(Some("Now public".to_string())),
            public_access: Some(true),
            updated: current.updated,
        };

        let updated = apply_tournament_edit(&mut tx, id, &request, admin).await.unwrap();
        store.commit(tx);

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("Now public"));
        assert!(updated.public_access);
        assert!(updated.updated > current.updated);
    }

    #[tokio::test]
    async fn test_edit_tournament_conflict() {
        let (store, admin, id) = seeded(false).await;
        let current = store.data().tournaments[&id].clone();
        let mut tx = store.begin();
        let request = EditTournamentRequest {
            name: Some("Renamed".to_string()),
            updated: current.updated - Duration::milliseconds(1),
            ..EditTournamentRequest::default()
        };

        assert_matches!(
            apply_tournament_edit(&mut tx, id, &request, admin).await,
            Err(BackendError::Conflict { .. })
        );
        assert_eq!(tx.writes, 0);
    }

    #[tokio::test]
    async fn test_edit_tournament_empty_name() {
        let (store, admin, id) = seeded(false).await;
        let current = store.data().tournaments[&id].clone();
        let mut tx = store.begin();
        let request = EditTournamentRequest {
            name: Some("   ".to_string()),
            updated: current.updated,
            ..EditTournamentRequest::default()
        };

        assert_matches!(
            apply_tournament_edit(&mut tx, id, &request, admin).await,
            Err(BackendError::SharedError(_))
        );
    }

    #[tokio::test]
    async fn test_list_user_tournaments() {
        let (store, admin, id) = seeded(true).await;
        let mut tx = store.begin();

        let summaries = list_user_tournaments(&mut tx, admin).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, id);
        assert_eq!(summaries[0].participants, 3);
        assert!(list_user_tournaments(&mut tx, Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_highlight() {
        let (store, admin, id) = seeded(true).await;
        let mut tx = store.begin();

        let existing = MatchHighlight { stage_index: 1, match_index: 0 };
        let missing = MatchHighlight { stage_index: 4, match_index: 0 };
        assert!(validate_highlight(&mut tx, id, existing, admin).await.is_ok());
        assert_matches!(
            validate_highlight(&mut tx, id, missing, admin).await,
            Err(BackendError::NotFound { .. })
        );
        assert_matches!(
            validate_highlight(&mut tx, id, existing, Uuid::new_v4()).await,
            Err(BackendError::Permission { .. })
        );
    }
}
