/**
 * Permission and Consistency Guard
 *
 * Read-only checks run before any knockout write:
 * - tournament admin membership (`tournaments_users`)
 * - action permission granted through a role (`users_roles` / `roles_actions`)
 * - optimistic concurrency token comparison
 * - read access for public and private tournaments
 *
 * None of these retry.
 */

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::KnockoutStore;
use crate::backend::error::BackendError;
use crate::shared::knockout::{Tournament, TournamentId};

/// Actions granted through roles, ids match the `actions` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateTournament = 1,
}

impl Action {
    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Fail with a permission error unless `user_id` administers the tournament
pub async fn assert_tournament_admin<S: KnockoutStore>(
    store: &mut S,
    tournament_id: TournamentId,
    user_id: Uuid,
) -> Result<(), BackendError> {
    if store.is_tournament_admin(tournament_id, user_id).await? {
        Ok(())
    } else {
        tracing::warn!("User {} is not an admin of tournament {}", user_id, tournament_id);
        Err(BackendError::permission("You do not administer this tournament"))
    }
}

/// Fail with a permission error unless a role of `user_id` grants `action`
pub async fn assert_action_permission<S: KnockoutStore>(
    store: &mut S,
    action: Action,
    user_id: Uuid,
) -> Result<(), BackendError> {
    if store.has_action(user_id, action.id()).await? {
        Ok(())
    } else {
        tracing::warn!("User {} lacks permission for {:?}", user_id, action);
        Err(BackendError::permission("You are not allowed to perform this action"))
    }
}

/// Fail with a conflict unless the stored token equals the one the caller saw
pub fn assert_fresh(
    what: &str,
    stored: DateTime<Utc>,
    expected: DateTime<Utc>,
) -> Result<(), BackendError> {
    if stored == expected {
        Ok(())
    } else {
        tracing::info!("Stale {} edit: stored {} but caller saw {}", what, stored, expected);
        Err(BackendError::conflict(format!(
            "The {} was modified by someone else, reload and try again",
            what
        )))
    }
}

/// Decide whether `viewer` may read `tournament`
///
/// Returns whether the viewer administers it. Public tournaments are readable
/// by anyone; private ones only by their admins.
pub async fn authorize_viewer<S: KnockoutStore>(
    store: &mut S,
    tournament: &Tournament,
    viewer: Option<Uuid>,
) -> Result<bool, BackendError> {
    let is_admin = match viewer {
        Some(user_id) => store.is_tournament_admin(tournament.id, user_id).await?,
        None => false,
    };

    if tournament.public_access || is_admin {
        return Ok(is_admin);
    }

    match viewer {
        None => Err(BackendError::unauthorized("Login required to view this tournament")),
        Some(_) => Err(BackendError::permission("This tournament is private")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::knockout::memory::MemoryStore;
    use assert_matches::assert_matches;
    use chrono::Duration;

    #[tokio::test]
    async fn test_admin_check() {
        let store = MemoryStore::new();
        let mut tx = store.begin();
        let admin = Uuid::new_v4();
        let tournament = tx.insert_tournament("Cup", None, false).await.unwrap();
        tx.link_admin(tournament.id, admin).await.unwrap();

        assert!(assert_tournament_admin(&mut tx, tournament.id, admin).await.is_ok());
        assert_matches!(
            assert_tournament_admin(&mut tx, tournament.id, Uuid::new_v4()).await,
            Err(BackendError::Permission { .. })
        );
    }

    #[tokio::test]
    async fn test_action_permission() {
        let mut store = MemoryStore::new();
        let organizer = Uuid::new_v4();
        store.grant(organizer, Action::CreateTournament.id());
        let mut tx = store.begin();

        assert!(assert_action_permission(&mut tx, Action::CreateTournament, organizer).await.is_ok());
        assert_matches!(
            assert_action_permission(&mut tx, Action::CreateTournament, Uuid::new_v4()).await,
            Err(BackendError::Permission { .. })
        );
    }

    #[test]
    fn test_assert_fresh() {
        let now = Utc::now();
        assert!(assert_fresh("match", now, now).is_ok());
        assert_matches!(
            assert_fresh("match", now, now - Duration::seconds(1)),
            Err(BackendError::Conflict { .. })
        );
    }

    #[tokio::test]
    async fn test_viewer_rules() {
        let store = MemoryStore::new();
        let mut tx = store.begin();
        let admin = Uuid::new_v4();
        let private = tx.insert_tournament("Private", None, false).await.unwrap();
        let public = tx.insert_tournament("Public", None, true).await.unwrap();
        tx.link_admin(private.id, admin).await.unwrap();

        assert_eq!(authorize_viewer(&mut tx, &public, None).await.unwrap(), false);
        assert_eq!(authorize_viewer(&mut tx, &private, Some(admin)).await.unwrap(), true);
        assert_matches!(
            authorize_viewer(&mut tx, &private, None).await,
            Err(BackendError::Unauthorized { .. })
        );
        assert_matches!(
            authorize_viewer(&mut tx, &private, Some(Uuid::new_v4())).await,
            Err(BackendError::Permission { .. })
        );
    }
}
