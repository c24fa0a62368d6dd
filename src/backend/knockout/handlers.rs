/**
 * Knockout HTTP Handlers
 *
 * Thin axum wrappers around the knockout operations. Each handler opens
 * one transaction, runs the operation under the configured deadline and
 * commits; every error path drops the transaction, which rolls it back.
 * Live events are published only after a successful commit.
 */

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::advancement::apply_match_edit;
use super::generator::create_knockout;
use super::store::{KnockoutStore, PgKnockoutTx};
use super::tournaments::{apply_tournament_edit, list_user_tournaments, load_tournament_view, validate_highlight};
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, MaybeAuthUser};
use crate::backend::server::state::AppState;
use crate::shared::knockout::{
    CreateKnockoutRequest, CreatedKnockout, EditMatchRequest, EditTournamentRequest, MatchEditResult,
    MatchHighlight, MatchId, Tournament, TournamentId, TournamentSummary, TournamentView,
};
use crate::shared::RealtimeEvent;

/// Run `operation`, failing with `DeadlineExceeded` once `limit` elapses
///
/// The operation future is dropped on expiry together with any transaction
/// it owns.
pub async fn with_deadline<T, F>(limit: Duration, operation: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Operation exceeded its deadline of {:?}", limit);
            Err(BackendError::DeadlineExceeded)
        }
    }
}

/// Apply a match edit and build its `tournament-update` event
///
/// The event is built before the caller commits, so a committed edit never
/// fails afterwards.
async fn edit_with_event<S: KnockoutStore>(
    store: &mut S,
    match_id: MatchId,
    request: &EditMatchRequest,
    user_id: uuid::Uuid,
) -> Result<(MatchEditResult, RealtimeEvent), BackendError> {
    let result = apply_match_edit(store, match_id, &request.edit, request.updated, user_id).await?;
    let event = RealtimeEvent::tournament_update(&result)?;
    Ok((result, event))
}

/// POST /api/knockout-create
pub async fn create_tournament(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateKnockoutRequest>,
) -> Result<(StatusCode, Json<CreatedKnockout>), BackendError> {
    let pool = state.pool()?;
    tracing::info!(
        "Create knockout request from {} with {} participants",
        user.user_id,
        request.participants.len()
    );

    let created = with_deadline(state.config.operation_timeout, async {
        let mut tx = PgKnockoutTx::begin(pool).await?;
        let created = create_knockout(&mut tx, user.user_id, &request).await?;
        tx.commit().await?;
        Ok::<_, BackendError>(created)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/knockout-tournament/{id}
pub async fn get_tournament(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<TournamentView>, BackendError> {
    let pool = state.pool()?;

    let mut tx = PgKnockoutTx::begin(pool).await?;
    let view = load_tournament_view(&mut tx, tournament_id, viewer.user_id()).await?;
    tx.commit().await?;

    Ok(Json(view))
}

/// PUT /api/knockout-edit-match/{id}
pub async fn edit_match(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(match_id): Path<MatchId>,
    Json(request): Json<EditMatchRequest>,
) -> Result<Json<MatchEditResult>, BackendError> {
    let pool = state.pool()?;
    tracing::info!("Edit match {} requested by {}", match_id, user.user_id);

    let (result, event) = with_deadline(state.config.operation_timeout, async {
        let mut tx = PgKnockoutTx::begin(pool).await?;
        let edited = edit_with_event(&mut tx, match_id, &request, user.user_id).await?;
        tx.commit().await?;
        Ok::<_, BackendError>(edited)
    })
    .await?;

    state.channels.publish(result.tournament_id, event);

    Ok(Json(result))
}

/// PUT /api/knockout-edit-tournament/{id}
pub async fn edit_tournament(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<EditTournamentRequest>,
) -> Result<Json<Tournament>, BackendError> {
    let pool = state.pool()?;

    let tournament = with_deadline(state.config.operation_timeout, async {
        let mut tx = PgKnockoutTx::begin(pool).await?;
        let tournament = apply_tournament_edit(&mut tx, tournament_id, &request, user.user_id).await?;
        tx.commit().await?;
        Ok::<_, BackendError>(tournament)
    })
    .await?;

    Ok(Json(tournament))
}

/// GET /api/tournaments-user
pub async fn user_tournaments(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<TournamentSummary>>, BackendError> {
    let pool = state.pool()?;

    let mut tx = PgKnockoutTx::begin(pool).await?;
    let tournaments = list_user_tournaments(&mut tx, user.user_id).await?;
    tx.commit().await?;

    Ok(Json(tournaments))
}

/// POST /api/knockout-tournament/{id}/broadcast/{stage_index}/{match_index}
pub async fn broadcast_match(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((tournament_id, stage_index, match_index)): Path<(TournamentId, i16, i16)>,
) -> Result<StatusCode, BackendError> {
    let pool = state.pool()?;
    let highlight = MatchHighlight {
        stage_index,
        match_index,
    };

    let event = RealtimeEvent::broadcast_match(highlight)?;

    let mut tx = PgKnockoutTx::begin(pool).await?;
    validate_highlight(&mut tx, tournament_id, highlight, user.user_id).await?;
    tx.commit().await?;

    let delivered = state.channels.publish(tournament_id, event);
    tracing::debug!(
        "Highlight of match {}/{} in tournament {} reached {} viewers",
        stage_index,
        match_index,
        tournament_id,
        delivered
    );

    Ok(StatusCode::NO_CONTENT)
}
