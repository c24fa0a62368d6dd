/**
 * Get Current User Handler
 *
 * GET /api/auth/me returns the account behind the current session. The
 * session itself is checked by the auth middleware.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    let pool = state.pool()?;

    let user = get_user_by_id(pool, session.user_id).await?.ok_or_else(|| {
        tracing::warn!("User from session not found: {}", session.user_id);
        BackendError::not_found("User not found")
    })?;

    Ok(Json(UserResponse::from(user)))
}
