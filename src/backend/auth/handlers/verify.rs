/**
 * User Verification Handler
 *
 * POST /api/auth/user-verification with `{ "token": "..." }`. The token
 * comes from the link mailed at sign-up and can be redeemed once.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{UserResponse, VerificationRequest};
use crate::backend::auth::users::verify_user_by_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub async fn verify_user(
    State(state): State<AppState>,
    Json(request): Json<VerificationRequest>,
) -> Result<Json<UserResponse>, BackendError> {
    let pool = state.pool()?;

    let token = request.token.trim();
    if token.is_empty() {
        return Err(BackendError::validation("token", "Verification token is required"));
    }

    let user = verify_user_by_token(pool, token).await?.ok_or_else(|| {
        tracing::warn!("Unknown verification token");
        BackendError::not_found("Verification token is invalid or already used")
    })?;

    tracing::info!("User verified: {} ({})", user.username, user.email);
    Ok(Json(UserResponse::from(user)))
}
