//! POST /api/auth/logout
//!
//! Tokens are stateless, so logging out only expires the session cookie.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
};

use crate::backend::auth::cookies::clear_session_cookie;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<(StatusCode, HeaderMap), BackendError> {
    let cookie = clear_session_cookie(&state.config.cookie).map_err(|e| {
        tracing::error!("Failed to build logout cookie: {:?}", e);
        BackendError::internal()
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    tracing::info!("User logged out: {}", user.user_id);
    Ok((StatusCode::NO_CONTENT, headers))
}
