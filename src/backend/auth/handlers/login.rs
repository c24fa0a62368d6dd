/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * # Authentication Process
 *
 * 1. Look up user by username, or by email when the value contains '@'
 * 2. Verify password using bcrypt
 * 3. Refuse accounts that are not verified yet
 * 4. Issue a JWT, set it as the `token` cookie and return it with the user
 *
 * Unknown users and wrong passwords get the same 401.
 */

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::Json,
};
use bcrypt::verify;

use crate::backend::auth::cookies::session_cookie;
use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), BackendError> {
    let pool = state.pool()?;
    tracing::info!("Login request for: {}", request.username);

    let user = if request.username.contains('@') {
        get_user_by_email(pool, &request.username).await?
    } else {
        get_user_by_username(pool, &request.username).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User not found: {}", request.username);
        BackendError::unauthorized("Invalid credentials")
    })?;

    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("Password verification error: {:?}", e);
        BackendError::internal()
    })?;

    if !valid {
        tracing::warn!("Invalid password for user: {}", request.username);
        return Err(BackendError::unauthorized("Invalid credentials"));
    }

    if !user.verified {
        tracing::warn!("Login attempt for unverified user: {}", user.username);
        return Err(BackendError::permission("Account is not verified yet"));
    }

    let session = &state.config.session;
    let token = create_token(session, user.id, &user.email, &user.username).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        BackendError::internal()
    })?;

    let cookie = session_cookie(&state.config.cookie, &token, session.ttl).map_err(|e| {
        tracing::error!("Failed to build session cookie: {:?}", e);
        BackendError::internal()
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    tracing::info!("User logged in successfully: {} ({})", user.username, user.email);

    Ok((
        headers,
        Json(AuthResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}
