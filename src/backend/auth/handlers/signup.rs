/**
 * Signup Handler
 *
 * POST /api/auth/sign-up
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Reject taken usernames and emails
 * 3. Hash password using bcrypt
 * 4. Create the unverified user with its verification token and role
 * 5. Mail the verification link
 *
 * The account cannot log in until the link has been followed. A mail
 * delivery failure is logged and does not undo the registration.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use bcrypt::hash;

use crate::backend::auth::handlers::types::{SignupRequest, UserResponse};
use crate::backend::auth::users::{create_user, get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::mail::verification_link;
use crate::backend::server::state::AppState;

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub(crate) fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn validate_signup(request: &SignupRequest) -> Result<(), BackendError> {
    if !is_valid_username(&request.username) {
        tracing::warn!("Invalid username format: {}", request.username);
        return Err(BackendError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if !request.email.contains('@') {
        tracing::warn!("Invalid email format: {}", request.email);
        return Err(BackendError::validation("email", "Invalid email format"));
    }

    if request.password.len() < 8 {
        tracing::warn!("Password too short");
        return Err(BackendError::validation("password", "Password must be at least 8 characters"));
    }

    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), BackendError> {
    let pool = state.pool()?;
    tracing::info!("Signup request for username: {}, email: {}", request.username, request.email);

    validate_signup(&request)?;

    if get_user_by_username(pool, &request.username).await?.is_some() {
        tracing::warn!("Username already exists: {}", request.username);
        return Err(BackendError::conflict("Username already taken"));
    }

    if get_user_by_email(pool, &request.email).await?.is_some() {
        tracing::warn!("Email already exists: {}", request.email);
        return Err(BackendError::conflict("Email already registered"));
    }

    let password_hash = hash(&request.password, state.config.bcrypt_cost).map_err(|e| {
        tracing::error!("Failed to hash password: {:?}", e);
        BackendError::internal()
    })?;

    let registration = create_user(pool, &request.username, &request.email, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BackendError::conflict("Username or email already registered")
            } else {
                BackendError::from(e)
            }
        })?;
    let user = registration.user;

    let link = verification_link(&state.config.app_origin, &registration.verification_token);
    if let Err(e) = state.mailer.send_verification(&user.username, &user.email, &link).await {
        tracing::error!("Failed to send verification mail to {}: {}", user.email, e);
    }

    tracing::info!("User created successfully: {} ({})", user.username, user.email);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
