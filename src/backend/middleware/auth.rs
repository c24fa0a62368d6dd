/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. It reads the session JWT from the `token` cookie
 * (or an `Authorization: Bearer` header), verifies it and attaches the
 * user to the request extensions.
 *
 * Routes readable without a session use `MaybeAuthUser` instead, which
 * decodes the token when one is present and never rejects.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::cookies::token_from_headers;
use crate::backend::auth::sessions::{verify_token, SessionConfig};
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: Option<String>,
}

fn authenticate(session: &SessionConfig, headers: &axum::http::HeaderMap) -> Result<AuthenticatedUser, BackendError> {
    let token = token_from_headers(headers).ok_or_else(|| {
        tracing::warn!("Missing session token");
        BackendError::unauthorized("Login required")
    })?;

    let claims = verify_token(session, &token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid or expired session")
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Invalid or expired session")
    })?;

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
        username: claims.username,
    })
}

/// Authentication middleware
///
/// 1. Extracts the session token
/// 2. Verifies it and parses the user ID
/// 3. Checks the user still exists when a database is configured
/// 4. Attaches `AuthenticatedUser` to the request extensions
///
/// Rejects with 401 when any step fails.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user = authenticate(&app_state.config.session, request.headers())?;

    if let Some(pool) = &app_state.db_pool {
        if get_user_by_id(pool, user.user_id).await?.is_none() {
            tracing::warn!("User from token not found in database: {}", user.user_id);
            return Err(BackendError::unauthorized("Invalid or expired session"));
        }
    }

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Axum extractor for the user attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Login required")
            })?;

        Ok(AuthUser(user))
    }
}

/// Session user if the request carries a valid token
#[derive(Clone, Debug)]
pub struct MaybeAuthUser(pub Option<AuthenticatedUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(MaybeAuthUser(Some(user.clone())));
        }
        Ok(MaybeAuthUser(authenticate(&state.config.session, &parts.headers).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::sessions::create_token;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
    use assert_matches::assert_matches;

    fn session() -> SessionConfig {
        SessionConfig {
            secret: "middleware-secret".to_string(),
            ttl: chrono::Duration::hours(1),
        }
    }

    #[test]
    fn test_authenticate_from_cookie() {
        let user_id = Uuid::new_v4();
        let token = create_token(&session(), user_id, "org@example.com", "organizer").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("token={}", token)).unwrap());

        let user = authenticate(&session(), &headers).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username.as_deref(), Some("organizer"));
    }

    #[test]
    fn test_authenticate_rejects_missing_and_invalid() {
        assert_matches!(
            authenticate(&session(), &HeaderMap::new()),
            Err(BackendError::Unauthorized { .. })
        );

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=not.a.jwt"));
        assert_matches!(
            authenticate(&session(), &headers),
            Err(BackendError::Unauthorized { .. })
        );
    }
}
