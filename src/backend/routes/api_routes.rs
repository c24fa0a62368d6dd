/**
 * API Route Handlers
 *
 * Splits the API into routes open to anyone and routes that need a
 * session. `router::create_router` puts the auth middleware in front of
 * the protected set only.
 *
 * ## Public
 * - `GET /api/ping`
 * - `POST /api/auth/sign-up`
 * - `POST /api/auth/user-verification`
 * - `POST /api/auth/login`
 * - `GET /api/knockout-tournament/{id}` (private tournaments check the session)
 * - `GET /api/knockout-tournament/{id}/live`
 *
 * ## Protected
 * - `POST /api/auth/logout`
 * - `GET /api/auth/me`
 * - `POST /api/knockout-create`
 * - `PUT /api/knockout-edit-match/{id}`
 * - `PUT /api/knockout-edit-tournament/{id}`
 * - `POST /api/knockout-tournament/{id}/broadcast/{stage_index}/{match_index}`
 * - `GET /api/tournaments-user`
 */

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::{get_me, login, logout, signup, verify_user};
use crate::backend::knockout::handlers::{
    broadcast_match, create_tournament, edit_match, edit_tournament, get_tournament, user_tournaments,
};
use crate::backend::realtime::handle_tournament_subscription;
use crate::backend::server::state::AppState;

async fn ping() -> &'static str {
    "pong"
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/auth/sign-up", post(signup))
        .route("/api/auth/user-verification", post(verify_user))
        .route("/api/auth/login", post(login))
        .route("/api/knockout-tournament/{id}", get(get_tournament))
        .route("/api/knockout-tournament/{id}/live", get(handle_tournament_subscription))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(get_me))
        .route("/api/knockout-create", post(create_tournament))
        .route("/api/knockout-edit-match/{id}", put(edit_match))
        .route("/api/knockout-edit-tournament/{id}", put(edit_tournament))
        .route(
            "/api/knockout-tournament/{id}/broadcast/{stage_index}/{match_index}",
            post(broadcast_match),
        )
        .route("/api/tournaments-user", get(user_tournaments))
}
