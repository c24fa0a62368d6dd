/**
 * Router Configuration
 *
 * Assembles the public and protected API routes into one router:
 * 1. Protected routes behind `auth_middleware`
 * 2. Public routes
 * 3. JSON 404 fallback
 * 4. CORS for the configured front-end origin and HTTP tracing
 */

use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::{protected_routes, public_routes};
use crate::backend::server::state::AppState;

fn cors_layer(app_state: &AppState) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(app_state.config.allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = protected_routes().route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    Router::new()
        .merge(protected)
        .merge(public_routes())
        .fallback(|| async { BackendError::not_found("Route not found") })
        .layer(cors_layer(&app_state))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
