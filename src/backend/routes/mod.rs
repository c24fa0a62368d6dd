//! Route Configuration Module
//!
//! - **`router`** - router assembly, middleware layers, fallback
//! - **`api_routes`** - public and session-protected API routes
//!
//! # Route Organization
//!
//! 1. **Public Routes** - ping, sign-up, verification, login, tournament
//!    reads and live subscriptions
//! 2. **Protected Routes** - everything behind `auth_middleware`
//! 3. **Fallback Handler** - JSON 404
//!
//! Tournament reads are public routes; private tournaments are filtered by
//! the handler, which sees the session through `MaybeAuthUser`.

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;
