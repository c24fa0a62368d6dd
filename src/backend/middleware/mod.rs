//! Middleware Module
//!
//! - **`auth`** - session middleware for protected routes and the
//!   `AuthUser` / `MaybeAuthUser` extractors

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser, MaybeAuthUser};
