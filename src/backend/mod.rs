//! Backend Module
//!
//! All server-side code: the Axum HTTP server, knockout bracket operations,
//! authentication and live updates. Only compiled with the `ssr` feature.
//!
//! - **`knockout`** - bracket generation, cascading match edits, guards, handlers
//! - **`auth`** - accounts, email verification, JWT cookie sessions
//! - **`middleware`** - session middleware and extractors
//! - **`realtime`** - per-tournament SSE channels
//! - **`mail`** - verification mail over SMTP
//! - **`server`** - configuration, state and initialization
//! - **`routes`** - router assembly
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Request flow
//!
//! A request passes CORS and tracing layers, then the auth middleware for
//! protected routes. Handlers open one database transaction, run a knockout
//! operation against it under the configured deadline, commit, and publish
//! live events only after the commit succeeded.

pub mod server;
pub mod routes;
pub mod knockout;
pub mod realtime;
pub mod error;
pub mod auth;
pub mod middleware;
pub mod mail;

pub use error::BackendError;
pub use server::create_app;
