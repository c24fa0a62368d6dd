//! Knockout Hub - Main Library
//!
//! Backend for single-elimination tournaments: bracket generation, match
//! edits that cascade winners through the bracket, admin permissions with
//! optimistic concurrency, JWT cookie authentication and live updates over
//! Server-Sent Events.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared with clients
//!   - Tournament, participant and match models
//!   - Bracket planning (stage sizes, lineups)
//!   - Request/response bodies, realtime events, error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, PostgreSQL persistence via sqlx
//!   - Authentication, email verification
//!   - Per-tournament live event channels
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and the
//!   `knockout-server` binary

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
