//! Shared Types Module
//!
//! Types used by both the bracket logic and the HTTP layer: the knockout
//! model, live event payloads and shared error types.
//!
//! Everything here compiles without the `ssr` feature.

/// Knockout bracket model, planning and API bodies
pub mod knockout;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use event::{RealtimeEvent, EventType};
pub use error::SharedError;
