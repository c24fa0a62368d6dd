//! Knockout Tournament Backend
//!
//! - **`store`** - `KnockoutStore` persistence trait and its PostgreSQL transaction
//! - **`guard`** - admin, action permission and optimistic concurrency checks
//! - **`generator`** - bracket creation
//! - **`advancement`** - match edits with cascading winner propagation
//! - **`tournaments`** - tournament reads, tournament edits and highlights
//! - **`handlers`** - HTTP handlers
//!
//! Operations are generic over `KnockoutStore` and receive the transaction
//! they write through, so callers decide when to commit.

pub mod store;
pub mod guard;
pub mod generator;
pub mod advancement;
pub mod tournaments;
pub mod handlers;

#[cfg(test)]
pub(crate) mod memory;

pub use advancement::apply_match_edit;
pub use generator::create_knockout;
pub use store::{KnockoutStore, PgKnockoutTx};
