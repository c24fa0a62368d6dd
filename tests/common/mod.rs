//! Common test utilities and helpers

pub mod database;

pub use database::*;
