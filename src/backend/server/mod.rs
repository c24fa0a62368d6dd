//! Server Module
//!
//! - **`config`** - `ServerConfig` from the environment and database loading
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`init`** - app construction and background tasks

pub mod state;
pub mod config;
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::create_app;
pub use state::AppState;
