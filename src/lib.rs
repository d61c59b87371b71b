//! Pomodoro Server - a local Pomodoro session daemon
//!
//! This library provides the focus/break session engine, the persistent
//! statistics and history ledger, and the HTTP API that drives them.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod store;
pub mod tasks;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
