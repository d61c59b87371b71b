//! Utility functions module
//!
//! Signal handling and the time/countdown display helpers shared by the
//! engine and the HTTP layer.

pub mod signals;
pub mod time_format;

// Re-export main functions
pub use signals::shutdown_signal;
pub use time_format::{canonical_time, display_time, format_countdown};
