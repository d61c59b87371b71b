//! Background tasks module
//!
//! The clock driver and auto-start scheduler that feed the engine, plus the
//! tasks that run alongside the HTTP server.

pub mod auto_start;
pub mod command_loop;
pub mod notifications;
pub mod ticker;

// Re-export main types and functions
pub use auto_start::{AutoStartScheduler, TokioScheduler};
pub use command_loop::command_loop_task;
pub use notifications::notification_task;
pub use ticker::{ClockDriver, TokioClock};
