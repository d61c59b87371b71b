//! External collaborator services
//!
//! The notification sink the engine reports to, and the alert player the
//! notification task drives.

pub mod alarm;
pub mod notifier;

// Re-export main types
pub use alarm::play_alarm;
pub use notifier::{ChannelNotifier, Notification, Notifier};
