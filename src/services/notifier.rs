//! Notification sink used by the session engine

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::state::AlarmSound;

/// Something the user should see or hear
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    Message { text: String },
    Alert { sound: AlarmSound },
}

/// Fire-and-forget sink for messages and alert sounds.
///
/// Implementations must not fail towards the caller; delivery problems are
/// logged and swallowed.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
    fn alert(&self, sound: AlarmSound);
}

/// Publishes notifications on a broadcast channel drained by the
/// notification task
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: broadcast::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(tx: broadcast::Sender<Notification>) -> Self {
        Self { tx }
    }

    fn publish(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            debug!("Notification dropped, no listeners: {:?}", e.0);
        }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str) {
        self.publish(Notification::Message {
            text: message.to_string(),
        });
    }

    fn alert(&self, sound: AlarmSound) {
        self.publish(Notification::Alert { sound });
    }
}
