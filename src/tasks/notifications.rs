//! Background task delivering engine notifications

use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{info, warn};

use crate::{
    services::{play_alarm, Notification},
    state::AppState,
};

/// Log messages, remember the latest one, and play alerts.
///
/// Alert playback is spawned so a slow player never holds up messages.
/// Failures are logged and never reach the engine.
pub async fn notification_task(
    state: Arc<AppState>,
    mut rx: Receiver<Notification>,
    alarm_player: Option<String>,
) {
    info!("Starting notification task");

    let player: Option<Arc<str>> = alarm_player.map(Arc::from);

    loop {
        match rx.recv().await {
            Ok(Notification::Message { text }) => {
                info!("🍅 {}", text);
                state.record_message(&text);
            }
            Ok(Notification::Alert { sound }) => {
                let player = player.clone();
                tokio::spawn(async move {
                    if let Err(e) = play_alarm(player.as_deref(), sound).await {
                        warn!("Could not play alert sound: {}", e);
                    }
                });
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Notification task lagged, skipped {} notifications", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Notification channel closed");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::{ChannelNotifier, Notifier},
        state::Settings,
        testing::Harness,
    };
    use std::time::Duration;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn records_latest_message() {
        let harness = Harness::new(Settings::default());
        let (tx, rx) = broadcast::channel(16);
        let state = Arc::new(AppState::new(
            harness.machine,
            tx.clone(),
            25250,
            "127.0.0.1".to_string(),
        ));

        let notifier = ChannelNotifier::new(tx);
        notifier.notify("Well done! Take a 5-minute short break.");
        notifier.notify("Break started automatically!");

        let task = tokio::spawn(notification_task(Arc::clone(&state), rx, None));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            state.get_last_message().as_deref(),
            Some("Break started automatically!")
        );
        task.abort();
    }
}
