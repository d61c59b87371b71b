//! Background task feeding clock and auto-start commands into the engine

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::state::{AppState, Command};

/// Drain commands produced by the clock driver and auto-start scheduler.
///
/// Runs until every sender is gone.
pub async fn command_loop_task(state: Arc<AppState>, mut rx: mpsc::UnboundedReceiver<Command>) {
    info!("Starting command loop task");

    while let Some(command) = rx.recv().await {
        if let Err(e) = state.dispatch(command) {
            error!("Failed to dispatch {:?}: {}", command, e);
        }
    }

    info!("Command loop task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{state::Settings, testing::Harness};
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn dispatches_until_senders_close() {
        let harness = Harness::new(Settings::default());
        let (notification_tx, _) = broadcast::channel(16);
        let state = Arc::new(AppState::new(
            harness.machine,
            notification_tx,
            25250,
            "127.0.0.1".to_string(),
        ));
        state.dispatch(Command::Start).unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..3 {
            tx.send(Command::Tick).unwrap();
        }
        drop(tx);

        command_loop_task(Arc::clone(&state), rx).await;
        assert_eq!(state.get_snapshot().unwrap().remaining_seconds, 1497);
    }
}
