//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT.
///
/// Falls back to tokio's ctrl-c listener when the signal stream cannot be
/// registered.
pub async fn shutdown_signal() {
    let signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ]);

    match signals {
        Ok(mut signals) => {
            if let Some(signal) = signals.next().await {
                info!("Received signal: {}", signal);
            }
        }
        Err(e) => {
            warn!("Failed to register signal handler: {}, waiting for ctrl-c", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
            }
        }
    }
}
