//! Pomodoro Server - a local Pomodoro session daemon
//!
//! This is the main entry point for the pomodoro-server application.

use std::sync::Arc;
use anyhow::Context;
use chrono::Local;
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc},
};
use tracing::info;

use pomodoro_server::{
    api::create_router,
    config::Config,
    services::ChannelNotifier,
    state::{AppState, Collaborators, SessionMachine},
    store::{FileStore, KeyValueStore, MemoryStore},
    tasks::{command_loop_task, notification_task, TokioClock, TokioScheduler},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_server={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        info!("Running with in-memory storage, nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        let data_dir = config.resolve_data_dir()?;
        let store = FileStore::open(&data_dir)
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
        info!("Data directory: {}", store.root().display());
        Arc::new(store)
    };

    // Clock ticks and auto-starts come back in through the command loop
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (notification_tx, notification_rx) = broadcast::channel(64);

    let machine = SessionMachine::new(
        Collaborators {
            store,
            clock: Box::new(TokioClock::new(command_tx.clone(), config.tick_period())),
            scheduler: Box::new(TokioScheduler::new(command_tx)),
            notifier: Arc::new(ChannelNotifier::new(notification_tx.clone())),
        },
        config.auto_start_policy,
        Local::now().date_naive(),
    );

    let state = Arc::new(AppState::new(
        machine,
        notification_tx,
        config.port,
        config.host.clone(),
    ));

    tokio::spawn(command_loop_task(Arc::clone(&state), command_rx));
    tokio::spawn(notification_task(
        Arc::clone(&state),
        notification_rx,
        config.alarm_player.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start|pause|reset|next - Control the timer");
    info!("  GET  /status                       - Timer and server status");
    info!("  GET  /settings, PUT /settings      - Read or change settings");
    info!("  GET  /stats, POST /stats/reset     - Statistics");
    info!("  GET  /history, PUT /history/:id/remark");
    info!("  GET  /export                       - History as text rows");
    info!("  GET  /health                       - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Ok(snapshot) = state.get_snapshot() {
        info!("Stopping at {}", snapshot.title);
    }
    info!("Server shutdown complete");
    Ok(())
}
