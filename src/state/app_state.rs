//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Local, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use super::{Command, SessionMachine, TimerSnapshot};
use crate::services::Notification;

/// Shared application state.
///
/// The session machine is the single owner of timer and ledger state; every
/// command and query goes through its mutex so ticks, manual actions and
/// completions never interleave.
#[derive(Debug)]
pub struct AppState {
    machine: Mutex<SessionMachine>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Most recent user-facing message, kept by the notification task
    pub last_message: Arc<Mutex<Option<String>>>,
    /// Notifications published by the engine
    pub notification_tx: broadcast::Sender<Notification>,
    /// Channel for timer updates
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    pub fn new(
        machine: SessionMachine,
        notification_tx: broadcast::Sender<Notification>,
        port: u16,
        host: String,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());

        Self {
            machine: Mutex::new(machine),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            last_message: Arc::new(Mutex::new(None)),
            notification_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a command at the current local time and publish the new snapshot
    pub fn dispatch(&self, command: Command) -> Result<TimerSnapshot, String> {
        let now = Local::now().naive_local();

        let snapshot = self.with_machine(|machine| {
            machine.handle(command, now);
            machine.snapshot()
        })?;

        if command != Command::Tick {
            debug!("Dispatched {:?}", command);
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some(action_name(command).to_string());
            }
            if let Ok(mut last_time) = self.last_action_time.lock() {
                *last_time = Some(Utc::now());
            }
        }

        Ok(snapshot)
    }

    /// Run `f` with exclusive access to the session machine.
    ///
    /// The snapshot channel is refreshed afterwards, since `f` may have
    /// changed the timer (settings updates reset it).
    pub fn with_machine<F, R>(&self, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut SessionMachine) -> R,
    {
        let mut machine = self.machine.lock()
            .map_err(|e| format!("Failed to lock session machine: {}", e))?;

        let result = f(&mut *machine);
        let snapshot = machine.snapshot();
        drop(machine); // Release the lock early

        self.publish(snapshot);
        Ok(result)
    }

    /// Get current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, String> {
        self.machine.lock()
            .map(|machine| machine.snapshot())
            .map_err(|e| format!("Failed to lock session machine: {}", e))
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        let previous = self.snapshot_tx.send_replace(snapshot);
        if previous.phase != self.snapshot_tx.borrow().phase {
            debug!("Phase changed from {:?}", previous.phase);
        }
    }

    /// Remember the latest user-facing message
    pub fn record_message(&self, text: &str) {
        match self.last_message.lock() {
            Ok(mut last) => *last = Some(text.to_string()),
            Err(e) => warn!("Failed to record message: {}", e),
        }
    }

    pub fn get_last_message(&self) -> Option<String> {
        self.last_message.lock().ok().and_then(|m| m.clone())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

fn action_name(command: Command) -> &'static str {
    match command {
        Command::Start => "start",
        Command::Pause => "pause",
        Command::Reset => "reset",
        Command::ForceAdvance => "next",
        Command::Tick => "tick",
        Command::AutoStart(_) => "auto-start",
    }
}
