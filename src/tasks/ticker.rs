//! Clock driver: periodic tick commands while the timer runs

use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::state::Command;

/// Source of the once-per-period `Tick`.
///
/// The session engine decides when the clock runs; the driver only has to
/// deliver ticks between `start` and `stop`.
pub trait ClockDriver: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Clock backed by a tokio interval task feeding the command loop
pub struct TokioClock {
    tx: mpsc::UnboundedSender<Command>,
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl TokioClock {
    pub fn new(tx: mpsc::UnboundedSender<Command>, period: Duration) -> Self {
        Self {
            tx,
            period,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl ClockDriver for TokioClock {
    /// Must be called from within a tokio runtime. Restarts the task if one
    /// is already running so there is never more than one.
    fn start(&mut self) {
        self.stop();

        let tx = self.tx.clone();
        let period = self.period;
        debug!("Starting clock with {:?} period", period);

        self.handle = Some(tokio::spawn(async move {
            // First tick one full period after start, not immediately
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if tx.send(Command::Tick).is_err() {
                    debug!("Command loop closed, clock task exiting");
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Clock stopped");
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        self.stop();
    }
}
