//! Deferred automatic start after a phase transition

use std::{collections::HashMap, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::debug;

use crate::state::{AutoStartTicket, Command};

/// One-shot delayed `AutoStart` delivery
pub trait AutoStartScheduler: Send {
    fn schedule(&mut self, ticket: AutoStartTicket, delay: Duration);
    /// Cancelling an unknown or already fired ticket is a no-op
    fn cancel(&mut self, ticket: AutoStartTicket);
}

/// Scheduler that sleeps on the tokio timer and then feeds the command loop
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<Command>,
    pending: HashMap<AutoStartTicket, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            tx,
            pending: HashMap::new(),
        }
    }
}

impl AutoStartScheduler for TokioScheduler {
    fn schedule(&mut self, ticket: AutoStartTicket, delay: Duration) {
        // Forget handles of tasks that already fired
        self.pending.retain(|_, handle| !handle.is_finished());

        let tx = self.tx.clone();
        debug!("Scheduling auto-start {:?} in {:?}", ticket, delay);

        let handle = tokio::spawn(async move {
            sleep(delay).await;
            if tx.send(Command::AutoStart(ticket)).is_err() {
                debug!("Command loop closed, dropping auto-start {:?}", ticket);
            }
        });
        self.pending.insert(ticket, handle);
    }

    fn cancel(&mut self, ticket: AutoStartTicket) {
        if let Some(handle) = self.pending.remove(&ticket) {
            handle.abort();
            debug!("Cancelled auto-start {:?}", ticket);
        }
    }
}
