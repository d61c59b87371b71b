//! Session state machine
//!
//! Owns the timer state, the settings and the ledger, and turns
//! [`Command`]s into phase transitions. Every collaborator it talks to
//! (clock, auto-start scheduler, notification sink, store) is injected, so
//! the machine itself is plain synchronous code driven by whoever owns it.

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    ledger::{Export, FocusBlock, Ledger, RecordIdentity, ResetConfirmation, SessionRecord, Statistics},
    settings::{Settings, SettingsError},
    timer_state::{Phase, TimerState},
};
use crate::{
    config::AutoStartPolicy,
    services::Notifier,
    store::KeyValueStore,
    tasks::{AutoStartScheduler, ClockDriver},
};

/// Delay between a phase transition and its automatic start
pub const AUTO_START_DELAY: Duration = Duration::from_secs(3);

/// Identifies one scheduled automatic start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AutoStartTicket(pub u64);

/// Everything that can drive the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    /// Finish the current phase early and move on
    ForceAdvance,
    Tick,
    AutoStart(AutoStartTicket),
}

/// How a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Timeout,
    Forced,
}

/// Serializable view of the timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub session_number: u32,
    pub remaining_seconds: i64,
    pub running: bool,
    pub overtime: bool,
    pub display: String,
    pub label: String,
    pub title: String,
    pub auto_start_pending: bool,
}

/// Injected capabilities
pub struct Collaborators {
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Box<dyn ClockDriver>,
    pub scheduler: Box<dyn AutoStartScheduler>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct SessionMachine {
    settings: Settings,
    timer: TimerState,
    ledger: Ledger,
    store: Arc<dyn KeyValueStore>,
    clock: Box<dyn ClockDriver>,
    scheduler: Box<dyn AutoStartScheduler>,
    notifier: Arc<dyn Notifier>,
    policy: AutoStartPolicy,
    pending_auto_start: Option<AutoStartTicket>,
    last_ticket: u64,
}

impl std::fmt::Debug for SessionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMachine")
            .field("settings", &self.settings)
            .field("timer", &self.timer)
            .field("policy", &self.policy)
            .field("pending_auto_start", &self.pending_auto_start)
            .finish_non_exhaustive()
    }
}

impl SessionMachine {
    /// Load settings and the ledger from the store and start paused at
    /// the first focus session.
    pub fn new(collaborators: Collaborators, policy: AutoStartPolicy, today: NaiveDate) -> Self {
        let Collaborators {
            store,
            clock,
            scheduler,
            notifier,
        } = collaborators;

        let settings = Settings::load(store.as_ref());
        let ledger = Ledger::load(Arc::clone(&store), today);
        let timer = TimerState::new(settings.phase_seconds(Phase::Focus));

        info!(
            "Session engine ready: focus={}m short={}m long={}m interval={} policy={:?}",
            settings.focus_minutes,
            settings.short_break_minutes,
            settings.long_break_minutes,
            settings.long_break_interval,
            policy
        );

        Self {
            settings,
            timer,
            ledger,
            store,
            clock,
            scheduler,
            notifier,
            policy,
            pending_auto_start: None,
            last_ticket: 0,
        }
    }

    /// Apply one command at wall-clock time `now`
    pub fn handle(&mut self, command: Command, now: NaiveDateTime) {
        match command {
            Command::Start => {
                self.cancel_pending_auto_start();
                self.start(now);
            }
            Command::Pause => {
                self.cancel_pending_auto_start();
                self.pause();
            }
            Command::Reset => {
                self.cancel_pending_auto_start();
                self.reset();
            }
            Command::ForceAdvance => {
                self.cancel_pending_auto_start();
                self.complete_session(now, Completion::Forced);
            }
            Command::Tick => self.on_tick(now),
            Command::AutoStart(ticket) => self.on_auto_start(ticket, now),
        }
    }

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn statistics(&self) -> &Statistics {
        self.ledger.statistics()
    }

    pub fn history(&self) -> &[SessionRecord] {
        self.ledger.history()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.timer.phase,
            session_number: self.timer.session_number,
            remaining_seconds: self.timer.remaining_seconds,
            running: self.timer.running,
            overtime: self.timer.is_overtime(),
            display: self.timer.display(),
            label: self.timer.label(),
            title: self.timer.title(),
            auto_start_pending: self.pending_auto_start.is_some(),
        }
    }

    /// Replace the settings. A paused timer is reset so the new focus
    /// length shows immediately; a running one keeps its countdown.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;

        if let Err(e) = self.settings.save(self.store.as_ref()) {
            warn!("Failed to persist settings: {}", e);
        }

        if !self.timer.running {
            self.cancel_pending_auto_start();
            self.reset();
        }

        info!("Settings updated: {:?}", self.settings);
        self.notifier.notify("Settings saved!");
        Ok(())
    }

    pub fn set_remark(&mut self, identity: &RecordIdentity, remark: &str) -> bool {
        self.ledger.set_remark(identity, remark)
    }

    pub fn set_remark_by_id(&mut self, id: u64, remark: &str) -> bool {
        self.ledger.set_remark_by_id(id, remark)
    }

    pub fn reset_statistics(&mut self, confirmation: ResetConfirmation) {
        self.ledger.reset_all(confirmation);
        self.notifier.notify("Statistics reset.");
    }

    /// History export honouring the clock format setting
    pub fn export(&self) -> Export<'_> {
        self.ledger.export(self.settings.use_24h_format)
    }

    fn start(&mut self, now: NaiveDateTime) {
        if self.timer.running {
            debug!("Start ignored, timer already running");
            return;
        }

        self.timer.running = true;
        if self.timer.phase == Phase::Focus && self.timer.focus_started_at.is_none() {
            self.timer.focus_started_at = Some(now);
        }

        self.alert();
        self.clock.start();
        info!("Timer started: {} at {}", self.timer.label(), self.timer.display());
    }

    fn pause(&mut self) {
        if !self.timer.running {
            return;
        }

        self.timer.running = false;
        self.clock.stop();
        info!("Timer paused at {}", self.timer.display());
    }

    fn reset(&mut self) {
        self.pause();
        self.timer = TimerState::new(self.settings.phase_seconds(Phase::Focus));
        info!("Timer reset to {}", self.timer.display());
    }

    fn on_tick(&mut self, now: NaiveDateTime) {
        if !self.timer.running {
            debug!("Dropping tick while paused");
            return;
        }

        self.timer.remaining_seconds -= 1;
        if self.timer.remaining_seconds != 0 {
            return;
        }

        if self.settings.auto_stop_at_zero {
            self.complete_session(now, Completion::Timeout);
        } else {
            debug!("{} reached zero, continuing into overtime", self.timer.label());
            self.alert();
        }
    }

    fn complete_session(&mut self, now: NaiveDateTime, completion: Completion) {
        if !self.timer.running {
            debug!("Completion ignored, timer is paused");
            return;
        }

        if self.timer.phase == Phase::Focus {
            self.flush_focus_block(now);
        }

        self.pause();
        self.alert();

        let message = match self.timer.phase {
            Phase::Focus => {
                let next = if self.timer.session_number % self.settings.long_break_interval == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                };
                self.enter(next);
                if self.settings.auto_start_breaks {
                    self.schedule_auto_start();
                }
                transition_message(next, self.settings.phase_minutes(next), completion)
            }
            Phase::ShortBreak | Phase::LongBreak => {
                self.timer.session_number += 1;
                self.enter(Phase::Focus);
                if self.settings.auto_start_focus {
                    self.schedule_auto_start();
                }
                transition_message(Phase::Focus, self.settings.focus_minutes, completion)
            }
        };

        info!("Phase complete ({:?}), now {}", completion, self.timer.label());
        self.notifier.notify(&message);
    }

    fn enter(&mut self, phase: Phase) {
        self.timer.enter(phase, self.settings.phase_seconds(phase));
    }

    /// Hand the elapsed focus time to the ledger. Blocks shorter than a
    /// started minute are dropped. Elapsed time and the pomodoro threshold
    /// both use the focus length the block started with, so settings saved
    /// mid-block only apply from the next phase.
    fn flush_focus_block(&mut self, now: NaiveDateTime) {
        let elapsed_seconds = self.timer.elapsed_seconds();
        let started_at = self
            .timer
            .focus_started_at
            .take()
            .unwrap_or_else(|| now - chrono::Duration::seconds(elapsed_seconds.max(0)));

        let elapsed_minutes = elapsed_minutes(elapsed_seconds);
        if elapsed_minutes == 0 {
            debug!("Focus block under a minute, not recorded");
            return;
        }

        let block = FocusBlock {
            elapsed_minutes,
            started_at,
            ended_at: now,
        };
        let configured_minutes = u32::try_from(self.timer.phase_seconds / 60).unwrap_or(u32::MAX);
        self.ledger.record_focus_completion(block, configured_minutes);

        let unit = if elapsed_minutes == 1 { "minute" } else { "minutes" };
        self.notifier
            .notify(&format!("Logged {} {} of focus.", elapsed_minutes, unit));
    }

    fn schedule_auto_start(&mut self) {
        self.last_ticket += 1;
        let ticket = AutoStartTicket(self.last_ticket);
        self.scheduler.schedule(ticket, AUTO_START_DELAY);
        self.pending_auto_start = Some(ticket);
        debug!("Auto-start {:?} scheduled for {}", ticket, self.timer.label());
    }

    /// Under the fire-and-forget policy a scheduled start survives manual
    /// actions and still fires.
    fn cancel_pending_auto_start(&mut self) {
        if self.policy != AutoStartPolicy::Cancellable {
            return;
        }

        if let Some(ticket) = self.pending_auto_start.take() {
            self.scheduler.cancel(ticket);
            info!("Pending auto-start {:?} cancelled by user action", ticket);
        }
    }

    fn on_auto_start(&mut self, ticket: AutoStartTicket, now: NaiveDateTime) {
        let expected = self.pending_auto_start == Some(ticket);
        if expected {
            self.pending_auto_start = None;
        }

        if self.policy == AutoStartPolicy::Cancellable && !expected {
            debug!("Ignoring stale auto-start {:?}", ticket);
            return;
        }

        if self.timer.running {
            debug!("Auto-start {:?} ignored, timer already running", ticket);
            return;
        }

        let message = if self.timer.phase.is_break() {
            "Break started automatically!"
        } else {
            "Focus session started automatically!"
        };

        self.start(now);
        self.notifier.notify(message);
    }

    fn alert(&self) {
        if self.settings.alarm_enabled {
            self.notifier.alert(self.settings.alarm_sound_id);
        }
    }
}

/// Whole minutes of a focus block, rounding any started minute up
fn elapsed_minutes(elapsed_seconds: i64) -> u32 {
    if elapsed_seconds <= 0 {
        return 0;
    }
    let minutes = (elapsed_seconds + 59) / 60;
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn transition_message(next: Phase, minutes: u32, completion: Completion) -> String {
    match (completion, next) {
        (Completion::Timeout, Phase::LongBreak) => {
            format!("Great job! Take a {}-minute long break.", minutes)
        }
        (Completion::Timeout, Phase::ShortBreak) => {
            format!("Well done! Take a {}-minute short break.", minutes)
        }
        (Completion::Timeout, Phase::Focus) => {
            format!("Break over! Time to focus for {} minutes.", minutes)
        }
        (Completion::Forced, Phase::LongBreak) => {
            format!("Switching to {}-minute long break.", minutes)
        }
        (Completion::Forced, Phase::ShortBreak) => {
            format!("Switching to {}-minute short break.", minutes)
        }
        (Completion::Forced, Phase::Focus) => {
            format!("Switching to {}-minute focus session.", minutes)
        }
    }
}
