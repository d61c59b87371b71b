//! Recording fakes for the engine's collaborators

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    config::AutoStartPolicy,
    services::{Notification, Notifier},
    state::{AlarmSound, AutoStartTicket, Collaborators, SessionMachine, Settings},
    store::MemoryStore,
    tasks::{AutoStartScheduler, ClockDriver},
};

#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    calls: Arc<Mutex<(usize, usize)>>,
}

impl RecordingClock {
    pub fn starts(&self) -> usize {
        self.calls.lock().unwrap().0
    }

    pub fn stops(&self) -> usize {
        self.calls.lock().unwrap().1
    }
}

impl ClockDriver for RecordingClock {
    fn start(&mut self) {
        self.calls.lock().unwrap().0 += 1;
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().1 += 1;
    }
}

#[derive(Debug, Default)]
struct SchedulerLog {
    scheduled: Vec<(AutoStartTicket, Duration)>,
    cancelled: Vec<AutoStartTicket>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    log: Arc<Mutex<SchedulerLog>>,
}

impl RecordingScheduler {
    pub fn last_scheduled(&self) -> Option<AutoStartTicket> {
        self.log.lock().unwrap().scheduled.last().map(|(ticket, _)| *ticket)
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.log.lock().unwrap().scheduled.iter().map(|(_, delay)| *delay).collect()
    }

    pub fn cancelled(&self) -> Vec<AutoStartTicket> {
        self.log.lock().unwrap().cancelled.clone()
    }
}

impl AutoStartScheduler for RecordingScheduler {
    fn schedule(&mut self, ticket: AutoStartTicket, delay: Duration) {
        self.log.lock().unwrap().scheduled.push((ticket, delay));
    }

    fn cancel(&mut self, ticket: AutoStartTicket) {
        self.log.lock().unwrap().cancelled.push(ticket);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Notification::Message { text } => Some(text),
                Notification::Alert { .. } => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<AlarmSound> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Notification::Alert { sound } => Some(sound),
                Notification::Message { .. } => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.events.lock().unwrap().push(Notification::Message {
            text: message.to_string(),
        });
    }

    fn alert(&self, sound: AlarmSound) {
        self.events.lock().unwrap().push(Notification::Alert { sound });
    }
}

/// A machine wired to recording fakes, with a hand-driven wall clock
/// starting at 2026-10-16 09:00:00
pub struct Harness {
    pub machine: SessionMachine,
    pub clock: RecordingClock,
    pub scheduler: RecordingScheduler,
    pub notifier: RecordingNotifier,
    pub store: MemoryStore,
    pub now: NaiveDateTime,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        Self::with_policy(settings, AutoStartPolicy::Cancellable)
    }

    pub fn with_policy(settings: Settings, policy: AutoStartPolicy) -> Self {
        let store = MemoryStore::new();
        settings.save(&store).unwrap();

        let clock = RecordingClock::default();
        let scheduler = RecordingScheduler::default();
        let notifier = RecordingNotifier::default();
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let machine = SessionMachine::new(
            Collaborators {
                store: Arc::new(store.clone()),
                clock: Box::new(clock.clone()),
                scheduler: Box::new(scheduler.clone()),
                notifier: Arc::new(notifier.clone()),
            },
            policy,
            now.date(),
        );

        Self {
            machine,
            clock,
            scheduler,
            notifier,
            store,
            now,
        }
    }

    /// Move the wall clock forward and return the new time
    pub fn advance(&mut self, seconds: i64) -> NaiveDateTime {
        self.now += chrono::Duration::seconds(seconds);
        self.now
    }
}
