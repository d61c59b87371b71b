//! Timer state: current phase, countdown and session counter

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::format_countdown;

/// Timer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn is_break(&self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }
}

/// In-memory timer state, never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub phase: Phase,
    /// Starts at 1 and grows by one each time a break hands back to focus
    pub session_number: u32,
    /// Length of the current phase as configured when it was entered
    pub phase_seconds: i64,
    /// Goes negative in overtime
    pub remaining_seconds: i64,
    pub running: bool,
    /// Set when a focus phase first starts running, cleared once the block
    /// has been flushed to history or the timer is reset
    pub focus_started_at: Option<NaiveDateTime>,
}

impl TimerState {
    /// Initial state: paused at the start of the first focus session
    pub fn new(focus_seconds: i64) -> Self {
        Self {
            phase: Phase::Focus,
            session_number: 1,
            phase_seconds: focus_seconds,
            remaining_seconds: focus_seconds,
            running: false,
            focus_started_at: None,
        }
    }

    /// Move to `phase` with a fresh countdown of `seconds`
    pub fn enter(&mut self, phase: Phase, seconds: i64) {
        self.phase = phase;
        self.phase_seconds = seconds;
        self.remaining_seconds = seconds;
    }

    /// Seconds counted down so far in this phase, overtime included
    pub fn elapsed_seconds(&self) -> i64 {
        self.phase_seconds - self.remaining_seconds
    }

    pub fn is_overtime(&self) -> bool {
        self.remaining_seconds < 0
    }

    /// `MM:SS`, with a leading `-` in overtime
    pub fn display(&self) -> String {
        format_countdown(self.remaining_seconds)
    }

    pub fn label(&self) -> String {
        match self.phase {
            Phase::Focus => format!("Focus Time - Session {}", self.session_number),
            Phase::ShortBreak => "Short Break".to_string(),
            Phase::LongBreak => "Long Break".to_string(),
        }
    }

    /// Window-title style summary
    pub fn title(&self) -> String {
        format!("{} - {} | Pomodoro Timer", self.display(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_paused_in_first_focus() {
        let state = TimerState::new(1500);
        assert_eq!(state.phase, Phase::Focus);
        assert_eq!(state.session_number, 1);
        assert_eq!(state.remaining_seconds, 1500);
        assert!(!state.running);
        assert!(state.focus_started_at.is_none());
    }

    #[test]
    fn labels_follow_phase() {
        let mut state = TimerState::new(1500);
        state.session_number = 3;
        assert_eq!(state.label(), "Focus Time - Session 3");
        assert_eq!(state.title(), "25:00 - Focus Time - Session 3 | Pomodoro Timer");

        state.phase = Phase::LongBreak;
        assert_eq!(state.label(), "Long Break");
        assert!(state.phase.is_break());
    }

    #[test]
    fn elapsed_counts_from_the_length_at_entry() {
        let mut state = TimerState::new(1500);
        state.remaining_seconds = 1490;
        assert_eq!(state.elapsed_seconds(), 10);

        state.enter(Phase::ShortBreak, 300);
        assert_eq!(state.phase_seconds, 300);
        assert_eq!(state.elapsed_seconds(), 0);

        state.remaining_seconds = -20;
        assert_eq!(state.elapsed_seconds(), 320);
    }

    #[test]
    fn overtime_display() {
        let mut state = TimerState::new(1500);
        state.remaining_seconds = -61;
        assert!(state.is_overtime());
        assert_eq!(state.display(), "-01:01");
    }
}
