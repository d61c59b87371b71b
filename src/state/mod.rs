//! State management module
//!
//! Timer state, settings, the statistics ledger, the session state machine
//! that ties them together, and the shared application state that owns it.

pub mod app_state;
pub mod ledger;
pub mod machine;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use ledger::{Export, Ledger, RecordIdentity, ResetConfirmation, SessionRecord, Statistics};
pub use machine::{AutoStartTicket, Collaborators, Command, SessionMachine, TimerSnapshot};
pub use settings::{AlarmSound, Settings, SettingsError};
pub use timer_state::{Phase, TimerState};
