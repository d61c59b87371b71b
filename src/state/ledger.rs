//! Statistics and session-history ledger
//!
//! Counters are cumulative and never trimmed. The history keeps the 50 most
//! recent focus blocks, newest first. Both are persisted together under
//! [`STATS_KEY`] after every change, best-effort.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    store::{KeyValueStore, StoreError, STATS_KEY},
    utils::{
        canonical_time, display_time,
        time_format::{stored_date, stored_time},
    },
};

/// Maximum number of retained history records
pub const HISTORY_LIMIT: usize = 50;

/// One finished focus block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Stable id, assigned when the record is created
    #[serde(default)]
    pub id: u64,
    /// Day the focus block started, `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub focus_minutes: u32,
    #[serde(default)]
    pub remark: String,
}

/// Field-wise identity of a record, as shown to the user. Times may be
/// given in either clock format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIdentity {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub focus_minutes: u32,
}

impl SessionRecord {
    fn matches(&self, identity: &RecordIdentity) -> bool {
        self.date == identity.date
            && self.start_time == canonical_time(&identity.start_time)
            && self.end_time == canonical_time(&identity.end_time)
            && self.focus_minutes == identity.focus_minutes
    }
}

/// Persisted counters plus history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    /// Focus blocks that ran at least the configured focus length
    pub total_pomodoros: u64,
    pub today_pomodoros: u64,
    /// Minutes across every recorded block, full or partial
    pub total_focus_minutes: u64,
    pub last_session_date: Option<NaiveDate>,
    pub session_history: Vec<SessionRecord>,
    pub next_record_id: u64,
}

/// Input for [`Ledger::record_focus_completion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusBlock {
    pub elapsed_minutes: u32,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

/// Proof that the user explicitly asked to wipe statistics
#[derive(Debug)]
pub struct ResetConfirmation(());

impl ResetConfirmation {
    pub fn from_user(confirmed: bool) -> Option<Self> {
        confirmed.then_some(Self(()))
    }
}

/// Result of [`Ledger::export`]
pub enum Export<'a> {
    Empty,
    Rows(ExportRows<'a>),
}

impl Export<'_> {
    /// Join the rows into one newline-separated blob
    pub fn into_text(self) -> Option<String> {
        match self {
            Export::Empty => None,
            Export::Rows(rows) => Some(rows.collect::<Vec<_>>().join("\n")),
        }
    }
}

/// Lazily formatted `| date | start~end | minutes | remark |` rows
pub struct ExportRows<'a> {
    records: std::slice::Iter<'a, SessionRecord>,
    use_24h: bool,
}

impl Iterator for ExportRows<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.records.next().map(|record| {
            format!(
                "| {} | {}~{} | {} | {} |",
                record.date,
                display_time(&record.start_time, self.use_24h),
                display_time(&record.end_time, self.use_24h),
                record.focus_minutes,
                escape_remark(&record.remark),
            )
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

fn escape_remark(remark: &str) -> String {
    remark
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    stats: Statistics,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").field("stats", &self.stats).finish()
    }
}

impl Ledger {
    /// Load the ledger and apply the daily rollover for `today`
    pub fn load(store: Arc<dyn KeyValueStore>, today: NaiveDate) -> Self {
        let mut ledger = Self {
            store,
            stats: Statistics::default(),
        };
        ledger.reload(today);
        ledger
    }

    /// Re-read persisted statistics. When the last session happened on a
    /// different day, today's count starts over.
    pub fn reload(&mut self, today: NaiveDate) {
        self.stats = match self.store.get(STATS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Saved statistics are malformed, starting fresh: {}", e);
                Statistics::default()
            }),
            Ok(None) => Statistics::default(),
            Err(e) => {
                warn!("Failed to read statistics, starting fresh: {}", e);
                Statistics::default()
            }
        };

        self.assign_missing_ids();

        if self.stats.last_session_date != Some(today) {
            debug!(
                "Day changed since {:?}, resetting today's pomodoros",
                self.stats.last_session_date
            );
            self.stats.today_pomodoros = 0;
            self.stats.last_session_date = Some(today);
            self.persist();
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Newest first
    pub fn history(&self) -> &[SessionRecord] {
        &self.stats.session_history
    }

    /// Account for a finished focus block.
    ///
    /// Focus minutes always accrue. A pomodoro is credited only when the
    /// block lasted at least `configured_focus_minutes`.
    pub fn record_focus_completion(
        &mut self,
        block: FocusBlock,
        configured_focus_minutes: u32,
    ) -> &SessionRecord {
        let credited = block.elapsed_minutes >= configured_focus_minutes;

        self.stats.total_focus_minutes += u64::from(block.elapsed_minutes);
        if credited {
            self.stats.total_pomodoros += 1;
            self.stats.today_pomodoros += 1;
        }
        self.stats.last_session_date = Some(block.ended_at.date());

        let record = SessionRecord {
            id: self.take_id(),
            date: stored_date(block.started_at),
            start_time: stored_time(block.started_at),
            end_time: stored_time(block.ended_at),
            focus_minutes: block.elapsed_minutes,
            remark: String::new(),
        };

        info!(
            "Recorded {}-minute focus block {}~{} (pomodoro credited: {})",
            record.focus_minutes, record.start_time, record.end_time, credited
        );

        self.stats.session_history.insert(0, record);
        self.stats.session_history.truncate(HISTORY_LIMIT);
        self.persist();

        &self.stats.session_history[0]
    }

    /// Zero every counter and clear the history
    pub fn reset_all(&mut self, _confirmation: ResetConfirmation) {
        let today = self.stats.last_session_date;
        self.stats = Statistics {
            last_session_date: today,
            ..Statistics::default()
        };
        info!("Statistics and history reset");
        self.persist();
    }

    /// Update the remark of the record matching `identity`.
    ///
    /// Returns false when no retained record matches, e.g. after eviction.
    pub fn set_remark(&mut self, identity: &RecordIdentity, remark: &str) -> bool {
        let Some(record) = self
            .stats
            .session_history
            .iter_mut()
            .find(|record| record.matches(identity))
        else {
            debug!("No history record matches {:?}", identity);
            return false;
        };

        record.remark = remark.to_string();
        self.persist();
        true
    }

    pub fn set_remark_by_id(&mut self, id: u64, remark: &str) -> bool {
        let Some(record) = self.stats.session_history.iter_mut().find(|record| record.id == id) else {
            debug!("No history record with id {}", id);
            return false;
        };

        record.remark = remark.to_string();
        self.persist();
        true
    }

    /// History rows for clipboard export, newest first
    pub fn export(&self, use_24h: bool) -> Export<'_> {
        if self.stats.session_history.is_empty() {
            return Export::Empty;
        }

        Export::Rows(ExportRows {
            records: self.stats.session_history.iter(),
            use_24h,
        })
    }

    fn take_id(&mut self) -> u64 {
        self.stats.next_record_id = self.stats.next_record_id.max(1);
        let id = self.stats.next_record_id;
        self.stats.next_record_id += 1;
        id
    }

    /// Records saved before ids existed come back with id 0
    fn assign_missing_ids(&mut self) {
        let highest = self
            .stats
            .session_history
            .iter()
            .map(|record| record.id)
            .max()
            .unwrap_or(0);
        self.stats.next_record_id = self.stats.next_record_id.max(highest + 1);

        let mut assigned = false;
        for index in 0..self.stats.session_history.len() {
            if self.stats.session_history[index].id == 0 {
                let id = self.take_id();
                self.stats.session_history[index].id = id;
                assigned = true;
            }
        }

        if assigned {
            self.persist();
        }
    }

    fn try_persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.stats)?;
        self.store.set(STATS_KEY, &raw)
    }

    /// Failures are logged and dropped; the in-memory ledger stays authoritative.
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!("Failed to persist statistics: {}", e);
        }
    }
}
