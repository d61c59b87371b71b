//! API request and response structures

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{RecordIdentity, SessionRecord, Statistics, TimerSnapshot},
    utils::display_time,
};

/// Response for timer command endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        let status = if timer.running { "running" } else { "paused" };
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Status response with timer and server information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
    pub last_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// Counters without the history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_pomodoros: u64,
    pub today_pomodoros: u64,
    pub total_focus_minutes: u64,
    pub last_session_date: Option<NaiveDate>,
}

impl From<&Statistics> for StatsResponse {
    fn from(stats: &Statistics) -> Self {
        Self {
            total_pomodoros: stats.total_pomodoros,
            today_pomodoros: stats.today_pomodoros,
            total_focus_minutes: stats.total_focus_minutes,
            last_session_date: stats.last_session_date,
        }
    }
}

/// History record with times projected for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub focus_minutes: u32,
    pub remark: String,
}

impl HistoryEntry {
    pub fn project(record: &SessionRecord, use_24h: bool) -> Self {
        Self {
            id: record.id,
            date: record.date.clone(),
            start_time: display_time(&record.start_time, use_24h),
            end_time: display_time(&record.end_time, use_24h),
            focus_minutes: record.focus_minutes,
            remark: record.remark.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemarkRequest {
    pub remark: String,
}

/// Remark edit addressed by the record's visible fields
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRemarkRequest {
    #[serde(flatten)]
    pub identity: RecordIdentity,
    pub remark: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetStatsRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
