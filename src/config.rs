//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// What happens to a pending automatic start when the user acts first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AutoStartPolicy {
    /// Manual start, pause, reset or next cancels the pending automatic start
    #[default]
    Cancellable,
    /// The automatic start always fires once scheduled, whatever happened in between
    FireAndForget,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "pomodoro-server")]
#[command(about = "A local Pomodoro session daemon with persistent statistics")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "25250")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding settings and statistics
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep settings and statistics in memory only
    #[arg(long, conflicts_with = "data_dir")]
    pub ephemeral: bool,

    /// Command used to play alert sounds; receives the sound id as its argument
    #[arg(long)]
    pub alarm_player: Option<String>,

    /// Whether manual actions cancel a pending automatic start
    #[arg(long, value_enum, default_value_t = AutoStartPolicy::Cancellable)]
    pub auto_start_policy: AutoStartPolicy,

    /// Clock tick period in milliseconds
    #[arg(long, default_value = "1000", hide = true)]
    pub tick_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Explicit `--data-dir`, else the platform data directory
    pub fn resolve_data_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .map(|base| base.join("pomodoro-server"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory, pass --data-dir"))
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
