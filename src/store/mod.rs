//! Local key-value persistence
//!
//! Settings and the statistics ledger each live under one namespaced key.
//! Values are JSON text; decoding and defaulting happen in the owners of
//! those values, the store only moves strings.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use thiserror::Error;

/// Key holding the serialized settings object
pub const SETTINGS_KEY: &str = "pomodoroSettings";

/// Key holding the statistics counters and session history
pub const STATS_KEY: &str = "pomodoroStats";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Durable string storage addressed by key
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Absent keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Keys become file names, so keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_are_valid() {
        assert!(validate_key(SETTINGS_KEY).is_ok());
        assert!(validate_key(STATS_KEY).is_ok());
    }

    #[test]
    fn path_like_keys_are_rejected() {
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("a/b").is_err());
    }
}
