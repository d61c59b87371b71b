//! File-backed store: one `<key>.json` file per key in a data directory

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{validate_key, KeyValueStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| io_error(&root, source))?;
        debug!("Opened file store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    /// Writes go to a temp file in the same directory and are renamed into
    /// place, so a crash never leaves a half-written value behind.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        let mut temp = NamedTempFile::new_in(&self.root).map_err(|source| io_error(&self.root, source))?;
        temp.write_all(value.as_bytes())
            .map_err(|source| io_error(temp.path(), source))?;
        temp.as_file()
            .sync_all()
            .map_err(|source| io_error(temp.path(), source))?;
        temp.persist(&path)
            .map_err(|e| io_error(&path, e.error))?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
