//! Durable progress storage
//!
//! Two values survive between sessions: the highest unlocked level and the
//! ordered list of completed levels. Backends are plain key-value stores:
//! - `MemoryStore`: tests and headless runs
//! - `JsonFileStore`: native, one JSON file per key
//! - `LocalStorageStore`: browser LocalStorage (wasm32 only)

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod web;

use std::collections::BTreeMap;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

/// Storage key for the highest unlocked level
pub const UNLOCKED_LEVEL_KEY: &str = "unlockedLevel";
/// Storage key for the completed-levels list
pub const COMPLETED_LEVELS_KEY: &str = "completedLevels";

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value is malformed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Get/set for the two durable progress values
pub trait ProgressStore {
    /// `Ok(None)` when nothing has been stored yet
    fn load_unlocked_level(&self) -> Result<Option<u32>, PersistenceError>;
    fn load_completed_levels(&self) -> Result<Option<Vec<u32>>, PersistenceError>;
    fn store_unlocked_level(&mut self, level: u32) -> Result<(), PersistenceError>;
    fn store_completed_levels(&mut self, levels: &[u32]) -> Result<(), PersistenceError>;
}

/// Raw JSON strings by key, kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    /// Make every write fail (exercise best-effort handling)
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text for a key
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Overwrite a key with arbitrary text
    pub fn set_raw(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        self.values
            .get(key)
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(PersistenceError::from)
    }

    fn write<T: serde::Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), PersistenceError> {
        if self.fail_writes {
            return Err(PersistenceError::Unavailable("writes disabled".into()));
        }
        let json = serde_json::to_string(value)?;
        self.values.insert(key.to_string(), json);
        Ok(())
    }
}

impl ProgressStore for MemoryStore {
    fn load_unlocked_level(&self) -> Result<Option<u32>, PersistenceError> {
        self.read(UNLOCKED_LEVEL_KEY)
    }

    fn load_completed_levels(&self) -> Result<Option<Vec<u32>>, PersistenceError> {
        self.read(COMPLETED_LEVELS_KEY)
    }

    fn store_unlocked_level(&mut self, level: u32) -> Result<(), PersistenceError> {
        self.write(UNLOCKED_LEVEL_KEY, &level)
    }

    fn store_completed_levels(&mut self, levels: &[u32]) -> Result<(), PersistenceError> {
        self.write(COMPLETED_LEVELS_KEY, levels)
    }
}
