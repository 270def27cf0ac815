//! Browser LocalStorage backend

use serde::Serialize;
use serde::de::DeserializeOwned;
use web_sys::Storage;

use super::{COMPLETED_LEVELS_KEY, PersistenceError, ProgressStore, UNLOCKED_LEVEL_KEY};

#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("LocalStorage not accessible".into()))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        let storage = Self::storage()?;
        let raw = storage
            .get_item(key)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let storage = Self::storage()?;
        let json = serde_json::to_string(value)?;
        storage
            .set_item(key, &json)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))
    }
}

impl ProgressStore for LocalStorageStore {
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
