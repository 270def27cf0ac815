//! One JSON file per key inside a directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{COMPLETED_LEVELS_KEY, PersistenceError, ProgressStore, UNLOCKED_LEVEL_KEY};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file so a crash never leaves half a value
    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, serde_json::to_string(value)?)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
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
