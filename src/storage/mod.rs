mod file_store;
mod memory_store;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

pub use file_store::{default_data_dir, FileStore};
pub use memory_store::MemoryStore;

pub const STATS_KEY: &str = "stats";
pub const SETTINGS_KEY: &str = "settings";
pub const CUSTOM_SETTINGS_KEY: &str = "custom_settings";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialize error: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}

/// Opaque string key-value persistence. Reads and writes are synchronous.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// The one store shared by settings and statistics on the UI thread.
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

pub fn shared<S: KeyValueStore + 'static>(store: S) -> SharedStore {
    Rc::new(RefCell::new(store))
}

/// Reads a JSON record, treating a missing or unreadable one as absent.
pub fn load_json<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(contents)) => match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(target: "storage", "Ignoring unreadable {} record: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::error!(target: "storage", "Failed to read {}: {}", key, e);
            None
        }
    }
}

pub fn save_json<T: serde::Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let contents = serde_json::to_string(value)?;
    store.set(key, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        count: u32,
    }

    #[test]
    fn test_json_round_trip_through_store() {
        let mut store = MemoryStore::default();
        save_json(&mut store, "record", &Record { count: 7 }).unwrap();
        assert_eq!(load_json::<Record>(&store, "record"), Some(Record { count: 7 }));
    }

    #[test]
    fn test_corrupt_record_reads_as_missing() {
        let mut store = MemoryStore::default();
        store.set("record", "{not json").unwrap();
        assert_eq!(load_json::<Record>(&store, "record"), None);
        assert_eq!(load_json::<Record>(&store, "absent"), None);
    }
}
