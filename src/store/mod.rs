// Key-value store layer
// Every read goes to the backing store; nothing here caches task lists

pub mod file;
pub mod memory;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::Result;

pub use file::{FileStore, StoreWatcher};
pub use memory::MemoryStore;

pub const TASKS_KEY: &str = "tasks";
pub const TRASH_KEY: &str = "trash";
pub const THEME_KEY: &str = "theme";

/// Capacity of the change-event channel
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Change event for a single key, emitted after the write lands
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub oldValue: Option<Value>,
    pub newValue: Option<Value>,
}

/// Persistent key-value collaborator.
///
/// `set` writes all entries as one unit and emits a [`StorageChange`] for each
/// key whose value actually changed. Last writer wins per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, entries: Vec<(String, Value)>) -> Result<()>;

    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// Read a key and decode it, treating missing and `null` as `T::default()`
pub fn readValue<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> Result<T> {
    match store.get(key)? {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

/// Encode a value for a `set` call
pub fn entry<T: Serialize>(key: &str, value: &T) -> Result<(String, Value)> {
    Ok((key.to_string(), serde_json::to_value(value)?))
}

/// Compare two snapshots and list the keys whose values differ
pub fn diffSnapshots(old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<StorageChange> {
    let mut changes = Vec::new();

    for (key, newValue) in new {
        let oldValue = old.get(key);
        if oldValue != Some(newValue) {
            changes.push(StorageChange {
                key: key.clone(),
                oldValue: oldValue.cloned(),
                newValue: Some(newValue.clone()),
            });
        }
    }

    for (key, oldValue) in old {
        if !new.contains_key(key) {
            changes.push(StorageChange {
                key: key.clone(),
                oldValue: Some(oldValue.clone()),
                newValue: None,
            });
        }
    }

    changes
}

/// Send change events; having no subscribers is fine
pub(crate) fn publish(sender: &broadcast::Sender<StorageChange>, changes: Vec<StorageChange>) {
    for change in changes {
        tracing::debug!("[store] Key '{}' changed", change.key);
        let _ = sender.send(change);
    }
}
