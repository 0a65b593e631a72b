// In-process key-value store, shared between contexts through Arc

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use super::{CHANGE_CHANNEL_CAPACITY, KeyValueStore, StorageChange, publish};
use crate::error::Result;

pub struct MemoryStore {
    values: RwLock<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: RwLock::new(Map::new()),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut changes = Vec::new();
        {
            let mut values = self.values.write();
            for (key, newValue) in entries {
                let oldValue = values.insert(key.clone(), newValue.clone());
                if oldValue.as_ref() != Some(&newValue) {
                    changes.push(StorageChange {
                        key,
                        oldValue,
                        newValue: Some(newValue),
                    });
                }
            }
        }
        publish(&self.changes, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
