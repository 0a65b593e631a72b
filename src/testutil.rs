// Shared helpers for unit tests: in-memory AppState and a store that can fail on demand

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use crate::AppState;
use crate::alarms::{LocalAlarms, alarmName};
use crate::error::{RemindoError, Result};
use crate::models::Settings;
use crate::notifications::LogNotifier;
use crate::storage::Storage;
use crate::store::{KeyValueStore, MemoryStore, StorageChange};

/// AppState over a MemoryStore; the config path is never written
pub fn memoryState() -> AppState {
    memoryStateAt(PathBuf::from("remindo-test-config.md"))
}

pub fn memoryStateAt(configPath: PathBuf) -> AppState {
    stateOver(Arc::new(MemoryStore::new()), configPath)
}

/// AppState whose store writes can be switched to fail
pub fn failingState() -> (AppState, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::default());
    let state = stateOver(store.clone(), PathBuf::from("remindo-test-config.md"));
    (state, store)
}

fn stateOver(store: Arc<dyn KeyValueStore>, configPath: PathBuf) -> AppState {
    let storage = Arc::new(Storage::new(configPath, Settings::default(), store));
    AppState::new(storage, Arc::new(LocalAlarms::new()), Arc::new(LogNotifier))
}

/// Fire time of the timer registered for a task, if any
pub fn timerFor(state: &AppState, id: i64) -> Option<i64> {
    state.alarms.get(&alarmName(id)).map(|a| a.scheduledTime)
}

#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn failWrites(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.get(key)
    }

    fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemindoError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(entries)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.inner.subscribe()
    }
}
