// File-backed key-value store
// One JSON object per file, read from disk on every access

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::{CHANGE_CHANNEL_CAPACITY, KeyValueStore, StorageChange, diffSnapshots, publish};
use crate::error::{RemindoError, Result};

struct FileStoreInner {
    path: PathBuf,
    // Serializes writers inside this process; other processes still race (last writer wins)
    writeLock: Mutex<()>,
    // Last snapshot this process wrote or observed, used only to diff external edits
    lastSeen: RwLock<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

#[derive(Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

/// Keeps the file watcher alive; dropping it stops external-change events
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = readSnapshot(&path)?;
        tracing::info!("[FileStore::open] {} ({} keys)", path.display(), snapshot.len());

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            inner: Arc::new(FileStoreInner {
                path,
                writeLock: Mutex::new(()),
                lastSeen: RwLock::new(snapshot),
                changes,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Re-read the file and emit change events for keys that differ from the
    /// last snapshot this store saw. Returns the number of changed keys.
    pub fn refresh(&self) -> Result<usize> {
        refreshFrom(&self.inner)
    }

    /// Watch the store file so edits made by other processes surface as
    /// change events.
    pub fn watch(&self) -> Result<StoreWatcher> {
        let inner = self.inner.clone();
        let watchedPath = self.inner.path.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("[FileStore::watch] Watcher error: {}", e);
                    return;
                }
            };

            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
                return;
            }
            if !event.paths.iter().any(|p| p.file_name() == watchedPath.file_name()) {
                return;
            }

            if let Err(e) = refreshFrom(&inner) {
                tracing::error!("[FileStore::watch] Failed to re-read store: {}", e);
            }
        })?;

        // Writes replace the file through a rename, so watch the directory
        let dir = self.inner.path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!("[FileStore::watch] Watching {}", dir.display());
        Ok(StoreWatcher { _watcher: watcher })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let snapshot = readSnapshot(&self.inner.path)?;
        Ok(snapshot.get(key).cloned())
    }

    fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let changes = {
            let _guard = self.inner.writeLock.lock();

            let before = readSnapshot(&self.inner.path)?;
            let mut after = before.clone();
            for (key, value) in entries {
                after.insert(key, value);
            }

            writeSnapshot(&self.inner.path, &after)?;
            *self.inner.lastSeen.write() = after.clone();
            diffSnapshots(&before, &after)
        };

        publish(&self.inner.changes, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.inner.changes.subscribe()
    }
}

fn refreshFrom(inner: &FileStoreInner) -> Result<usize> {
    let current = readSnapshot(&inner.path)?;
    let changes = {
        let mut lastSeen = inner.lastSeen.write();
        let changes = diffSnapshots(&lastSeen, &current);
        *lastSeen = current;
        changes
    };

    let count = changes.len();
    if count > 0 {
        tracing::info!("[FileStore::refresh] {} key(s) changed outside this process", count);
    }
    publish(&inner.changes, changes);
    Ok(count)
}

fn readSnapshot(path: &Path) -> Result<Map<String, Value>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        other => Err(RemindoError::Config(format!(
            "store file {} holds {} instead of an object",
            path.display(),
            jsonKind(&other)
        ))),
    }
}

fn writeSnapshot(path: &Path, snapshot: &Map<String, Value>) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmpPath = path.with_extension("json.tmp");
    fs::write(&tmpPath, json)?;
    fs::rename(&tmpPath, path)?;
    Ok(())
}

fn jsonKind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("storage.json")).unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn test_set_merges_keys_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let store = FileStore::open(&path).unwrap();

        store.set(vec![("theme".into(), json!("dark"))]).unwrap();
        store.set(vec![("tasks".into(), json!([{"id": 1}]))]).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("theme").unwrap(), Some(json!("dark")));
        assert_eq!(reopened.get("tasks").unwrap(), Some(json!([{"id": 1}])));
    }

    #[test]
    fn test_reads_see_writes_from_another_handle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let popup = FileStore::open(&path).unwrap();
        let background = FileStore::open(&path).unwrap();

        popup.set(vec![("tasks".into(), json!([1, 2, 3]))]).unwrap();
        assert_eq!(background.get("tasks").unwrap(), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_refresh_emits_external_edits_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let store = FileStore::open(&path).unwrap();
        store.set(vec![("tasks".into(), json!([1]))]).unwrap();

        let mut rx = store.subscribe();
        fs::write(&path, r#"{"tasks": [], "trash": [1]}"#).unwrap();

        assert_eq!(store.refresh().unwrap(), 2);
        let mut keys = vec![rx.try_recv().unwrap().key, rx.try_recv().unwrap().key];
        keys.sort();
        assert_eq!(keys, vec!["tasks", "trash"]);

        assert_eq!(store.refresh().unwrap(), 0);
    }

    #[test]
    fn test_non_object_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
