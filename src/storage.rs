// Storage layer for Remindo
// Global config as Markdown + YAML frontmatter, task data in a key-value store

use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::board::TaskBoard;
use crate::error::{RemindoError, Result};
use crate::models::{Settings, Task, Theme, TrashedTask};
use crate::store::{
    FileStore, KeyValueStore, THEME_KEY, TASKS_KEY, TRASH_KEY, entry, readValue,
};

// ============================================
// PATH HELPERS
// ============================================

/// Global config directory (~/.remindo/)
pub fn globalConfigDir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RemindoError::Config("Failed to get home directory".to_string()))?;
    Ok(home.join(".remindo"))
}

/// Global config file path
pub fn globalConfigPath() -> Result<PathBuf> {
    Ok(globalConfigDir()?.join("config.md"))
}

/// Store file: `storagePath` from settings, or ~/.remindo/storage.json
pub fn storageFilePath(settings: &Settings) -> Result<PathBuf> {
    match &settings.storagePath {
        Some(p) if !p.trim().is_empty() => Ok(PathBuf::from(p)),
        _ => Ok(globalConfigDir()?.join("storage.json")),
    }
}

// ============================================
// FRONTMATTER PARSING
// ============================================

/// Parse YAML frontmatter from markdown content
pub fn parseFrontmatter<T: serde::de::DeserializeOwned>(content: &str) -> Option<(T, String)> {
    let content = content.trim();
    let rest = content.strip_prefix("---")?;

    let end = rest.find("\n---")?;
    let yaml = rest[..end].trim();
    let body = rest[end + 4..].trim().to_string();

    let frontmatter: T = serde_yaml::from_str(yaml).ok()?;
    Some((frontmatter, body))
}

/// Serialize frontmatter + body to markdown
pub fn toMarkdown<T: serde::Serialize>(frontmatter: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

// ============================================
// GLOBAL CONFIG
// ============================================

const CONFIG_BODY: &str = "# Remindo\n\nSettings live in the frontmatter above.\n";

/// Load settings from a config file. Missing file or bad frontmatter gives defaults.
pub fn loadGlobalConfig(path: &Path) -> Settings {
    tracing::debug!("[loadGlobalConfig] Config path: {:?}", path);

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            tracing::info!("[loadGlobalConfig] No config at {}, using defaults", path.display());
            return Settings::default();
        }
    };

    match parseFrontmatter::<Settings>(&content) {
        Some((settings, _)) => settings,
        None => {
            tracing::warn!("[loadGlobalConfig] Failed to parse frontmatter, using defaults");
            Settings::default()
        }
    }
}

pub fn saveGlobalConfig(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toMarkdown(settings, CONFIG_BODY)?;
    fs::write(path, content)?;
    Ok(())
}

// ============================================
// STORAGE STATE
// ============================================

/// Main storage manager
pub struct Storage {
    pub configPath: PathBuf,
    pub settings: RwLock<Settings>,
    store: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(configPath: PathBuf, settings: Settings, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            configPath,
            settings: RwLock::new(settings),
            store,
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn currentSettings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Fresh read of the active list
    pub fn readTasks(&self) -> Result<Vec<Task>> {
        readValue(self.store(), TASKS_KEY)
    }

    /// Fresh read of the recycle bin
    pub fn readTrash(&self) -> Result<Vec<TrashedTask>> {
        readValue(self.store(), TRASH_KEY)
    }

    /// Fresh read of both lists
    pub fn loadBoard(&self) -> Result<TaskBoard> {
        Ok(TaskBoard::new(self.readTasks()?, self.readTrash()?))
    }

    pub fn saveTasks(&self, board: &TaskBoard) -> Result<()> {
        self.store.set(vec![entry(TASKS_KEY, &board.tasks)?])
    }

    pub fn saveTrash(&self, board: &TaskBoard) -> Result<()> {
        self.store.set(vec![entry(TRASH_KEY, &board.trash)?])
    }

    /// Write both lists in one store call
    pub fn saveBoard(&self, board: &TaskBoard) -> Result<()> {
        self.store.set(vec![
            entry(TASKS_KEY, &board.tasks)?,
            entry(TRASH_KEY, &board.trash)?,
        ])
    }

    /// Unknown or missing values read as light
    pub fn readTheme(&self) -> Result<Theme> {
        match self.store.get(THEME_KEY)? {
            Some(value) => Ok(serde_json::from_value(value).unwrap_or_default()),
            None => Ok(Theme::default()),
        }
    }

    pub fn saveTheme(&self, theme: Theme) -> Result<()> {
        self.store.set(vec![entry(THEME_KEY, &theme)?])
    }
}

pub type StorageState = Arc<Storage>;

/// Load global config and open the on-disk store
pub fn initStorage() -> Result<(StorageState, FileStore)> {
    let configPath = globalConfigPath()?;
    let settings = loadGlobalConfig(&configPath);
    initStorageWith(configPath, settings)
}

pub fn initStorageWith(configPath: PathBuf, settings: Settings) -> Result<(StorageState, FileStore)> {
    let storePath = storageFilePath(&settings)?;
    let fileStore = FileStore::open(&storePath)?;
    tracing::info!("[initStorage] Store at {}", storePath.display());

    let storage = Arc::new(Storage::new(configPath, settings, Arc::new(fileStore.clone())));
    Ok((storage, fileStore))
}
