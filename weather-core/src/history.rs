//! Recently searched city names, most recent first.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Maximum number of remembered searches.
pub const MAX_ENTRIES: usize = 10;

/// Backing storage for the history list.
pub trait HistoryStore: Send + Sync + Debug {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, entries: &[String]) -> Result<()>;
}

/// A single JSON array of city names on disk.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("history.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse history file: {}", self.path.display()))
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(entries).context("Failed to serialize history")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistoryStore {
    pub fn with_entries(entries: Vec<String>) -> Self {
        Self { entries: Mutex::new(entries) }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("history store lock poisoned"))?;
        Ok(entries.clone())
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        let mut guard = self.entries.lock().map_err(|_| anyhow!("history store lock poisoned"))?;
        *guard = entries.to_vec();
        Ok(())
    }
}

/// In-memory mirror of the stored history.
///
/// Invariants: no duplicates, at most [`MAX_ENTRIES`] entries, index 0 is the
/// most recent search.
#[derive(Debug)]
pub struct SearchHistory {
    store: Box<dyn HistoryStore>,
    entries: Vec<String>,
}

impl SearchHistory {
    /// Load from `store`. An unreadable store starts empty.
    pub fn load(store: Box<dyn HistoryStore>) -> Self {
        let entries = match store.load() {
            Ok(entries) => normalize(entries),
            Err(err) => {
                tracing::warn!("Ignoring unreadable search history: {err:#}");
                Vec::new()
            }
        };

        Self { store, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn most_recent(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Move `city` to the front, drop the overflow and persist.
    ///
    /// A failed write is logged; the in-memory list is still updated.
    pub fn add(&mut self, city: &str) -> &[String] {
        self.entries.retain(|entry| entry != city);
        self.entries.insert(0, city.to_string());
        self.entries.truncate(MAX_ENTRIES);

        if let Err(err) = self.store.save(&self.entries) {
            tracing::warn!("Failed to persist search history: {err:#}");
        }

        &self.entries
    }
}

/// Enforce the list invariants on data read back from storage.
fn normalize(entries: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(entries.len().min(MAX_ENTRIES));
    for entry in entries {
        if !out.contains(&entry) {
            out.push(entry);
        }
    }
    out.truncate(MAX_ENTRIES);
    out
}
