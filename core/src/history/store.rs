use crate::history::storage::KeyValueStore;
use crate::model::GenerationResult;
use crate::prelude::ViewResult;
use crate::telemetry::LogManager;

/// Versioned storage key holding the JSON array of results.
pub const HISTORY_KEY: &str = "viewpoint.history.v1";

/// Most-recent-first list of generation results mirrored into a key-value store.
///
/// Every mutation serialises and writes the new list before it replaces the
/// in-memory copy, so a failed write leaves both sides on the previous list.
pub struct HistoryStore<S> {
    storage: S,
    entries: Vec<GenerationResult>,
    logger: LogManager,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Opens the store and loads whatever is persisted.
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            entries: Vec::new(),
            logger: LogManager::new("history"),
        };
        store.entries = store.load();
        store
    }

    /// Reads the persisted list; missing or unreadable data yields an empty list.
    pub fn load(&self) -> Vec<GenerationResult> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                self.logger.warn(&format!("history unavailable: {err}"));
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<GenerationResult>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                self.logger
                    .warn(&format!("discarding unreadable history: {err}"));
                Vec::new()
            }
        }
    }

    /// Persists `entries` as the full list, replacing prior contents.
    pub fn save(&mut self, entries: Vec<GenerationResult>) -> ViewResult<()> {
        let serialized = serde_json::to_string(&entries)?;
        self.storage.set(HISTORY_KEY, &serialized)?;
        self.entries = entries;
        Ok(())
    }

    /// Prepends `result`.
    pub fn add(&mut self, result: GenerationResult) -> ViewResult<()> {
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(result);
        next.extend(self.entries.iter().cloned());
        self.save(next)
    }

    /// Drops the entry with `id`; returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> ViewResult<bool> {
        let next: Vec<GenerationResult> = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        let removed = next.len() != self.entries.len();
        self.save(next)?;
        Ok(removed)
    }

    pub fn clear(&mut self) -> ViewResult<()> {
        self.storage.remove(HISTORY_KEY)?;
        self.entries.clear();
        Ok(())
    }

    pub fn entries(&self) -> &[GenerationResult] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&GenerationResult> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
