//! Task store and durable storage.
//!
//! This module provides the `Storage` trait (a named-slot key-value store),
//! the file-backed `FileStorage` implementation, and `TaskStore`, which owns
//! the task collection and re-persists it after every mutation.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::task::{seed_tasks, Task};

/// Slot used when none is configured.
pub const DEFAULT_SLOT: &str = "learningTodos";

/// A persistent key-value store holding one serialized value per slot.
pub trait Storage {
    /// Read the raw value of `slot`, or `None` when nothing is stored there.
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value of `slot`.
    fn write(&mut self, slot: &str, value: &str) -> Result<(), StoreError>;
}

/// Storage that keeps each slot as `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open the storage directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        debug!(dir = %dir.display(), "opened file storage");
        Ok(FileStorage {
            dir: dir.to_path_buf(),
        })
    }

    /// Storage rooted at `dir` without touching the filesystem. Reads and
    /// writes fail until the directory exists.
    pub fn unopened(dir: &Path) -> Self {
        FileStorage {
            dir: dir.to_path_buf(),
        }
    }

    /// Path of the file backing `slot`.
    pub fn slot_path(&self, slot: &str) -> Result<PathBuf, StoreError> {
        if slot.is_empty() || slot.contains(['/', '\\']) || slot.starts_with('.') {
            return Err(StoreError::Unavailable {
                message: format!("invalid slot name '{slot}'"),
            });
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

impl Storage for FileStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&mut self, slot: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(slot)?;
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        f.write_all(value.as_bytes())
            .and_then(|_| f.flush())
            .map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }
}

/// Owns the task collection and keeps its storage slot up to date.
pub struct TaskStore {
    storage: Box<dyn Storage>,
    slot: String,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the collection from `slot`, falling back to the seed tasks when
    /// the slot is empty, unreadable or does not hold a JSON array of tasks.
    pub fn load(storage: Box<dyn Storage>, slot: &str) -> Self {
        let now = Utc::now();
        let loaded = match storage.read(slot) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(tasks) => Some(dedup_ids(tasks)),
                Err(e) => {
                    warn!(slot, error = %e, "stored tasks are corrupt, using seed data");
                    None
                }
            },
            Ok(None) => {
                info!(slot, "no stored tasks, using seed data");
                None
            }
            Err(e) => {
                warn!(slot, error = ?e, "failed to read stored tasks, using seed data");
                None
            }
        };

        let seeded = loaded.is_none();
        let tasks = loaded.unwrap_or_else(|| seed_tasks(now));
        let mut store = TaskStore {
            storage,
            slot: slot.to_string(),
            tasks,
        };
        if seeded {
            store.persist_or_warn();
        }
        debug!(slot, count = store.tasks.len(), "task store loaded");
        store
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Name of the storage slot this store writes to.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a new incomplete task. Blank text is ignored and returns `None`.
    pub fn add(&mut self, text: &str) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring blank task text");
            return None;
        }
        let now = Utc::now();
        let id = self.next_id(now);
        self.tasks.push(Task::new(id, text, now));
        info!(id, "added task");
        self.persist_or_warn();
        self.tasks.last()
    }

    /// Flip the completion state of a task. Unknown IDs are ignored.
    pub fn toggle(&mut self, id: u64) -> Option<&Task> {
        let idx = self.position(id)?;
        self.tasks[idx].toggle(Utc::now());
        info!(id, completed = self.tasks[idx].completed, "toggled task");
        self.persist_or_warn();
        self.tasks.get(idx)
    }

    /// Remove a task by ID, returning it. Unknown IDs are ignored.
    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let idx = self.position(id)?;
        let removed = self.tasks.remove(idx);
        info!(id, "removed task");
        self.persist_or_warn();
        Some(removed)
    }

    /// Remove every completed task and return how many were dropped.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        info!(removed, "cleared completed tasks");
        self.persist_or_warn();
        removed
    }

    /// Serialize the whole collection into the storage slot.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(&self.tasks)?;
        self.storage.write(&self.slot, &data)
    }

    fn persist_or_warn(&mut self) {
        if let Err(e) = self.persist() {
            warn!(slot = %self.slot, error = ?e, "failed to persist tasks, keeping in-memory state");
        }
    }

    fn position(&self, id: u64) -> Option<usize> {
        let idx = self.tasks.iter().position(|t| t.id == id);
        if idx.is_none() {
            debug!(id, "no task with this id");
        }
        idx
    }

    /// Millisecond timestamp of `now`, bumped past every existing ID.
    ///
    /// When the largest ID is `u64::MAX` nothing can follow it, so the
    /// smallest unused ID is taken instead.
    fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let last = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        match last.checked_add(1) {
            Some(next) => millis.max(next),
            None => {
                let used: HashSet<u64> = self.tasks.iter().map(|t| t.id).collect();
                let id = (1..=u64::MAX).find(|id| !used.contains(id)).unwrap_or(0);
                warn!(id, "task ids exhausted at u64::MAX, reusing a free id");
                id
            }
        }
    }
}

/// Drop tasks whose ID was already seen, keeping the first occurrence.
fn dedup_ids(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let before = tasks.len();
    let tasks: Vec<Task> = tasks.into_iter().filter(|t| seen.insert(t.id)).collect();
    if tasks.len() != before {
        warn!(dropped = before - tasks.len(), "dropped tasks with duplicate ids");
    }
    tasks
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use crate::view::{counts, progress_percent, Counts};

    /// In-memory storage whose contents stay visible to the test through a shared handle.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryStorage {
        pub slots: Rc<RefCell<HashMap<String, String>>>,
    }

    impl MemoryStorage {
        /// Storage with `value` already in `slot`.
        pub fn with(slot: &str, value: &str) -> Self {
            let storage = MemoryStorage::default();
            storage.slots.borrow_mut().insert(slot.to_string(), value.to_string());
            storage
        }

        /// Current raw value of `slot`.
        pub fn get(&self, slot: &str) -> Option<String> {
            self.slots.borrow().get(slot).cloned()
        }
    }

    impl Storage for MemoryStorage {
        fn read(&self, slot: &str) -> Result<Option<String>, StoreError> {
            Ok(self.get(slot))
        }

        fn write(&mut self, slot: &str, value: &str) -> Result<(), StoreError> {
            self.slots.borrow_mut().insert(slot.to_string(), value.to_string());
            Ok(())
        }
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn read(&self, _slot: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable { message: "read disabled".into() })
        }

        fn write(&mut self, _slot: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable { message: "write disabled".into() })
        }
    }

    pub(crate) fn seeded_store() -> (TaskStore, MemoryStorage) {
        let storage = MemoryStorage::default();
        let store = TaskStore::load(Box::new(storage.clone()), DEFAULT_SLOT);
        (store, storage)
    }

    fn stored_tasks(storage: &MemoryStorage) -> Vec<Task> {
        serde_json::from_str(&storage.get(DEFAULT_SLOT).unwrap()).unwrap()
    }

    #[test]
    fn load_seeds_when_slot_is_empty_and_persists_seed() {
        let (store, storage) = seeded_store();
        assert_eq!(store.tasks().len(), 3);
        assert_eq!(stored_tasks(&storage), store.tasks());
    }

    #[test]
    fn load_falls_back_to_seed_on_corrupt_or_non_array_values() {
        for raw in ["{not json", "{\"id\":1}", "42", "null", "[{\"id\":\"x\"}]"] {
            let storage = MemoryStorage::with(DEFAULT_SLOT, raw);
            let store = TaskStore::load(Box::new(storage), DEFAULT_SLOT);
            assert_eq!(store.tasks().len(), 3, "raw value {raw:?}");
        }
    }

    #[test]
    fn load_keeps_an_empty_array() {
        let storage = MemoryStorage::with(DEFAULT_SLOT, "[]");
        let store = TaskStore::load(Box::new(storage), DEFAULT_SLOT);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn load_survives_unreadable_storage() {
        let store = TaskStore::load(Box::new(FailingStorage), DEFAULT_SLOT);
        assert_eq!(store.tasks().len(), 3);
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let raw = r#"[
            {"id":5,"text":"a","completed":false,"createdAt":"2024-01-01T00:00:00Z"},
            {"id":5,"text":"b","completed":true,"createdAt":"2024-01-01T00:00:00Z"}
        ]"#;
        let store = TaskStore::load(Box::new(MemoryStorage::with(DEFAULT_SLOT, raw)), DEFAULT_SLOT);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].text, "a");
    }

    #[test]
    fn add_rejects_blank_text() {
        let (mut store, _) = seeded_store();
        let before = store.tasks().to_vec();
        assert!(store.add("").is_none());
        assert!(store.add("   ").is_none());
        assert!(store.add("\t\n").is_none());
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn add_appends_trimmed_incomplete_task_and_persists() {
        let (mut store, storage) = seeded_store();
        let task = store.add("  Learn Rust  ").cloned().unwrap();
        assert_eq!(task.text, "Learn Rust");
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_eq!(store.tasks().last(), Some(&task));
        assert_eq!(stored_tasks(&storage).last(), Some(&task));
    }

    #[test]
    fn ids_stay_unique_and_increasing_under_rapid_adds() {
        let (mut store, _) = seeded_store();
        let ids: Vec<u64> = (0..50)
            .map(|i| store.add(&format!("task {i}")).unwrap().id)
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn add_after_max_id_picks_an_unused_id() {
        let raw = r#"[{"id":18446744073709551615,"text":"a","completed":false,
                       "createdAt":"2024-01-01T00:00:00Z"}]"#;
        let mut store = TaskStore::load(Box::new(MemoryStorage::with(DEFAULT_SLOT, raw)), DEFAULT_SLOT);
        let first = store.add("b").unwrap().id;
        let second = store.add("c").unwrap().id;
        let ids: HashSet<u64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 3);
        assert_ne!(first, u64::MAX);
        assert_ne!(second, u64::MAX);
    }

    #[test]
    fn add_then_remove_restores_collection() {
        let (mut store, storage) = seeded_store();
        let before = store.tasks().to_vec();
        let id = store.add("X").unwrap().id;
        let removed = store.remove(id).unwrap();
        assert_eq!(removed.text, "X");
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(stored_tasks(&storage), before);
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let (mut store, _) = seeded_store();
        let original = store.tasks()[1].clone();
        let toggled = store.toggle(original.id).cloned().unwrap();
        assert!(toggled.completed);
        assert!(toggled.completed_at.is_some());
        store.toggle(original.id);
        assert_eq!(store.get(original.id), Some(&original));
    }

    #[test]
    fn missing_ids_are_no_ops() {
        let (mut store, storage) = seeded_store();
        let before = store.tasks().to_vec();
        storage.slots.borrow_mut().clear();
        assert!(store.toggle(999).is_none());
        assert!(store.remove(999).is_none());
        assert_eq!(store.tasks(), before.as_slice());
        assert!(storage.get(DEFAULT_SLOT).is_none(), "no persist on a no-op");
    }

    #[test]
    fn clear_completed_removes_only_completed_tasks() {
        let (mut store, storage) = seeded_store();
        let id = store.add("Learn Rust").unwrap().id;
        store.toggle(id);
        assert_eq!(store.clear_completed(), 2);
        assert!(store.tasks().iter().all(|t| !t.completed));
        assert_eq!(stored_tasks(&storage).len(), 2);
        assert_eq!(store.clear_completed(), 0);
    }

    #[test]
    fn persist_failure_keeps_in_memory_state() {
        let mut store = TaskStore::load(Box::new(FailingStorage), DEFAULT_SLOT);
        let id = store.add("Learn Rust").unwrap().id;
        assert!(store.toggle(id).unwrap().completed);
        assert_eq!(store.tasks().len(), 4);
        assert!(store.persist().is_err());
    }

    #[test]
    fn reload_after_mutations_reproduces_tasks() {
        let (mut store, storage) = seeded_store();
        let id = store.add("Learn Rust").unwrap().id;
        store.toggle(id);
        store.remove(2);
        store.persist().unwrap();

        let reloaded = TaskStore::load(Box::new(storage.clone()), DEFAULT_SLOT);
        let key = |t: &Task| (t.id, t.text.clone(), t.completed);
        assert_eq!(
            reloaded.tasks().iter().map(key).collect::<Vec<_>>(),
            store.tasks().iter().map(key).collect::<Vec<_>>()
        );
    }

    #[test]
    fn seed_scenario_counts_and_progress() {
        let (mut store, _) = seeded_store();
        let id = store.add("Learn Rust").unwrap().id;
        assert_eq!(store.tasks().len(), 4);
        assert_eq!(counts(store.tasks()), Counts { total: 4, active: 3, completed: 1 });

        store.toggle(id);
        assert_eq!(counts(store.tasks()), Counts { total: 4, active: 2, completed: 2 });
        assert_eq!(progress_percent(store.tasks()), 50);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(&dir.path().join("nested")).unwrap();
        let mut store = TaskStore::load(Box::new(storage.clone()), DEFAULT_SLOT);
        let id = store.add("Learn Rust").unwrap().id;

        let path = storage.slot_path(DEFAULT_SLOT).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = TaskStore::load(Box::new(storage), DEFAULT_SLOT);
        assert_eq!(reloaded.tasks(), store.tasks());
        assert!(reloaded.get(id).is_some());
    }

    #[test]
    fn file_storage_missing_slot_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.read("absent").unwrap().is_none());
    }

    #[test]
    fn file_storage_rejects_path_like_slot_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.write("../escape", "[]").is_err());
        assert!(storage.read("").is_err());
    }
}
