//! Key-value stores backing the hash registry.
//!
//! Keys are `<hash>.<ext>`, values the ordered source list. Stores must make
//! [`HashStore::put_if_absent`] atomic per key; the registry relies on it and
//! does no locking of its own.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use thiserror::Error;

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error")]
    Io(#[from] io::Error),

    #[error("store file is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// Hash → source-list store shared by concurrent page renders.
pub trait HashStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError>;

    fn put(&self, key: &str, sources: &[String]) -> Result<(), StoreError>;

    /// Insert unless `key` exists. Returns the existing value when it does.
    fn put_if_absent(
        &self,
        key: &str,
        sources: &[String],
    ) -> Result<Option<Vec<String>>, StoreError>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// Process-local store (thread-safe).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HashStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.entries.get(key).map(|r| r.clone()))
    }

    fn put(&self, key: &str, sources: &[String]) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), sources.to_vec());
        Ok(())
    }

    fn put_if_absent(
        &self,
        key: &str,
        sources: &[String],
    ) -> Result<Option<Vec<String>>, StoreError> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(e) => Ok(Some(e.get().clone())),
            Entry::Vacant(e) => {
                e.insert(sources.to_vec());
                Ok(None)
            }
        }
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// JSON file store. Every write rewrites the file atomically (temp + rename).
///
/// Each read-modify-write cycle holds an exclusive OS lock on `<path>.lock`,
/// so separate handles and separate processes sharing one file see a single
/// check-then-set. The mutex keeps threads of one handle off the lock file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

type Entries = BTreeMap<String, Vec<String>>;

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Run `f` while holding both the handle mutex and the file lock.
    fn locked<T>(&self, f: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let _guard = self.lock.lock();
        self.create_parent()?;
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock_file.lock()?;
        // Released when `lock_file` is dropped
        f()
    }

    fn create_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Entries, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl HashStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<String>>, StoreError> {
        self.locked(|| Ok(self.load()?.remove(key)))
    }

    fn put(&self, key: &str, sources: &[String]) -> Result<(), StoreError> {
        self.locked(|| {
            let mut entries = self.load()?;
            entries.insert(key.to_string(), sources.to_vec());
            self.save(&entries)
        })
    }

    fn put_if_absent(
        &self,
        key: &str,
        sources: &[String],
    ) -> Result<Option<Vec<String>>, StoreError> {
        self.locked(|| {
            let mut entries = self.load()?;
            if let Some(existing) = entries.get(key) {
                return Ok(Some(existing.clone()));
            }
            entries.insert(key.to_string(), sources.to_vec());
            self.save(&entries)?;
            Ok(None)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_memory_put_if_absent() {
        let store = MemoryStore::new();
        assert_eq!(store.put_if_absent("k.css", &list(&["/a"])).unwrap(), None);
        assert_eq!(
            store.put_if_absent("k.css", &list(&["/b"])).unwrap(),
            Some(list(&["/a"]))
        );
        assert_eq!(store.get("k.css").unwrap(), Some(list(&["/a"])));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_concurrent_claims() {
        let store = MemoryStore::new();
        let winners: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    s.spawn(move || {
                        store
                            .put_if_absent("race.js", &[format!("/{i}.js")])
                            .unwrap()
                            .is_none() as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_file_store_shared_between_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("optm.json");
        let handles = [FileStore::new(&path), FileStore::new(&path)];

        std::thread::scope(|s| {
            for (h, store) in handles.iter().enumerate() {
                s.spawn(move || {
                    for i in 0..100 {
                        let key = format!("{h}-{i}.js");
                        let claimed = store.put_if_absent(&key, &[format!("/{key}")]).unwrap();
                        assert_eq!(claimed, None);
                    }
                });
            }
        });

        let reopened = FileStore::new(&path);
        for h in 0..2 {
            for i in 0..100 {
                let key = format!("{h}-{i}.js");
                assert_eq!(reopened.get(&key).unwrap(), Some(vec![format!("/{key}")]));
            }
        }
    }

    #[test]
    fn test_file_store_single_winner_across_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("optm.json");
        let winners: usize = std::thread::scope(|s| {
            let spawned: Vec<_> = (0..4)
                .map(|i| {
                    let path = &path;
                    s.spawn(move || {
                        let store = FileStore::new(path);
                        store
                            .put_if_absent("race.css", &[format!("/{i}.css")])
                            .unwrap()
                            .is_none() as usize
                    })
                })
                .collect();
            spawned.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_file_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/optm.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("a.css").unwrap(), None);
        store.put("a.css", &list(&["/x.css"])).unwrap();
        assert_eq!(store.put_if_absent("b.js", &list(&["/y.js"])).unwrap(), None);

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("a.css").unwrap(), Some(list(&["/x.css"])));
        assert_eq!(
            reopened.put_if_absent("b.js", &list(&["/z.js"])).unwrap(),
            Some(list(&["/y.js"]))
        );
    }

    #[test]
    fn test_file_store_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("optm.json");
        fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.get("a.css"), Err(StoreError::Json(_))));
    }
}
