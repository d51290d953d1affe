//! Keyed whole-document persistence.
//!
//! Each key maps to one JSON object. `load`/`save` read and write the whole
//! document; `update` runs a read-modify-write under a per-key lock so two
//! sessions sharing a store cannot lose each other's writes.
//!
//! Layout for [`FileStore`]:
//!   .techdev/
//!     accounts.json
//!     tech_leads.json
//!     teams.json
//!     standups.json

use crate::error::{Result, TechDevError};
use crate::{io, paths};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

pub type Document = serde_json::Map<String, serde_json::Value>;

pub trait DocumentStore: Send + Sync {
    /// Read the whole document for `key`. A missing key is an empty document.
    fn load(&self, key: &str) -> Result<Document>;

    /// Replace the whole document for `key`.
    fn save(&self, key: &str, doc: &Document) -> Result<()>;

    /// Atomic read-modify-write of one key. Nothing is written if `apply` fails.
    fn update(&self, key: &str, apply: &mut dyn FnMut(&mut Document) -> Result<()>)
        -> Result<()>;
}

// ---------------------------------------------------------------------------
// Per-key locks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn for_key(&self, key: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| TechDevError::StoreUnavailable("lock table poisoned".to_string()))?;
        Ok(locks.entry(key.to_string()).or_default().clone())
    }
}

fn acquire<'a, T>(m: &'a Mutex<T>, key: &str) -> Result<MutexGuard<'a, T>> {
    m.lock()
        .map_err(|_| TechDevError::StoreUnavailable(format!("lock for '{key}' poisoned")))
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One JSON file per key under `.techdev/`.
pub struct FileStore {
    root: PathBuf,
    locks: KeyLocks,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: KeyLocks::default(),
        }
    }

    fn read(&self, key: &str) -> Result<Document> {
        let path = paths::document_path(&self.root, key);
        if !path.exists() {
            return Ok(Document::new());
        }
        let data = std::fs::read_to_string(&path).map_err(|e| {
            TechDevError::StoreUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        if data.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(&data).map_err(|e| {
            TechDevError::StoreUnavailable(format!("corrupt document {}: {e}", path.display()))
        })
    }

    fn write(&self, key: &str, doc: &Document) -> Result<()> {
        let path = paths::document_path(&self.root, key);
        let data = serde_json::to_string_pretty(doc)?;
        io::atomic_write(&path, data.as_bytes()).map_err(|e| {
            TechDevError::StoreUnavailable(format!("cannot write {}: {e}", path.display()))
        })
    }
}

impl DocumentStore for FileStore {
    fn load(&self, key: &str) -> Result<Document> {
        self.read(key)
    }

    fn save(&self, key: &str, doc: &Document) -> Result<()> {
        let lock = self.locks.for_key(key)?;
        let _guard = acquire(&*lock, key)?;
        self.write(key, doc)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(&mut Document) -> Result<()>,
    ) -> Result<()> {
        let lock = self.locks.for_key(key)?;
        let _guard = acquire(&*lock, key)?;
        let mut doc = self.read(key)?;
        apply(&mut doc)?;
        self.write(key, &doc)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Document> {
        let docs = acquire(&self.docs, key)?;
        Ok(docs.get(key).cloned().unwrap_or_default())
    }

    fn save(&self, key: &str, doc: &Document) -> Result<()> {
        let mut docs = acquire(&self.docs, key)?;
        docs.insert(key.to_string(), doc.clone());
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(&mut Document) -> Result<()>,
    ) -> Result<()> {
        let mut docs = acquire(&self.docs, key)?;
        let mut doc = docs.get(key).cloned().unwrap_or_default();
        apply(&mut doc)?;
        docs.insert(key.to_string(), doc);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

pub fn decode_entry<T: DeserializeOwned>(doc: &Document, key: &str) -> Result<Option<T>> {
    match doc.get(key) {
        Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
        None => Ok(None),
    }
}

pub fn encode_entry<T: Serialize>(doc: &mut Document, key: &str, value: &T) -> Result<()> {
    doc.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(())
}

/// Read-only load that degrades to an empty document when the store is
/// unreachable or the document is corrupt.
pub fn load_or_empty(store: &dyn DocumentStore, key: &str) -> Document {
    match store.load(key) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed; treating document as empty");
            Document::new()
        }
    }
}

/// Like [`load_or_empty`], also skipping entries that fail to decode.
pub fn read_entries<T: DeserializeOwned>(store: &dyn DocumentStore, key: &str) -> Vec<(String, T)> {
    load_or_empty(store, key)
        .into_iter()
        .filter_map(|(k, v)| match serde_json::from_value(v) {
            Ok(t) => Some((k, t)),
            Err(e) => {
                tracing::warn!(key, entry = %k, error = %e, "skipping undecodable entry");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn missing_key_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load("teams").unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let mut doc = Document::new();
        doc.insert("alice".into(), json!({ "role": "tech_lead" }));
        store.save("accounts", &doc).unwrap();

        assert!(dir.path().join(".techdev/accounts.json").exists());
        let loaded = store.load("accounts").unwrap();
        assert_eq!(loaded["alice"]["role"], "tech_lead");
    }

    #[test]
    fn update_is_skipped_when_apply_fails() {
        let store = MemoryStore::new();
        let mut doc = Document::new();
        doc.insert("a".into(), json!(1));
        store.save("k", &doc).unwrap();

        let result = store.update("k", &mut |d| {
            d.insert("b".into(), json!(2));
            Err(TechDevError::MissingField("b"))
        });
        assert!(result.is_err());
        assert!(!store.load("k").unwrap().contains_key("b"));
    }

    #[test]
    fn corrupt_file_fails_load_but_degrades_for_readers() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".techdev")).unwrap();
        std::fs::write(dir.path().join(".techdev/teams.json"), "{not json").unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.load("teams"),
            Err(TechDevError::StoreUnavailable(_))
        ));
        assert!(load_or_empty(&store, "teams").is_empty());
    }

    #[test]
    fn update_propagates_corrupt_read() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".techdev")).unwrap();
        std::fs::write(dir.path().join(".techdev/teams.json"), "[1, 2").unwrap();
        let store = FileStore::new(dir.path());

        let result = store.update("teams", &mut |_| Ok(()));
        assert!(matches!(result, Err(TechDevError::StoreUnavailable(_))));
        // The corrupt document is left for an operator to inspect.
        let raw = std::fs::read_to_string(dir.path().join(".techdev/teams.json")).unwrap();
        assert_eq!(raw, "[1, 2");
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .update("counters", &mut |d| {
                            d.insert(format!("writer-{i}"), json!(i));
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.load("counters").unwrap().len(), 8);
    }

    #[test]
    fn read_entries_skips_bad_rows() {
        let store = MemoryStore::new();
        let mut doc = Document::new();
        doc.insert("good".into(), json!(3));
        doc.insert("bad".into(), json!("three"));
        store.save("n", &doc).unwrap();

        let entries: Vec<(String, u32)> = read_entries(&store, "n");
        assert_eq!(entries, vec![("good".to_string(), 3)]);
    }
}
