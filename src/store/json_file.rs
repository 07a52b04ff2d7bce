use super::{DocumentStore, Fields, MemoryStore, StoredDocument, Subscription};
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// On-disk layout: collection name to its documents.
type FileContents = BTreeMap<String, Vec<StoredDocument>>;

/// Document store persisted to a JSON file.
///
/// Every mutation re-reads the file, applies the change and rewrites it, so
/// documents written by another process are kept. [`DocumentStore::sync`]
/// reloads the file when its modification time changes, so several boards
/// pointed at the same file see each other's changes.
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    last_seen: Mutex<Option<SystemTime>>,
    /// Held across read-modify-write so mutations in this process do not interleave.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            inner: MemoryStore::new(),
            last_seen: Mutex::new(None),
            write_lock: Mutex::new(()),
        };
        store.load()?;
        info!(path = %store.path.display(), "opened task store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    fn read_file(&self) -> Result<FileContents> {
        if !self.path.exists() {
            return Ok(FileContents::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(FileContents::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    /// Replace the in-memory collections with the file contents. Collections
    /// whose documents did not change are not republished.
    fn load(&self) -> Result<()> {
        // Recorded before parsing so a broken file is reported once, not on every sync.
        *self.last_seen.lock() = self.modified();
        let contents = self.read_file()?;

        for name in self.inner.collection_names() {
            if !contents.contains_key(&name) && !self.inner.documents(&name).is_empty() {
                self.inner.replace(&name, Vec::new());
            }
        }
        for (name, docs) in contents {
            if self.inner.documents(&name) != docs {
                self.inner.replace(&name, docs);
            }
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let contents: FileContents = self
            .inner
            .collection_names()
            .into_iter()
            .map(|name| {
                let docs = self.inner.documents(&name);
                (name, docs)
            })
            .collect();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&contents)?)?;

        *self.last_seen.lock() = self.modified();
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn subscribe(&self, collection: &str) -> Result<Subscription> {
        self.inner.subscribe(collection)
    }

    fn add(&self, collection: &str, fields: Fields) -> Result<String> {
        let _guard = self.write_lock.lock();
        self.load()?;
        let id = self.inner.add(collection, fields)?;
        self.save()?;
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, partial: Fields) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.load()?;
        self.inner.update(collection, id, partial)?;
        self.save()
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.load()?;
        self.inner.delete(collection, id)?;
        self.save()
    }

    fn sync(&self) -> Result<()> {
        let current = self.modified();
        if current == *self.last_seen.lock() {
            return Ok(());
        }
        debug!(path = %self.path.display(), "task store changed on disk, reloading");
        let _guard = self.write_lock.lock();
        self.load()
    }
}
