use super::{new_document_id, DocumentStore, Fields, Snapshot, StoredDocument, Subscription};
use crate::error::{BoardError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

struct Collection {
    docs: Vec<StoredDocument>,
    sender: watch::Sender<Snapshot>,
}

impl Collection {
    fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            docs: Vec::new(),
            sender,
        }
    }

    fn publish(&self) {
        self.sender.send_replace(Arc::new(self.docs.clone()));
    }
}

/// In-process document store.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open subscriptions on a collection.
    pub fn listener_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map_or(0, |c| c.sender.receiver_count())
    }

    /// Current documents of a collection, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        self.collections
            .lock()
            .get(collection)
            .map(|c| c.docs.clone())
            .unwrap_or_default()
    }

    /// Names of every collection that has been touched.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Replace the whole collection and notify subscribers.
    pub fn replace(&self, collection: &str, docs: Vec<StoredDocument>) {
        let mut collections = self.collections.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        entry.docs = docs;
        entry.publish();
    }
}

impl DocumentStore for MemoryStore {
    fn subscribe(&self, collection: &str) -> Result<Subscription> {
        let mut collections = self.collections.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        Ok(Subscription::new(collection, entry.sender.subscribe()))
    }

    fn add(&self, collection: &str, mut fields: Fields) -> Result<String> {
        fields.remove("id");
        let id = new_document_id();

        let mut collections = self.collections.lock();
        let entry = collections
            .entry(collection.to_string())
            .or_insert_with(Collection::new);
        entry.docs.push(StoredDocument {
            id: id.clone(),
            fields,
        });
        entry.publish();

        debug!(collection, %id, "document added");
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, partial: Fields) -> Result<()> {
        let mut collections = self.collections.lock();
        let not_found = || BoardError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        let entry = collections.get_mut(collection).ok_or_else(not_found)?;
        let doc = entry
            .docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(not_found)?;

        for (key, value) in partial {
            if key != "id" {
                doc.fields.insert(key, value);
            }
        }
        entry.publish();

        debug!(collection, id, "document updated");
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut collections = self.collections.lock();
        let Some(entry) = collections.get_mut(collection) else {
            return Ok(());
        };
        let before = entry.docs.len();
        entry.docs.retain(|d| d.id != id);
        if entry.docs.len() != before {
            entry.publish();
            debug!(collection, id, "document deleted");
        } else {
            debug!(collection, id, "delete of missing document ignored");
        }
        Ok(())
    }
}
