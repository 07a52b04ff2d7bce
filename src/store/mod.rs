//! Document store the board mirrors.
//!
//! A store owns named collections of documents. Each collection publishes a
//! full [`Snapshot`] on every change; subscribers only ever see whole
//! snapshots, and a slow subscriber skips straight to the latest one.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Field map of a single document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Full contents of a collection, in insertion order.
pub type Snapshot = Arc<Vec<StoredDocument>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

/// Operations the board needs from a document store.
pub trait DocumentStore: Send + Sync {
    /// Open a live subscription to a collection. The subscription holds the
    /// current snapshot immediately and is released when dropped.
    fn subscribe(&self, collection: &str) -> Result<Subscription>;

    /// Insert a new document and return the id the store generated for it.
    fn add(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Merge `partial` into an existing document.
    fn update(&self, collection: &str, id: &str, partial: Fields) -> Result<()>;

    /// Remove a document. Removing a missing document is not an error.
    fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Pull changes made outside this process into the subscriptions.
    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

/// Live view of one collection. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    receiver: watch::Receiver<Snapshot>,
}

impl Subscription {
    pub(crate) fn new(collection: &str, receiver: watch::Receiver<Snapshot>) -> Self {
        debug!(collection, "subscribed");
        Self {
            collection: collection.to_string(),
            receiver,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Latest snapshot, marking it as seen.
    pub fn current(&mut self) -> Snapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// The newest snapshot if one arrived since the last call, otherwise `None`.
    pub fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        match self.receiver.has_changed() {
            Ok(true) => Ok(Some(self.current())),
            Ok(false) => Ok(None),
            Err(_) => Err(BoardError::Closed(self.collection.clone())),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(collection = %self.collection, "unsubscribed");
    }
}

fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
