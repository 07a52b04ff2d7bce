use crate::error::Result;
use crate::store::{DocumentStore, Fields, Snapshot, Subscription};
use crate::task::{NewTask, Status, Task};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tasks of one status, borrowed from the board in snapshot order.
#[derive(Debug)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

/// Recorded request to edit a task. Editing has no effect on the store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub id: String,
}

/// Root state of the board: a read-only mirror of one store collection.
///
/// The task list is only ever replaced wholesale from a store snapshot.
/// `create`, `change_status` and `delete` go straight to the store and the
/// result shows up on the next [`KanbanBoard::refresh`].
pub struct KanbanBoard {
    store: Arc<dyn DocumentStore>,
    collection: String,
    subscription: Subscription,
    tasks: Vec<Task>,
}

impl KanbanBoard {
    /// Subscribe to `collection` and load its current contents.
    pub fn mount(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Result<Self> {
        let collection = collection.into();
        let mut subscription = store.subscribe(&collection)?;
        let snapshot = subscription.current();

        let mut board = Self {
            store,
            collection,
            subscription,
            tasks: Vec::new(),
        };
        board.apply(&snapshot);
        info!(collection = %board.collection, tasks = board.tasks.len(), "board mounted");
        Ok(board)
    }

    /// Release the subscription.
    pub fn unmount(self) {
        info!(collection = %self.collection, "board unmounted");
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Pull external changes and apply the newest snapshot, if any.
    /// Returns whether the task list was replaced.
    pub fn refresh(&mut self) -> Result<bool> {
        self.store.sync()?;
        match self.subscription.next_snapshot()? {
            Some(snapshot) => {
                self.apply(&snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn apply(&mut self, snapshot: &Snapshot) {
        self.tasks = snapshot
            .iter()
            .filter_map(|doc| match Task::from_document(doc) {
                Ok(task) => Some(task),
                Err(err) => {
                    warn!(collection = %self.collection, "skipping document: {err}");
                    None
                }
            })
            .collect();
        debug!(collection = %self.collection, tasks = self.tasks.len(), "snapshot applied");
    }

    pub fn create(&self, task: &NewTask) -> Result<String> {
        let id = self.store.add(&self.collection, task.to_fields())?;
        info!(%id, title = %task.title, "task created");
        Ok(id)
    }

    pub fn change_status(&self, id: &str, status: Status) -> Result<()> {
        let mut partial = Fields::new();
        partial.insert("status".into(), status.as_str().into());
        self.store.update(&self.collection, id, partial)?;
        info!(id, %status, "task status changed");
        Ok(())
    }

    /// Editing is not implemented; the request is only logged.
    pub fn edit(&self, id: &str) -> EditRequest {
        info!(id, "edit requested");
        EditRequest { id: id.to_string() }
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(&self.collection, id)?;
        info!(id, "task deleted");
        Ok(())
    }

    pub fn get_tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn column(&self, status: Status) -> Column<'_> {
        Column {
            status,
            tasks: self.get_tasks_by_status(status),
        }
    }

    pub fn columns(&self) -> [Column<'_>; 3] {
        Status::ALL.map(|status| self.column(status))
    }
}
