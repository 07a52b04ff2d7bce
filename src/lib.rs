//! Terminal task board mirroring a live document store.
//!
//! Tasks live in a [`store::DocumentStore`] collection. A [`KanbanBoard`]
//! subscribes to it, keeps a read-only copy of the tasks and splits them into
//! the TODO, IN PROGRESS and COMPLETED columns. Changes are sent to the store
//! and come back through the subscription.

pub mod config;
pub mod error;
pub mod form;
pub mod kanban_board;
pub mod logging;
pub mod store;
pub mod task;
pub mod ui;

pub use config::BoardConfig;
pub use error::{BoardError, Result};
pub use kanban_board::{Column, EditRequest, KanbanBoard};
pub use task::{NewTask, Priority, Status, Task};
