use board_infinity::form::{FormOutcome, TaskForm, DATE, TITLE};
use board_infinity::store::{DocumentStore, Fields, MemoryStore, Subscription};
use board_infinity::{KanbanBoard, Result, Status};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Request {
    Add(Fields),
    Update(String, Fields),
    Delete(String),
}

/// Memory store that remembers every request it receives.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    requests: Mutex<Vec<Request>>,
}

impl RecordingStore {
    fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    fn clear(&self) {
        self.requests.lock().clear();
    }
}

impl DocumentStore for RecordingStore {
    fn subscribe(&self, collection: &str) -> Result<Subscription> {
        self.inner.subscribe(collection)
    }

    fn add(&self, collection: &str, fields: Fields) -> Result<String> {
        self.requests.lock().push(Request::Add(fields.clone()));
        self.inner.add(collection, fields)
    }

    fn update(&self, collection: &str, id: &str, partial: Fields) -> Result<()> {
        self.requests
            .lock()
            .push(Request::Update(id.to_string(), partial.clone()));
        self.inner.update(collection, id, partial)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.requests.lock().push(Request::Delete(id.to_string()));
        self.inner.delete(collection, id)
    }
}

fn object(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

fn mounted() -> (Arc<RecordingStore>, KanbanBoard) {
    let store = Arc::new(RecordingStore::default());
    let board = KanbanBoard::mount(store.clone(), "tasks").unwrap();
    (store, board)
}

fn submit_form(title: &str, date: &str) -> FormOutcome {
    let mut form = TaskForm::new();
    form.type_into(TITLE, title);
    form.type_into(DATE, date);
    form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
}

#[test]
fn every_task_lands_in_exactly_one_column() {
    let (store, mut board) = mounted();
    let statuses = ["TODO", "IN PROGRESS", "COMPLETED", "TODO", "COMPLETED"];
    for (i, status) in statuses.iter().enumerate() {
        store
            .inner
            .add(
                "tasks",
                object(json!({ "title": format!("t{i}"), "date": "2024-01-01", "status": status })),
            )
            .unwrap();
    }
    board.refresh().unwrap();

    let columns = board.columns();
    for task in board.tasks() {
        let hits: Vec<Status> = columns
            .iter()
            .filter(|c| c.tasks.iter().any(|t| t.id == task.id))
            .map(|c| c.status)
            .collect();
        assert_eq!(hits, vec![task.status]);
    }
    let total: usize = columns.iter().map(|c| c.tasks.len()).sum();
    assert_eq!(total, board.tasks().len());
}

#[test]
fn submitting_defaults_emits_one_create_request() {
    let (store, board) = mounted();

    let FormOutcome::Submitted(task) = submit_form("Write spec", "2024-01-01") else {
        panic!("form should submit");
    };
    board.create(&task).unwrap();

    assert_eq!(
        store.requests(),
        vec![Request::Add(object(json!({
            "title": "Write spec",
            "description": "",
            "date": "2024-01-01",
            "status": "TODO",
            "priority": "Medium",
        })))]
    );
}

#[test]
fn empty_title_emits_nothing() {
    let (store, _board) = mounted();
    assert_eq!(submit_form("", "2024-01-01"), FormOutcome::Pending);
    assert!(store.requests().is_empty());
}

#[test]
fn change_status_updates_only_status() {
    let (store, mut board) = mounted();
    let FormOutcome::Submitted(task) = submit_form("Write spec", "2024-01-01") else {
        panic!("form should submit");
    };
    let id = board.create(&task).unwrap();
    board.refresh().unwrap();
    store.clear();

    board.change_status(&id, Status::Completed).unwrap();
    assert_eq!(
        store.requests(),
        vec![Request::Update(
            id.clone(),
            object(json!({ "status": "COMPLETED" }))
        )]
    );

    board.refresh().unwrap();
    let updated = board.task(&id).unwrap();
    assert_eq!(updated.status, Status::Completed);
    assert_eq!(updated.title, "Write spec");
    assert_eq!(updated.date, "2024-01-01");
}

#[test]
fn delete_removes_task_from_every_column() {
    let (store, mut board) = mounted();
    let FormOutcome::Submitted(task) = submit_form("Write spec", "2024-01-01") else {
        panic!("form should submit");
    };
    let id = board.create(&task).unwrap();
    board.refresh().unwrap();
    store.clear();

    board.delete(&id).unwrap();
    assert_eq!(store.requests(), vec![Request::Delete(id.clone())]);

    // Still visible until the store pushes the new snapshot.
    assert!(board.task(&id).is_some());
    board.refresh().unwrap();
    assert!(board
        .columns()
        .iter()
        .all(|c| c.tasks.iter().all(|t| t.id != id)));
}

#[test]
fn last_snapshot_wins() {
    let (store, mut board) = mounted();
    let a = store
        .inner
        .add("tasks", object(json!({ "title": "a", "date": "2024-01-01", "status": "TODO" })))
        .unwrap();
    store
        .inner
        .update("tasks", &a, object(json!({ "status": "IN PROGRESS" })))
        .unwrap();
    store.inner.delete("tasks", &a).unwrap();
    store
        .inner
        .add("tasks", object(json!({ "title": "b", "date": "2024-01-01", "status": "TODO" })))
        .unwrap();

    assert!(board.refresh().unwrap());
    let titles: Vec<&str> = board.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["b"]);
}

#[test]
fn unmount_releases_the_only_listener() {
    let store = Arc::new(MemoryStore::new());
    let board = KanbanBoard::mount(store.clone(), "tasks").unwrap();
    assert_eq!(store.listener_count("tasks"), 1);
    board.unmount();
    assert_eq!(store.listener_count("tasks"), 0);

    let again = KanbanBoard::mount(store.clone(), "tasks").unwrap();
    assert_eq!(store.listener_count("tasks"), 1);
    drop(again);
    assert_eq!(store.listener_count("tasks"), 0);
}
