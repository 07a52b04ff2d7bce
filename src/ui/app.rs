use crate::form::{FormOutcome, TaskForm};
use crate::kanban_board::KanbanBoard;
use crate::task::{Status, Task};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Screen state around the board: selection, the open modal and the footer notice.
pub struct App {
    pub board: KanbanBoard,
    pub selected_status: usize,
    pub selected_task: usize,
    pub form: Option<TaskForm>,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl App {
    pub fn new(board: KanbanBoard) -> Self {
        Self {
            board,
            selected_status: 0,
            selected_task: 0,
            form: None,
            notice: None,
            should_quit: false,
        }
    }

    pub fn selected_column(&self) -> Status {
        Status::ALL[self.selected_status]
    }

    pub fn selected(&self) -> Option<&Task> {
        self.board
            .get_tasks_by_status(self.selected_column())
            .get(self.selected_task)
            .copied()
    }

    /// Apply any pending store snapshot and keep the selection in range.
    pub fn tick(&mut self) {
        match self.board.refresh() {
            Ok(true) => self.clamp_selection(),
            Ok(false) => {}
            Err(err) => self.fail("Sync failed", err),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.board.get_tasks_by_status(self.selected_column()).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn fail(&mut self, action: &str, err: impl std::fmt::Display) {
        error!("{action}: {err}");
        self.notice = Some(Notice::Error(format!("{action}: {err}")));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormOutcome::Pending => {}
                FormOutcome::Cancelled => self.form = None,
                FormOutcome::Submitted(task) => match self.board.create(&task) {
                    Ok(_) => {
                        self.form = None;
                        self.notice = Some(Notice::Info(format!("Created \"{}\"", task.title)));
                    }
                    Err(err) => self.fail("Create failed", err),
                },
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') | KeyCode::Char('n') => {
                self.form = Some(TaskForm::new());
                self.notice = None;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.selected_status > 0 {
                    self.selected_status -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.selected_status < Status::ALL.len() - 1 {
                    self.selected_status += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_task = self.selected_task.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_task += 1;
                self.clamp_selection();
            }
            KeyCode::Enter | KeyCode::Char('>') => self.move_selected(|s| s.next()),
            KeyCode::Char('<') => self.move_selected(|s| s.prev()),
            KeyCode::Char('1') => self.move_selected(|_| Status::Todo),
            KeyCode::Char('2') => self.move_selected(|_| Status::InProgress),
            KeyCode::Char('3') => self.move_selected(|_| Status::Completed),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected().map(|t| t.id.clone()) {
                    self.board.edit(&id);
                    self.notice = Some(Notice::Info("Editing is not available yet".into()));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected().map(|t| t.id.clone()) {
                    if let Err(err) = self.board.delete(&id) {
                        self.fail("Delete failed", err);
                    }
                }
            }
            _ => {}
        }
    }

    fn move_selected(&mut self, target: impl Fn(Status) -> Status) {
        let Some((id, current)) = self.selected().map(|t| (t.id.clone(), t.status)) else {
            return;
        };
        let status = target(current);
        if status == current {
            return;
        }
        if let Err(err) = self.board.change_status(&id, status) {
            self.fail("Status change failed", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{DATE, TITLE};
    use crate::store::MemoryStore;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> (Arc<MemoryStore>, App) {
        let store = Arc::new(MemoryStore::new());
        let board = KanbanBoard::mount(store.clone(), "tasks").unwrap();
        (store, App::new(board))
    }

    fn create(app: &mut App, title: &str) {
        press(app, KeyCode::Char('c'));
        let form = app.form.as_mut().unwrap();
        form.type_into(TITLE, title);
        form.type_into(DATE, "2024-01-01");
        press(app, KeyCode::Enter);
        app.tick();
    }

    #[test]
    fn test_create_through_modal() {
        let (store, mut app) = app();
        create(&mut app, "Write spec");

        assert!(app.form.is_none());
        assert_eq!(store.documents("tasks").len(), 1);
        assert_eq!(app.selected().unwrap().title, "Write spec");
    }

    #[test]
    fn test_rejected_submit_keeps_modal_open() {
        let (store, mut app) = app();
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Enter);
        assert!(app.form.is_some());
        assert!(store.documents("tasks").is_empty());

        press(&mut app, KeyCode::Esc);
        assert!(app.form.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_status_keys_move_selected_task() {
        let (_store, mut app) = app();
        create(&mut app, "a");

        press(&mut app, KeyCode::Char('3'));
        app.tick();
        assert_eq!(app.board.column(Status::Completed).tasks.len(), 1);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('<'));
        app.tick();
        assert_eq!(app.board.column(Status::InProgress).tasks.len(), 1);
    }

    #[test]
    fn test_delete_clamps_selection() {
        let (_store, mut app) = app();
        create(&mut app, "a");
        create(&mut app, "b");
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected().unwrap().title, "b");

        press(&mut app, KeyCode::Char('d'));
        app.tick();
        assert_eq!(app.selected_task, 0);
        assert_eq!(app.selected().unwrap().title, "a");
    }

    #[test]
    fn test_edit_only_sets_notice() {
        let (store, mut app) = app();
        create(&mut app, "a");
        let before = store.documents("tasks");

        press(&mut app, KeyCode::Char('e'));
        assert_eq!(store.documents("tasks"), before);
        assert!(matches!(app.notice, Some(Notice::Info(_))));
    }

    #[test]
    fn test_quit() {
        let (_store, mut app) = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
