//! Task creation form shown in the "Create Task" modal.

use crate::task::{parse_date, NewTask, Priority, Status};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Select,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    /// Cursor position in characters
    pub cursor: usize,
    pub options: Vec<String>,
    pub selected_option: usize,
    pub required: bool,
    pub error: Option<String>,
}

impl FormField {
    fn new(label: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            kind,
            value: String::new(),
            cursor: 0,
            options: Vec::new(),
            selected_option: 0,
            required: false,
            error: None,
        }
    }

    pub fn text(label: &'static str) -> Self {
        Self::new(label, FieldKind::Text)
    }

    pub fn date(label: &'static str) -> Self {
        Self::new(label, FieldKind::Date)
    }

    pub fn select(label: &'static str, options: &[&str], default: &str) -> Self {
        let options: Vec<String> = options.iter().map(|o| o.to_string()).collect();
        let selected_option = options.iter().position(|o| o == default).unwrap_or(0);
        Self {
            value: options.get(selected_option).cloned().unwrap_or_default(),
            options,
            selected_option,
            ..Self::new(label, FieldKind::Select)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn add_char(&mut self, c: char) {
        match self.kind {
            FieldKind::Text => {}
            FieldKind::Date if c.is_ascii_digit() || c == '-' => {}
            FieldKind::Date | FieldKind::Select => return,
        }
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
        self.error = None;
    }

    pub fn backspace(&mut self) {
        if self.kind == FieldKind::Select || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.value.remove(at);
        self.error = None;
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn next_option(&mut self) {
        if !self.options.is_empty() {
            self.selected_option = (self.selected_option + 1) % self.options.len();
            self.value = self.options[self.selected_option].clone();
        }
    }

    pub fn prev_option(&mut self) {
        if !self.options.is_empty() {
            self.selected_option = self
                .selected_option
                .checked_sub(1)
                .unwrap_or(self.options.len() - 1);
            self.value = self.options[self.selected_option].clone();
        }
    }

    /// Pick the option matching `value`, ignoring case.
    pub fn select_value(&mut self, value: &str) -> bool {
        match self
            .options
            .iter()
            .position(|o| o.eq_ignore_ascii_case(value.trim()))
        {
            Some(index) => {
                self.selected_option = index;
                self.value = self.options[index].clone();
                true
            }
            None => false,
        }
    }

    /// Required-field check. Dates must also be real calendar dates.
    pub fn validate(&mut self) -> bool {
        self.error = if self.required && self.value.trim().is_empty() {
            Some(format!("{} is required", self.label))
        } else if self.kind == FieldKind::Date
            && !self.value.is_empty()
            && parse_date(&self.value).is_none()
        {
            Some("Enter a date as YYYY-MM-DD".to_string())
        } else {
            None
        };
        self.error.is_none()
    }
}

/// Result of feeding a key to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Still editing (including a rejected submit).
    Pending,
    Submitted(NewTask),
    Cancelled,
}

pub const TITLE: usize = 0;
pub const DESCRIPTION: usize = 1;
pub const DATE: usize = 2;
pub const STATUS: usize = 3;
pub const PRIORITY: usize = 4;

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub fields: Vec<FormField>,
    pub focused: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    pub fn new() -> Self {
        let statuses: Vec<&str> = Status::ALL.iter().map(|s| s.as_str()).collect();
        Self {
            fields: vec![
                FormField::text("Title *").required(),
                FormField::text("Description"),
                FormField::date("Select Date * (YYYY-MM-DD)").required(),
                FormField::select("Status", &statuses, Status::default().as_str()),
                FormField::select("Priority", &Priority::CHOICES, Priority::default().as_str()),
            ],
            focused: 0,
        }
    }

    pub fn field(&self, index: usize) -> &FormField {
        &self.fields[index]
    }

    pub fn field_mut(&mut self, index: usize) -> &mut FormField {
        &mut self.fields[index]
    }

    pub fn focused_field_mut(&mut self) -> &mut FormField {
        &mut self.fields[self.focused]
    }

    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.focused = self.focused.checked_sub(1).unwrap_or(self.fields.len() - 1);
    }

    pub fn set_status(&mut self, status: Status) {
        self.field_mut(STATUS).select_value(status.as_str());
    }

    /// Append text to a field as if it had been typed.
    pub fn type_into(&mut self, index: usize, text: &str) {
        let field = self.field_mut(index);
        for c in text.chars() {
            field.add_char(c);
        }
    }

    /// Validate every field and, if all pass, produce the create request.
    pub fn submit(&mut self) -> Option<NewTask> {
        let mut valid = true;
        for field in &mut self.fields {
            valid &= field.validate();
        }
        if !valid {
            if let Some(first) = self.fields.iter().position(|f| f.error.is_some()) {
                self.focused = first;
            }
            return None;
        }

        Some(NewTask {
            title: self.field(TITLE).value.clone(),
            description: self.field(DESCRIPTION).value.clone(),
            date: self.field(DATE).value.trim().to_string(),
            status: self.field(STATUS).value.parse().unwrap_or_default(),
            priority: Priority::from(self.field(PRIORITY).value.clone()),
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancelled,
            KeyCode::Enter => {
                return match self.submit() {
                    Some(task) => FormOutcome::Submitted(task),
                    None => FormOutcome::Pending,
                }
            }
            KeyCode::Tab => self.next_field(),
            KeyCode::BackTab => self.prev_field(),
            KeyCode::Up => {
                if self.focused_field_mut().kind == FieldKind::Select {
                    self.focused_field_mut().prev_option();
                } else {
                    self.prev_field();
                }
            }
            KeyCode::Down => {
                if self.focused_field_mut().kind == FieldKind::Select {
                    self.focused_field_mut().next_option();
                } else {
                    self.next_field();
                }
            }
            KeyCode::Left => self.focused_field_mut().cursor_left(),
            KeyCode::Right => self.focused_field_mut().cursor_right(),
            KeyCode::Backspace => self.focused_field_mut().backspace(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focused_field_mut().add_char(c)
            }
            _ => {}
        }
        FormOutcome::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_defaults() {
        let form = TaskForm::new();
        assert_eq!(form.field(STATUS).value, "TODO");
        assert_eq!(form.field(PRIORITY).value, "Medium");
        assert!(form.field(TITLE).value.is_empty());
    }

    #[test]
    fn test_submit_with_defaults() {
        let mut form = TaskForm::new();
        form.type_into(TITLE, "Write spec");
        form.type_into(DATE, "2024-01-01");

        assert_eq!(
            form.handle_key(key(KeyCode::Enter)),
            FormOutcome::Submitted(NewTask {
                title: "Write spec".into(),
                description: String::new(),
                date: "2024-01-01".into(),
                status: Status::Todo,
                priority: Priority::Medium,
            })
        );
    }

    #[test]
    fn test_empty_title_blocks_submit() {
        let mut form = TaskForm::new();
        form.type_into(DATE, "2024-01-01");
        form.focused = DATE;

        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormOutcome::Pending);
        assert!(form.field(TITLE).error.is_some());
        assert_eq!(form.focused, TITLE);
    }

    #[test]
    fn test_invalid_date_blocks_submit() {
        let mut form = TaskForm::new();
        form.type_into(TITLE, "x");
        form.type_into(DATE, "2024-02-30");
        assert!(form.submit().is_none());
        assert!(form.field(DATE).error.is_some());
    }

    #[test]
    fn test_date_field_ignores_letters() {
        let mut field = FormField::date("Date");
        for c in "2024-0a1-01".chars() {
            field.add_char(c);
        }
        assert_eq!(field.value, "2024-01-01");
    }

    #[test]
    fn test_select_cycles_options() {
        let mut form = TaskForm::new();
        form.focused = PRIORITY;
        form.handle_key(key(KeyCode::Down));
        assert_eq!(form.field(PRIORITY).value, "High");
        form.handle_key(key(KeyCode::Down));
        assert_eq!(form.field(PRIORITY).value, "Low");
        form.handle_key(key(KeyCode::Up));
        assert_eq!(form.field(PRIORITY).value, "High");
    }

    #[test]
    fn test_typing_and_editing() {
        let mut form = TaskForm::new();
        for c in "Héllo".chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
        form.handle_key(key(KeyCode::Left));
        form.handle_key(key(KeyCode::Backspace));
        assert_eq!(form.field(TITLE).value, "Hélo");
        assert_eq!(form.field(TITLE).cursor, 3);
    }

    #[test]
    fn test_select_value_ignores_case() {
        let mut form = TaskForm::new();
        assert!(form.field_mut(STATUS).select_value("in progress"));
        assert!(form.field_mut(PRIORITY).select_value("HIGH"));
        assert!(!form.field_mut(PRIORITY).select_value("urgent"));
        form.type_into(TITLE, "x");
        form.type_into(DATE, "2024-05-06");

        let task = form.submit().unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_set_status() {
        let mut form = TaskForm::new();
        form.set_status(Status::Completed);
        assert_eq!(form.field(STATUS).value, "COMPLETED");
    }

    #[test]
    fn test_escape_cancels() {
        let mut form = TaskForm::new();
        form.type_into(TITLE, "x");
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormOutcome::Cancelled);
    }

    #[test]
    fn test_tab_wraps_around() {
        let mut form = TaskForm::new();
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focused, PRIORITY);
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focused, TITLE);
    }
}
