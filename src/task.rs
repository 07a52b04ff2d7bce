use crate::error::{BoardError, Result};
use crate::store::{Fields, StoredDocument};
use chrono::{Datelike, NaiveDate};
use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Date format used for the stored `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "IN PROGRESS")]
    InProgress,
    #[serde(rename = "COMPLETED")]
    Completed,
}

impl Status {
    /// Column order on the board.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN PROGRESS",
            Status::Completed => "COMPLETED",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Completed => 2,
        }
    }

    /// Next status, clamped at the last column.
    pub fn next(&self) -> Status {
        Status::ALL[(self.index() + 1).min(Status::ALL.len() - 1)]
    }

    /// Previous status, clamped at the first column.
    pub fn prev(&self) -> Status {
        Status::ALL[self.index().saturating_sub(1)]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['_', '-'], " ").as_str() {
            "TODO" => Ok(Status::Todo),
            "IN PROGRESS" => Ok(Status::InProgress),
            "COMPLETED" => Ok(Status::Completed),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Task priority. Text the board does not recognise is kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Other(String),
}

impl Priority {
    /// Choices offered by the creation form.
    pub const CHOICES: [&'static str; 3] = ["Low", "Medium", "High"];

    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Other(text) => text,
        }
    }

    pub fn badge_color(&self) -> Color {
        badge_color(self.as_str())
    }
}

impl From<String> for Priority {
    fn from(text: String) -> Self {
        match text.to_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            _ => Priority::Other(text),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge colour for a priority label, matched case-insensitively.
pub fn badge_color(label: &str) -> Color {
    match label.to_lowercase().as_str() {
        "high" => Color::Red,
        "medium" => Color::Yellow,
        "low" => Color::Green,
        _ => Color::Gray,
    }
}

/// Fields of a task that does not exist in the store yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub date: String,
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
}

/// Stored `null` reads the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl NewTask {
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date: date.into(),
            status: Status::default(),
            priority: Priority::default(),
        }
    }

    /// Document fields sent with the create request.
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), Value::from(self.title.as_str()));
        fields.insert("description".into(), Value::from(self.description.as_str()));
        fields.insert("date".into(), Value::from(self.date.as_str()));
        fields.insert("status".into(), Value::from(self.status.as_str()));
        fields.insert("priority".into(), Value::from(self.priority.as_str()));
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub status: Status,
    pub priority: Priority,
}

impl Task {
    /// Build a task from a store document. The store id always wins over any
    /// `id` field carried in the document body.
    pub fn from_document(doc: &StoredDocument) -> Result<Task> {
        let mut fields = doc.fields.clone();
        fields.remove("id");
        let data: NewTask = serde_json::from_value(Value::Object(fields)).map_err(
            |err| BoardError::InvalidTask {
                id: doc.id.clone(),
                reason: err.to_string(),
            },
        )?;

        Ok(Task {
            id: doc.id.clone(),
            title: data.title,
            description: data.description,
            date: data.date,
            status: data.status,
            priority: data.priority,
        })
    }

    /// Date as shown on the board, e.g. `1/1/2024`.
    pub fn display_date(&self) -> String {
        format_display_date(&self.date)
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub fn format_display_date(text: &str) -> String {
    match parse_date(text) {
        Some(date) => format!("{}/{}/{}", date.month(), date.day(), date.year()),
        None => "Invalid Date".to_string(),
    }
}
