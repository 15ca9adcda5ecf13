//! To-do items

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::ids::TodoId;
use crate::list::List;
use crate::user::User;

/// Longest todo title accepted by the todo dialog
pub const MAX_TITLE_LENGTH: usize = 256;

string_enum!(
    /// How urgent a todo is
    Priority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
);

/// A to-do item. Every field is optional on the wire, since each query selects a different subset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub completed: bool,
    /// The list this todo belongs to
    pub list: Option<Box<List>>,
    pub assigned_to: Option<User>,
    /// RFC3339 timestamp
    pub start_date: Option<String>,
    /// RFC3339 timestamp
    pub due_date: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Todo {
    /// Name of the list this todo belongs to, or an empty string when it was not selected
    pub fn list_name(&self) -> &str {
        self.list.as_ref().map(|l| l.name.as_str()).unwrap_or("")
    }

    pub fn start(&self) -> Option<DateTime<FixedOffset>> {
        self.start_date.as_deref().and_then(crate::format::parse_backend_date)
    }

    pub fn due(&self) -> Option<DateTime<FixedOffset>> {
        self.due_date.as_deref().and_then(crate::format::parse_backend_date)
    }

    /// Overwrite this todo with a newer version of it.
    ///
    /// Scalars always come from `update`. Nested objects and dates are only replaced when `update` carries them,
    /// since mutations do not always select them.
    pub fn merge(&mut self, update: Todo) {
        self.title = update.title;
        self.description = update.description;
        self.tags = update.tags;
        self.completed = update.completed;
        if update.priority.is_some() {
            self.priority = update.priority;
        }
        if update.list.is_some() {
            self.list = update.list;
        }
        if update.assigned_to.is_some() {
            self.assigned_to = update.assigned_to;
        }
        if update.start_date.is_some() {
            self.start_date = update.start_date;
        }
        if update.due_date.is_some() {
            self.due_date = update.due_date;
        }
        if update.updated_at.is_some() {
            self.updated_at = update.updated_at;
        }
    }
}
