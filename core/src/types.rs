//! Domain types and wire DTOs for the todo API.
//!
//! # Design
//! JSON field names are camelCase (`createdAt`, `deletedTodos`,
//! `completionRate`) to match what browser clients of the API expect.
//! Input payloads use `Option` for every field so that "missing" can be told
//! apart from "present" by the store, which owns all validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a todo. Assigned by the store, starting at 1.
pub type TodoId = u64;

/// A single todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new todo. `completed` defaults to false.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl CreateTodo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            completed: None,
        }
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }
}

/// Request payload for a full update. `text` is required; an omitted
/// `completed` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplaceTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ReplaceTodo {
    pub fn new(text: impl Into<String>, completed: Option<bool>) -> Self {
        Self {
            text: Some(text.into()),
            completed,
        }
    }
}

/// Request payload for a partial update. Only the fields present in the
/// JSON are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Selection and pagination for `TodoStore::list`.
///
/// A `limit` of `None` or zero means "all matches"; `offset` defaults to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    /// Number of matches before pagination.
    pub total: usize,
    /// Effective page size.
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Percentage of completed todos, rounded half up. Zero when empty.
    pub completion_rate: u32,
}

impl Stats {
    pub fn from_counts(total: usize, completed: usize) -> Self {
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed * 200 + total) / (2 * total)) as u32
        };
        Self {
            total,
            completed,
            active: total - completed,
            completion_rate,
        }
    }
}

/// Response body of a single delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedTodo {
    pub message: String,
    pub todo: Todo,
}

/// Response body of a bulk delete of completed todos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCompleted {
    pub message: String,
    pub deleted_todos: Vec<Todo>,
}

impl DeletedCompleted {
    pub fn new(deleted_todos: Vec<Todo>) -> Self {
        Self {
            message: format!("Deleted {} completed todos", deleted_todos.len()),
            deleted_todos,
        }
    }
}

/// Response body of the health check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started.
    pub uptime: f64,
    pub version: String,
    pub environment: String,
}
