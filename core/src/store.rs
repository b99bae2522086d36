//! The in-memory todo collection.
//!
//! # Design
//! Records live in a `Vec` in insertion order; lookups are linear scans,
//! which is fine for the small collections a single process holds.
//! Every mutation refreshes `updated_at`, clamped so it never precedes
//! `created_at`.

use chrono::Utc;

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::types::{
    CreateTodo, PatchTodo, ReplaceTodo, Stats, Todo, TodoFilter, TodoId, TodoPage,
};

/// Maximum number of characters in a todo's text, after trimming.
pub const MAX_TEXT_LEN: usize = 200;

const WELCOME_TODOS: [(&str, bool); 3] = [
    ("Welcome to your todo app!", false),
    ("Todos live in memory and vanish when the server stops", false),
    ("Try editing, completing and deleting todos", true),
];

/// Trim `text` and check it is present, non-empty and short enough.
pub fn validate_text(text: Option<&str>) -> Result<String, ValidationError> {
    let text = text.ok_or(ValidationError::Missing)?.trim();
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong { max: MAX_TEXT_LEN });
    }
    Ok(text.to_string())
}

/// Ordered in-memory collection of todos.
#[derive(Debug, Clone)]
pub struct TodoStore {
    todos: Vec<Todo>,
    next_id: TodoId,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    /// An empty store whose first todo gets id 1.
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }

    /// A store seeded with a few introductory todos (ids 1 to 3, the last
    /// one completed).
    pub fn with_welcome_todos() -> Self {
        let mut store = Self::new();
        for (text, completed) in WELCOME_TODOS {
            store.insert(text.to_string(), completed);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Every todo in insertion order.
    pub fn all(&self) -> &[Todo] {
        &self.todos
    }

    /// Matching todos in insertion order, sliced by `offset` and `limit`.
    pub fn list(&self, filter: &TodoFilter) -> TodoPage {
        let matching: Vec<&Todo> = self
            .todos
            .iter()
            .filter(|todo| filter.completed.map_or(true, |c| todo.completed == c))
            .collect();

        let total = matching.len();
        let limit = filter.limit.filter(|&limit| limit > 0).unwrap_or(total);
        let offset = filter.offset.unwrap_or(0);
        let todos = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        TodoPage {
            todos,
            total,
            limit,
            offset,
        }
    }

    pub fn get(&self, id: TodoId) -> StoreResult<&Todo> {
        self.todos
            .iter()
            .find(|todo| todo.id == id)
            .ok_or(StoreError::NotFound { id })
    }

    pub fn create(&mut self, input: CreateTodo) -> StoreResult<Todo> {
        let text = validate_text(input.text.as_deref())?;
        Ok(self.insert(text, input.completed.unwrap_or(false)))
    }

    /// Full update. The text is validated before the id is looked up.
    pub fn replace(&mut self, id: TodoId, input: ReplaceTodo) -> StoreResult<Todo> {
        let text = validate_text(input.text.as_deref())?;
        let todo = self.find_mut(id)?;
        todo.text = text;
        if let Some(completed) = input.completed {
            todo.completed = completed;
        }
        touch(todo);
        Ok(todo.clone())
    }

    /// Partial update. Nothing is applied if the supplied text is invalid.
    pub fn patch(&mut self, id: TodoId, input: PatchTodo) -> StoreResult<Todo> {
        let index = self.position(id)?;
        let text = input
            .text
            .as_deref()
            .map(|text| validate_text(Some(text)))
            .transpose()?;

        let todo = &mut self.todos[index];
        if let Some(text) = text {
            todo.text = text;
        }
        if let Some(completed) = input.completed {
            todo.completed = completed;
        }
        touch(todo);
        Ok(todo.clone())
    }

    pub fn delete(&mut self, id: TodoId) -> StoreResult<Todo> {
        let index = self.position(id)?;
        Ok(self.todos.remove(index))
    }

    /// Remove every completed todo and return them in their original order.
    pub fn delete_completed(&mut self) -> Vec<Todo> {
        let (removed, kept) = std::mem::take(&mut self.todos)
            .into_iter()
            .partition(|todo| todo.completed);
        self.todos = kept;
        removed
    }

    pub fn stats(&self) -> Stats {
        let completed = self.todos.iter().filter(|todo| todo.completed).count();
        Stats::from_counts(self.todos.len(), completed)
    }

    fn insert(&mut self, text: String, completed: bool) -> Todo {
        let now = Utc::now();
        let todo = Todo {
            id: self.next_id,
            text,
            completed,
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.todos.push(todo.clone());
        todo
    }

    fn position(&self, id: TodoId) -> StoreResult<usize> {
        self.todos
            .iter()
            .position(|todo| todo.id == id)
            .ok_or(StoreError::NotFound { id })
    }

    fn find_mut(&mut self, id: TodoId) -> StoreResult<&mut Todo> {
        self.todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(StoreError::NotFound { id })
    }
}

fn touch(todo: &mut Todo) {
    todo.updated_at = Utc::now().max(todo.created_at);
}
