//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each API operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the client
//! deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use todo_core::{
    CreateTodo, DeletedCompleted, DeletedTodo, Health, PatchTodo, ReplaceTodo, Stats, Todo,
    TodoFilter, TodoId, TodoPage,
};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Synchronous, stateless client for the todo API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /todos`, with the filter encoded as query parameters.
    pub fn build_list_todos(&self, filter: &TodoFilter) -> HttpRequest {
        let mut params = Vec::new();
        if let Some(completed) = filter.completed {
            params.push(format!("completed={completed}"));
        }
        if let Some(limit) = filter.limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(offset) = filter.offset {
            params.push(format!("offset={offset}"));
        }

        let mut path = format!("{}/todos", self.base_url);
        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.join("&"));
        }
        self.request(HttpMethod::Get, path)
    }

    pub fn build_list_all_todos(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/todos/simple", self.base_url))
    }

    pub fn build_get_todo(&self, id: TodoId) -> HttpRequest {
        self.request(HttpMethod::Get, self.todo_url(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, format!("{}/todos", self.base_url), input)
    }

    pub fn build_replace_todo(
        &self,
        id: TodoId,
        input: &ReplaceTodo,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, self.todo_url(id), input)
    }

    pub fn build_patch_todo(&self, id: TodoId, input: &PatchTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, self.todo_url(id), input)
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        self.request(HttpMethod::Delete, self.todo_url(id))
    }

    pub fn build_delete_completed(&self) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            format!("{}/todos/completed/all", self.base_url),
        )
    }

    pub fn build_stats(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/stats", self.base_url))
    }

    pub fn build_health(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/health", self.base_url))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<TodoPage, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_list_all_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 201)
    }

    pub fn parse_replace_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_patch_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    /// Returns the removed todo.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json::<DeletedTodo>(response, 200).map(|body| body.todo)
    }

    /// Returns the removed todos in their original order.
    pub fn parse_delete_completed(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json::<DeletedCompleted>(response, 200).map(|body| body.deleted_todos)
    }

    pub fn parse_stats(&self, response: HttpResponse) -> Result<Stats, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<Health, ApiError> {
        parse_json(response, 200)
    }

    fn todo_url(&self, id: TodoId) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        400 => {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .map(|body| body.error)
                .unwrap_or_else(|_| response.body.clone());
            Err(ApiError::Validation(message))
        }
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
