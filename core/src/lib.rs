//! In-memory todo store and the domain types it serves.
//!
//! # Overview
//! `TodoStore` owns an ordered collection of `Todo` records and implements
//! the full CRUD and query contract: list with filtering and pagination,
//! get, create, replace, patch, delete, bulk-delete of completed records,
//! and completion statistics.
//!
//! # Design
//! - The store is plain synchronous data. It performs no I/O and takes no
//!   locks; the HTTP layer decides how it is shared between requests.
//! - The id counter is private and only advanced by `create`, so ids are
//!   never reused for the lifetime of a store.
//! - Request payloads (`CreateTodo`, `ReplaceTodo`, `PatchTodo`) are the
//!   store's inputs as well as the wire format, so validation lives in one
//!   place and both the server and the client share the schema.

pub mod error;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult, ValidationError};
pub use store::{validate_text, TodoStore, MAX_TEXT_LEN};
pub use types::{
    CreateTodo, DeletedCompleted, DeletedTodo, Health, PatchTodo, ReplaceTodo, Stats, Todo,
    TodoFilter, TodoId, TodoPage,
};
