//! HTTP adapter over `todo_core::TodoStore`.
//!
//! Each handler takes one lock on the shared store, performs exactly one
//! store operation and renders the result as JSON. Errors render through
//! `ApiError`; panics are caught at the boundary and rendered as 500s.

pub mod config;
pub mod error;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, RawQuery, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use todo_core::{
    CreateTodo, DeletedCompleted, DeletedTodo, Health, PatchTodo, ReplaceTodo, Stats, Todo,
    TodoFilter, TodoId, TodoPage, TodoStore,
};

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};

pub type Db = Arc<RwLock<TodoStore>>;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    config: Arc<ServerConfig>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: TodoStore, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(RwLock::new(store)),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

/// Query string of `GET /todos`. Values are kept as text so that
/// unparsable numbers fall back to defaults instead of failing the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub completed: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    /// Parse a raw query string. The first value of a repeated key wins and
    /// an undecodable query is treated as empty.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = raw
            .and_then(|raw| serde_urlencoded::from_str(raw).ok())
            .unwrap_or_default();

        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "completed" => &mut query.completed,
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

impl From<ListQuery> for TodoFilter {
    fn from(query: ListQuery) -> Self {
        TodoFilter {
            completed: query.completed.map(|value| value == "true"),
            limit: query.limit.and_then(|value| value.trim().parse().ok()),
            offset: query.offset.and_then(|value| value.trim().parse().ok()),
        }
    }
}

/// An app over an empty store with default settings.
pub fn app() -> Router {
    router(AppState::new(TodoStore::new(), ServerConfig::default()))
}

/// An app whose store is seeded according to `config.seed`.
pub fn app_with_config(config: ServerConfig) -> Router {
    let store = if config.seed {
        TodoStore::with_welcome_todos()
    } else {
        TodoStore::new()
    };
    router(AppState::new(store, config))
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let routes = Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/simple", get(list_all_todos))
        .route("/todos/completed/all", delete(delete_completed))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(replace_todo)
                .patch(patch_todo)
                .delete(delete_todo),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);
    with_middleware(routes, &config)
}

/// Wrap `router` with panic catching, CORS and request tracing.
pub fn with_middleware(router: Router, config: &ServerConfig) -> Router {
    let expose_detail = config.is_development();
    let catch_panic =
        CatchPanicLayer::custom(move |payload: Box<dyn std::any::Any + Send + 'static>| {
            ApiError::from_panic(payload.as_ref(), expose_detail).into_response()
        });

    let cors = if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match config::parse_origin(origin) {
                Ok(origin) => Some(origin),
                Err(err) => {
                    tracing::warn!(%err, "ignoring CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    router
        .layer(catch_panic)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_config(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, shutting down gracefully");
}

/// Ids that are not numeric, or not even valid UTF-8, cannot name a todo,
/// so they are reported as not found.
fn parse_id(path: Result<Path<String>, PathRejection>) -> ApiResult<TodoId> {
    let Path(raw) = path.map_err(|_| ApiError::NotFound)?;
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
    })
}

async fn list_todos(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Json<TodoPage> {
    let filter = TodoFilter::from(ListQuery::from_raw(raw.as_deref()));
    let store = state.db.read().await;
    Json(store.list(&filter))
}

async fn list_all_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    let store = state.db.read().await;
    Json(store.all().to_vec())
}

async fn get_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Todo>> {
    let id = parse_id(path)?;
    let store = state.db.read().await;
    Ok(Json(store.get(id)?.clone()))
}

async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodo>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let Json(input) = body?;
    let todo = state.db.write().await.create(input)?;
    tracing::info!(id = todo.id, text = %todo.text, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn replace_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ReplaceTodo>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let Json(input) = body?;
    let id = parse_id(path)?;
    let todo = state.db.write().await.replace(id, input)?;
    tracing::info!(id, text = %todo.text, "updated todo");
    Ok(Json(todo))
}

async fn patch_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<PatchTodo>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let id = parse_id(path)?;
    let Json(input) = body?;
    let todo = state.db.write().await.patch(id, input)?;
    tracing::info!(id, "patched todo");
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DeletedTodo>> {
    let id = parse_id(path)?;
    let todo = state.db.write().await.delete(id)?;
    tracing::info!(id, text = %todo.text, "deleted todo");
    Ok(Json(DeletedTodo {
        message: "Todo deleted successfully".to_string(),
        todo,
    }))
}

async fn delete_completed(State(state): State<AppState>) -> Json<DeletedCompleted> {
    let removed = state.db.write().await.delete_completed();
    tracing::info!(count = removed.len(), "deleted completed todos");
    Json(DeletedCompleted::new(removed))
}

async fn stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.db.read().await.stats())
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
