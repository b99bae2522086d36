use axum::http::{self, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use todo_core::{DeletedCompleted, DeletedTodo, Health, Stats, Todo, TodoPage};
use todo_server::{app, app_with_config, with_middleware, ServerConfig};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn error_message(response: Response) -> String {
    let body: serde_json::Value = body_json(response).await;
    body["error"].as_str().unwrap().to_string()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// The router shares its store through `Arc`, so clones see the same todos.
async fn send(app: &Router, request: Request<String>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create(app: &Router, body: &str) -> Todo {
    let resp = send(app, json_request("POST", "/todos", body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: TodoPage = body_json(resp).await;
    assert!(page.todos.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.offset, 0);
}

#[tokio::test]
async fn list_todos_filters_and_paginates() {
    let app = app();
    for text in ["a", "b", "c", "d"] {
        create(&app, &format!(r#"{{"text":"{text}"}}"#)).await;
    }
    let resp = send(&app, json_request("PATCH", "/todos/2", r#"{"completed":true}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&app, empty_request("GET", "/todos?completed=false&limit=2&offset=1")).await;
    let page: TodoPage = body_json(resp).await;
    let texts: Vec<&str> = page.todos.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["c", "d"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.limit, 2);
    assert_eq!(page.offset, 1);

    let resp = send(&app, empty_request("GET", "/todos?completed=true")).await;
    let page: TodoPage = body_json(resp).await;
    assert_eq!(page.todos.len(), 1);
    assert_eq!(page.todos[0].text, "b");
}

#[tokio::test]
async fn list_todos_non_numeric_pagination_uses_defaults() {
    let app = app();
    create(&app, r#"{"text":"a"}"#).await;
    create(&app, r#"{"text":"b"}"#).await;

    let resp = send(&app, empty_request("GET", "/todos?limit=lots&offset=x")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: TodoPage = body_json(resp).await;
    assert_eq!(page.todos.len(), 2);
    assert_eq!(page.limit, 2);
    assert_eq!(page.offset, 0);
}

#[tokio::test]
async fn list_todos_repeated_key_uses_first_value() {
    let app = app();
    for text in ["a", "b", "c"] {
        create(&app, &format!(r#"{{"text":"{text}"}}"#)).await;
    }

    let resp = send(&app, empty_request("GET", "/todos?limit=1&limit=2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: TodoPage = body_json(resp).await;
    assert_eq!(page.todos.len(), 1);
    assert_eq!(page.limit, 1);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn list_todos_undecodable_query_uses_defaults() {
    let app = app();
    create(&app, r#"{"text":"a"}"#).await;

    let resp = send(&app, empty_request("GET", "/todos?limit=%FF&offset=5abc")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: TodoPage = body_json(resp).await;
    assert_eq!(page.todos.len(), 1);
    assert_eq!(page.offset, 0);
}

#[tokio::test]
async fn simple_list_returns_plain_array() {
    let app = app();
    create(&app, r#"{"text":"only"}"#).await;

    let resp = send(&app, empty_request("GET", "/todos/simple")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].text, "only");
}

#[tokio::test]
async fn configured_app_starts_with_welcome_todos() {
    let app = app_with_config(ServerConfig::default());
    let resp = send(&app, empty_request("GET", "/todos/simple")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    let ids: Vec<u64> = todos.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let app = app_with_config(ServerConfig {
        seed: false,
        ..ServerConfig::default()
    });
    let resp = send(&app, empty_request("GET", "/todos/simple")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"text":"  Buy milk  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);
    assert_eq!(todo.text, "Buy milk");
    assert!(!todo.completed);
    assert_eq!(todo.created_at, todo.updated_at);
}

#[tokio::test]
async fn create_todo_with_completed_true() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/todos",
            r#"{"text":"Already done","completed":true}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert!(todo.completed);
}

#[tokio::test]
async fn create_todo_missing_text_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"completed":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Text is required and must be a string"
    );
}

#[tokio::test]
async fn create_todo_blank_text_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"text":"   "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Text cannot be empty");
}

#[tokio::test]
async fn create_todo_too_long_returns_400() {
    let body = serde_json::json!({ "text": "x".repeat(201) }).to_string();
    let resp = app()
        .oneshot(json_request("POST", "/todos", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Text cannot exceed 200 characters");
}

#[tokio::test]
async fn create_todo_wrong_type_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"text":42}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!error_message(resp).await.is_empty());
}

#[tokio::test]
async fn create_todo_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"text":"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let resp = app().oneshot(empty_request("GET", "/todos/99")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Todo not found");
}

#[tokio::test]
async fn get_todo_non_numeric_id_returns_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/todos/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_utf8_id_returns_json_404() {
    let app = app();
    for method in ["GET", "DELETE"] {
        let resp = send(&app, empty_request(method, "/todos/%FF")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method}");
        assert_eq!(error_message(resp).await, "Todo not found");
    }

    let resp = send(&app, json_request("PATCH", "/todos/%FF", r#"{"completed":true}"#)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Todo not found");
}

// --- replace ---

#[tokio::test]
async fn replace_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos/7", r#"{"text":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replace_todo_requires_text() {
    let app = app();
    let todo = create(&app, r#"{"text":"a"}"#).await;

    let resp = send(
        &app,
        json_request("PUT", &format!("/todos/{}", todo.id), r#"{"completed":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&app, empty_request("GET", &format!("/todos/{}", todo.id))).await;
    let unchanged: Todo = body_json(resp).await;
    assert_eq!(unchanged, todo);
}

// --- patch ---

#[tokio::test]
async fn patch_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/todos/3", r#"{"completed":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_todo_blank_text_returns_400() {
    let app = app();
    let todo = create(&app, r#"{"text":"keep me"}"#).await;

    let resp = send(
        &app,
        json_request("PATCH", &format!("/todos/{}", todo.id), r#"{"text":""}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Text cannot be empty");
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/todos/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_completed_removes_only_completed() {
    let app = app();
    create(&app, r#"{"text":"a"}"#).await;
    create(&app, r#"{"text":"b","completed":true}"#).await;
    create(&app, r#"{"text":"c"}"#).await;

    let resp = send(&app, empty_request("DELETE", "/todos/completed/all")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: DeletedCompleted = body_json(resp).await;
    assert_eq!(body.message, "Deleted 1 completed todos");
    assert_eq!(body.deleted_todos.len(), 1);
    assert_eq!(body.deleted_todos[0].text, "b");

    let resp = send(&app, empty_request("GET", "/todos")).await;
    let page: TodoPage = body_json(resp).await;
    let texts: Vec<&str> = page.todos.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "c"]);

    let resp = send(&app, empty_request("DELETE", "/todos/completed/all")).await;
    let body: DeletedCompleted = body_json(resp).await;
    assert!(body.deleted_todos.is_empty());
}

// --- stats / health ---

#[tokio::test]
async fn stats_scenario() {
    let app = app();
    let resp = send(&app, empty_request("GET", "/stats")).await;
    let stats: Stats = body_json(resp).await;
    assert_eq!(stats.completion_rate, 0);

    let a = create(&app, r#"{"text":"A"}"#).await;
    create(&app, r#"{"text":"B"}"#).await;
    send(
        &app,
        json_request("PATCH", &format!("/todos/{}", a.id), r#"{"completed":true}"#),
    )
    .await;

    let resp = send(&app, empty_request("GET", "/stats")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(
        body,
        serde_json::json!({"total": 2, "completed": 1, "active": 1, "completionRate": 50})
    );
}

#[tokio::test]
async fn health_reports_environment() {
    let resp = app().oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let health: Health = body_json(resp).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.environment, "development");
    assert!(health.uptime >= 0.0);
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// --- boundary ---

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/nothing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "API endpoint not found");
}

#[tokio::test]
async fn wrong_method_returns_json_405() {
    let app = app();

    let resp = send(&app, json_request("POST", "/todos/1", r#"{"text":"x"}"#)).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_message(resp).await, "Method not allowed");

    let resp = send(&app, empty_request("GET", "/todos/completed/all")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_message(resp).await, "Method not allowed");
}

async fn boom() -> &'static str {
    panic!("store exploded")
}

#[tokio::test]
async fn panic_detail_is_shown_in_development() {
    let router = with_middleware(Router::new().route("/boom", get(boom)), &ServerConfig::default());
    let resp = router.oneshot(empty_request("GET", "/boom")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["message"], "store exploded");
}

#[tokio::test]
async fn panic_detail_is_hidden_outside_development() {
    let config = ServerConfig {
        environment: "production".to_string(),
        ..ServerConfig::default()
    };
    let router = with_middleware(Router::new().route("/boom", get(boom)), &config);
    let resp = router.oneshot(empty_request("GET", "/boom")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "Something went wrong");
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let app = app();

    // create
    let created = create(&app, r#"{"text":"Walk dog"}"#).await;
    assert_eq!(created.text, "Walk dog");
    assert!(!created.completed);
    let id = created.id;

    // get
    let resp = send(&app, empty_request("GET", &format!("/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, created);

    // patch — only completed
    let resp = send(
        &app,
        json_request("PATCH", &format!("/todos/{id}"), r#"{"completed":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Todo = body_json(resp).await;
    assert_eq!(patched.text, "Walk dog"); // unchanged
    assert!(patched.completed);
    assert!(patched.updated_at >= patched.created_at);

    // replace — completed omitted, so it is kept
    let resp = send(
        &app,
        json_request("PUT", &format!("/todos/{id}"), r#"{"text":"Walk cat"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Todo = body_json(resp).await;
    assert_eq!(replaced.text, "Walk cat");
    assert!(replaced.completed);
    assert_eq!(replaced.created_at, created.created_at);

    // delete
    let resp = send(&app, empty_request("DELETE", &format!("/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: DeletedTodo = body_json(resp).await;
    assert_eq!(deleted.message, "Todo deleted successfully");
    assert_eq!(deleted.todo.id, id);

    // get after delete — 404
    let resp = send(&app, empty_request("GET", &format!("/todos/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // ids are not reused
    let next = create(&app, r#"{"text":"Feed fish"}"#).await;
    assert!(next.id > id);
}
