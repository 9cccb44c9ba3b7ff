mod support;

use std::fs;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rstest::rstest;
use serde_json::{json, Value};
use taskd::api::{router, AppState};
use taskd::config::ServerConfig;
use taskd::TaskService;
use tower::ServiceExt;

use support::{deleted_json, task_json, TestData};

fn memory_app() -> Router {
    app_for(TaskService::in_memory(), &ServerConfig::default())
}

fn app_for(service: TaskService, config: &ServerConfig) -> Router {
    router(AppState::new(Arc::new(service)), config)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn new_task(title: &str) -> Value {
    json!({ "title": title, "description": format!("{title} description") })
}

#[tokio::test]
async fn health_reports_ok() {
    let app = memory_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn create_then_list_and_get() {
    let app = memory_app();

    let (status, created) = send(&app, Method::POST, "/tasks", Some(new_task("Write"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created, task_json(1, "Write"));

    let (status, listed) = send(&app, Method::GET, "/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([task_json(1, "Write")]));

    let (status, fetched) = send(&app, Method::GET, "/tasks/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let app = memory_app();
    let mut body = new_task("Write");
    body["id"] = json!(77);

    let (_, created) = send(&app, Method::POST, "/tasks", Some(body)).await;
    assert_eq!(created["id"], 1);
}

#[rstest]
#[case(json!({ "title": "", "description": "ok" }), "title")]
#[case(json!({ "title": "t".repeat(101), "description": "ok" }), "title")]
#[case(json!({ "title": "ok", "description": "" }), "description")]
#[case(json!({ "title": "ok", "description": "d".repeat(501) }), "description")]
#[tokio::test]
async fn create_rejects_out_of_range_fields(#[case] body: Value, #[case] field: &str) {
    let app = memory_app();
    let (status, error) = send(&app, Method::POST, "/tasks", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert_eq!(error["details"]["violations"][0]["field"], field);
}

#[rstest]
#[case(json!({ "title": "t", "description": "d" }))]
#[case(json!({ "title": "t".repeat(100), "description": "d".repeat(500) }))]
#[tokio::test]
async fn create_accepts_boundary_lengths(#[case] body: Value) {
    let app = memory_app();
    let (status, _) = send(&app, Method::POST, "/tasks", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_with_missing_field_is_unprocessable() {
    let app = memory_app();
    let (status, error) =
        send(&app, Method::POST, "/tasks", Some(json!({ "title": "only" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn non_json_bodies_are_400() {
    let app = memory_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/tasks")
        .body(Body::from(r#"{"title":"t","description":"d"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error["code"], "BAD_REQUEST");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/tasks")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_task_is_404() {
    let app = memory_app();
    for method in [Method::GET, Method::DELETE] {
        let (status, error) = send(&app, method, "/tasks/9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["code"], "NOT_FOUND");
    }
    let (status, _) = send(&app, Method::PUT, "/tasks/9", Some(new_task("x"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PATCH, "/tasks/9", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_ids_are_400() {
    let app = memory_app();
    for (method, uri) in [
        (Method::GET, "/tasks/abc"),
        (Method::DELETE, "/tasks/-1"),
        (Method::POST, "/deleted/x/restore"),
    ] {
        let (status, error) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["code"], "BAD_REQUEST");
        assert!(error["message"].as_str().unwrap().starts_with("task id must be"));
    }

    let (status, error) = send(&app, Method::GET, "/tasks/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn put_replaces_and_patch_merges() {
    let app = memory_app();
    send(&app, Method::POST, "/tasks", Some(new_task("Write"))).await;

    let (status, replaced) = send(
        &app,
        Method::PUT,
        "/tasks/1",
        Some(json!({ "id": 5, "title": "Read", "description": "A book", "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        replaced,
        json!({ "id": 1, "title": "Read", "description": "A book", "completed": true })
    );

    let (status, patched) = send(
        &app,
        Method::PATCH,
        "/tasks/1",
        Some(json!({ "title": null, "completed": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        patched,
        json!({ "id": 1, "title": "Read", "description": "A book", "completed": false })
    );
}

#[tokio::test]
async fn delete_then_get_is_gone_with_date() {
    let app = memory_app();
    send(&app, Method::POST, "/tasks", Some(new_task("Write"))).await;

    let (status, body) = send(&app, Method::DELETE, "/tasks/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted");
    assert_eq!(body["task"]["id"], 1);
    let timestamp = body["task"]["deletion_timestamp"].as_str().unwrap().to_string();

    let (status, error) = send(&app, Method::GET, "/tasks/1", None).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(error["code"], "GONE");
    assert_eq!(error["details"]["deleted_on"], &timestamp[..10]);
    assert_eq!(
        error["message"],
        format!("Task 1 was deleted on {}", &timestamp[..10])
    );
}

#[tokio::test]
async fn deleted_routes_list_show_restore_purge() {
    let app = memory_app();
    send(&app, Method::POST, "/tasks", Some(new_task("One"))).await;
    send(&app, Method::POST, "/tasks", Some(new_task("Two"))).await;
    send(&app, Method::DELETE, "/tasks/2", None).await;
    send(&app, Method::DELETE, "/tasks/1", None).await;

    let (status, deleted) = send(&app, Method::GET, "/deleted", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = deleted
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let (status, shown) = send(&app, Method::GET, "/deleted/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["title"], "Two");

    let (status, restored) = send(&app, Method::POST, "/deleted/1/restore", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored, task_json(1, "One"));

    let (status, purged) = send(&app, Method::DELETE, "/deleted/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(purged["message"], "Task permanently deleted");
    assert_eq!(purged["warning"], "This action cannot be undone");
    assert_eq!(purged["task"]["id"], 2);

    let (_, deleted) = send(&app, Method::GET, "/deleted", None).await;
    assert_eq!(deleted, json!([]));
    let (status, _) = send(&app, Method::GET, "/tasks/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = send(&app, Method::POST, "/tasks", Some(new_task("Three"))).await;
    assert_eq!(created["id"], 3);
}

#[tokio::test]
async fn deleted_routes_404_for_unknown_ids() {
    let app = memory_app();
    for (method, uri) in [
        (Method::GET, "/deleted/4"),
        (Method::POST, "/deleted/4/restore"),
        (Method::DELETE, "/deleted/4"),
    ] {
        let (status, error) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["details"]["collection"], "deleted");
    }
}

#[tokio::test]
async fn file_backed_router_reads_seeded_data() {
    let data = TestData::new();
    data.write_data_file("tasks.json", &json!([task_json(1, "a"), task_json(2, "b")]).to_string());
    data.write_data_file(
        "deleted_tasks.json",
        &json!([deleted_json(3, "c", "2024-04-01T12:00:00Z")]).to_string(),
    );
    let app = app_for(data.service(), &ServerConfig::default());

    let (status, error) = send(&app, Method::GET, "/tasks/3", None).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(error["details"]["deleted_on"], "2024-04-01");

    let (_, created) = send(&app, Method::POST, "/tasks", Some(new_task("d"))).await;
    assert_eq!(created["id"], 4);
    assert_eq!(data.ids_in("tasks.json"), vec![1, 2, 4]);
}

#[tokio::test]
async fn static_directory_is_served_when_configured() {
    let data = TestData::new();
    let static_dir = data.root().join("static");
    fs::create_dir_all(&static_dir).unwrap();
    fs::write(static_dir.join("index.html"), "<h1>tasks</h1>").unwrap();
    fs::write(static_dir.join("app.js"), "console.log('hi');").unwrap();

    let config = ServerConfig {
        static_dir: Some(static_dir),
        ..ServerConfig::default()
    };
    let app = app_for(TaskService::in_memory(), &config);

    let (status, index) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index, Value::String("<h1>tasks</h1>".to_string()));

    let (status, script) = send(&app, Method::GET, "/static/app.js", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(script, Value::String("console.log('hi');".to_string()));
}

#[tokio::test]
async fn root_is_404_without_static_directory() {
    let app = memory_app();
    let (status, _) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn permissive_cors_answers_preflight() {
    let app = memory_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/tasks")
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
