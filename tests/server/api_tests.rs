// REST surface tests: status codes, payload shapes and error bodies,
// driven through the router without binding a socket.

#[path = "../common/mod.rs"]
mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use common::{
    Behavior, FakeProvider, OUTLINE, PNG, png_base64, write_image_config, write_text_config,
};
use postcraft::AppSettings;
use postcraft::infrastructure::model::RetryPolicy;
use postcraft::infrastructure::server::{ServerState, build_router};
use postcraft::infrastructure::storage::{HistoryRecord, HistoryStore, PageImage, TaskStatus};
use serde_json::{Value, json};
use std::fs;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    settings: AppSettings,
    _dir: TempDir,
}

impl TestApp {
    fn new(configure: impl FnOnce(&std::path::Path)) -> Self {
        let dir = tempdir().expect("tempdir");
        configure(dir.path());
        let settings = AppSettings::rooted(dir.path());
        let state = ServerState::new(settings.clone())
            .expect("state")
            .with_retry(RetryPolicy::immediate(2));
        Self {
            router: build_router(state),
            settings,
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, body).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

fn pages_json() -> Value {
    json!([
        {"index": 0, "type": "cover", "content": "[封面]\nCoffee at home"},
        {"index": 1, "type": "content", "content": "[内容]\nBeans"}
    ])
}

#[tokio::test]
async fn health_reports_version() {
    let app = TestApp::new(|_| {});
    let (status, body) = app.json(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn outline_round_trip() {
    let fake = FakeProvider::start(Behavior {
        text_reply: OUTLINE.to_string(),
        ..Behavior::default()
    })
    .await;
    let app = TestApp::new(|dir| write_text_config(dir, &fake.base_url));

    let (status, body) = app
        .json(Method::POST, "/api/outline", Some(json!({"topic": "home coffee"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["outline"], OUTLINE);
    assert_eq!(body["pages"].as_array().map(Vec::len), Some(4));
    assert_eq!(body["pages"][0]["type"], "cover");
    assert_eq!(body["has_images"], false);

    let id = body["record_id"].as_str().expect("record id");
    let (status, record) = app
        .json(Method::GET, &format!("/api/history/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "draft");
}

#[tokio::test]
async fn outline_rejects_bad_input() {
    let app = TestApp::new(|_| {});

    let (status, body) = app
        .json(Method::POST, "/api/outline", Some(json!({"topic": "  "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/outline",
            Some(json!({"topic": "coffee", "images": ["https://example.com/a.png"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").starts_with("image 1"));
}

#[tokio::test]
async fn outline_upstream_failure_is_bad_gateway() {
    let fake = FakeProvider::start(Behavior {
        status: Some(401),
        ..Behavior::default()
    })
    .await;
    let app = TestApp::new(|dir| write_text_config(dir, &fake.base_url));

    let (status, body) = app
        .json(Method::POST, "/api/outline", Some(json!({"topic": "coffee"})))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body["error"]
            .as_str()
            .expect("error")
            .contains("Authentication")
    );
}

#[tokio::test]
async fn generate_then_fetch_image_and_delete() {
    let fake = FakeProvider::start(Behavior::default()).await;
    let app = TestApp::new(|dir| write_image_config(dir, &fake.base_url, "google_genai", false));

    let (status, body) = app
        .json(
            Method::POST,
            "/api/generate",
            Some(json!({
                "pages": pages_json(),
                "task_id": "api-task",
                "user_topic": "home coffee",
                "user_images": [png_base64()]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["total"], 2);
    assert_eq!(body["images"][0]["filename"], "api-task_0.png");
    assert_eq!(body["images"][1]["url"], "/api/images/api-task_1.png");

    let (status, bytes) = app
        .send(Method::GET, "/api/images/api-task_0.png", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, PNG.to_vec());

    let (status, list) = app.json(Method::GET, "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let records = list["records"].as_array().expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["image_count"], 2);
    assert_eq!(records[0]["thumbnail"], "/api/images/api-task_0.png");

    let (status, deleted) = app
        .json(Method::DELETE, "/api/history/api-task", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["removed_images"], 2);
    assert!(!app.settings.output_dir.join("api-task_0.png").exists());

    let (status, _) = app.json(Method::GET, "/api/history/api-task", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_validation() {
    let app = TestApp::new(|_| {});

    let (status, body) = app
        .json(Method::POST, "/api/generate", Some(json!({"pages": []})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/generate",
            Some(json!({"pages": pages_json(), "task_id": "../../etc"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/regenerate",
            Some(json!({
                "task_id": "unknown",
                "page": {"index": 0, "type": "cover", "content": "x"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn regenerate_patches_a_page() {
    let fake = FakeProvider::start(Behavior::default()).await;
    let app = TestApp::new(|dir| write_image_config(dir, &fake.base_url, "google_genai", true));
    let history = HistoryStore::new(&app.settings.history_dir);
    let mut record = HistoryRecord::new("regen-api", "coffee");
    record.status = TaskStatus::Partial;
    history.create(&record).await.expect("create");

    let (status, body) = app
        .json(
            Method::POST,
            "/api/regenerate",
            Some(json!({
                "task_id": "regen-api",
                "page": {"index": 1, "type": "content", "content": "[内容]\nBeans"}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image"]["filename"], "regen-api_1.png");

    let stored = history.get("regen-api").await.expect("record");
    assert_eq!(stored.images.len(), 1);
    assert_eq!(stored.status, TaskStatus::Completed);
}

#[tokio::test]
async fn image_route_guards_names() {
    let app = TestApp::new(|_| {});

    let (status, body) = app.json(Method::GET, "/api/images/.hidden.png", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app.json(Method::GET, "/api/images/missing_0.png", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn image_route_guesses_content_type() {
    let app = TestApp::new(|_| {});
    fs::create_dir_all(&app.settings.output_dir).expect("mkdir");
    fs::write(app.settings.output_dir.join("t_0.jpg"), b"jpeg-bytes").expect("write");

    let request = Request::builder()
        .uri("/api/images/t_0.jpg")
        .body(Body::empty())
        .expect("request");
    let response = app.router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"image/jpeg"[..])
    );
}

#[tokio::test]
async fn history_lists_newest_first_and_handles_unknown_ids() {
    let app = TestApp::new(|_| {});
    let history = HistoryStore::new(&app.settings.history_dir);
    let mut older = HistoryRecord::new("older", "first");
    older.created_at -= chrono::Duration::minutes(5);
    history.create(&older).await.expect("create");
    let mut newer = HistoryRecord::new("newer", "second");
    newer.set_image(PageImage {
        index: 0,
        filename: "newer_0.png".to_string(),
        url: "/api/images/newer_0.png".to_string(),
    });
    history.create(&newer).await.expect("create");

    let (status, list) = app.json(Method::GET, "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = list["records"]
        .as_array()
        .expect("records")
        .iter()
        .map(|r| r["id"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["newer", "older"]);

    let (status, _) = app.json(Method::GET, "/api/history/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.json(Method::DELETE, "/api/history/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting a record whose images are already gone still succeeds
    let (status, deleted) = app.json(Method::DELETE, "/api/history/newer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], "newer");
}

#[tokio::test]
async fn config_is_masked_and_switchable() {
    let app = TestApp::new(|dir| {
        write_text_config(dir, "http://127.0.0.1:9");
        fs::write(
            dir.join("text_providers.yaml"),
            fs::read_to_string(dir.join("text_providers.yaml")).expect("read")
                + "  backup:\n    type: google_gemini\n    api_key: AIzaSyBACKUPKEY99\n",
        )
        .expect("append");
    });

    let (status, body) = app.json(Method::GET, "/api/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"]["active_provider"], "fake");
    assert_eq!(body["text"]["providers"][0]["api_key"], "sk-t****6789");
    assert_eq!(body["image"]["active_provider"], "google_genai");
    assert!(!body.to_string().contains("sk-text-0123456789"));

    let (status, updated) = app
        .json(
            Method::PUT,
            "/api/config/active",
            Some(json!({"category": "text", "provider": "backup"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["active_provider"], "backup");
    assert_eq!(updated["providers"][1]["api_key"], "AIza****EY99");

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/config/active",
            Some(json!({"category": "text", "provider": "ghost"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("ghost"));

    let (status, _) = app
        .json(
            Method::PUT,
            "/api/config/active",
            Some(json!({"category": "image", "provider": " "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = TestApp::new(|_| {});
    let (status, doc) = app.json(Method::GET, "/api-doc/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    for path in [
        "/api/health",
        "/api/outline",
        "/api/generate",
        "/api/regenerate",
        "/api/images/{filename}",
        "/api/history",
        "/api/history/{id}",
        "/api/config",
        "/api/config/active",
    ] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}

#[tokio::test]
async fn unparsable_bodies_get_the_error_shape() {
    let app = TestApp::new(|_| {});

    let (status, body) = app.json(Method::POST, "/api/outline", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().expect("error").contains("topic"));

    let (status, body) = app
        .json(Method::POST, "/api/generate", Some(json!({"pages": "all of them"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .json(Method::POST, "/api/regenerate", Some(json!({"task_id": "t"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .json(
            Method::PUT,
            "/api/config/active",
            Some(json!({"category": "video", "provider": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn duplicate_page_indexes_are_a_bad_request() {
    let app = TestApp::new(|_| {});
    let pages = json!([
        {"index": 0, "type": "cover", "content": "a"},
        {"index": 0, "type": "content", "content": "b"}
    ]);

    let (status, body) = app
        .json(Method::POST, "/api/generate", Some(json!({"pages": pages})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("Page index 0"));
}
