//! End-to-end tests driving the full router with hand-built multipart bodies.

use api_lib::config::Config;
use api_lib::web::{build_app, state::AppState};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "catalog-test-boundary";
const BASE_URL: &str = "http://catalog.test";

//=========================================================================================
// Helpers
//=========================================================================================

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                field,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn form_request(method: Method, uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn png(file_name: &str) -> Part<'_> {
    Part::File {
        field: "image",
        file_name,
        content_type: "image/png",
        bytes: b"\x89PNG\r\n\x1a\nfake".to_vec(),
    }
}

struct TestApp {
    dir: TempDir,
    storage_mode: &'static str,
}

impl TestApp {
    fn new(storage_mode: &'static str) -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            storage_mode,
        }
    }

    fn uploads_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    async fn router(&self) -> Router {
        let mut vars = HashMap::new();
        vars.insert("PUBLIC_BASE_URL", BASE_URL.to_string());
        vars.insert("STORAGE_MODE", self.storage_mode.to_string());
        vars.insert(
            "UPLOADS_DIR",
            self.uploads_dir().to_string_lossy().into_owned(),
        );
        vars.insert(
            "DATA_FILE",
            self.dir
                .path()
                .join("data")
                .join("products.json")
                .to_string_lossy()
                .into_owned(),
        );
        let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("config");
        let state = AppState::from_config(Arc::new(config))
            .await
            .expect("app state");
        build_app(Arc::new(state))
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// `http://catalog.test/uploads/<file>` → `<uploads dir>/<file>`
fn file_on_disk(uploads_dir: &Path, image_url: &str) -> PathBuf {
    let file_name = image_url
        .strip_prefix(&format!("{BASE_URL}/uploads/"))
        .expect("image served from our uploads");
    uploads_dir.join(file_name)
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn create_then_list_and_get() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (status, created) = send(
        &app,
        form_request(
            Method::POST,
            "/api/products",
            &[
                Part::Text("name", "Linen"),
                Part::Text("price", "12.5"),
                Part::Text("tags", "eco, natural"),
                Part::Text("composition", "100% linen"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    let product = &created["data"];
    assert_eq!(product["price"], 12.5);
    assert_eq!(product["tags"], serde_json::json!(["eco", "natural"]));
    assert_eq!(product["specifications"]["composition"], "100% linen");
    assert_eq!(product["specifications"]["weave"], "");
    assert_eq!(product["image"], "");
    assert_eq!(product["inStock"], true);
    assert_eq!(product["createdAt"], product["updatedAt"]);
    let id = product["id"].as_str().expect("id");

    let (status, listed) = send(&app, empty_request(Method::GET, "/api/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["data"][0]["id"], id);

    let (status, fetched) = send(

        &app,

        empty_request(Method::GET, &format!("/api/products/{id}")),

    )

    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["name"], "Linen");
}

#[tokio::test]
async fn create_without_name_is_rejected() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (status, body) = send(
        &app,
        form_request(Method::POST, "/api/products", &[Part::Text("price", "3")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "validation_error");

    let (_, listed) = send(&app, empty_request(Method::GET, "/api/products")).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn non_multipart_body_gets_failure_envelope() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Linen"}"#))
        .expect("request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn uploaded_image_is_stored_resolved_and_served() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (status, created) = send(
        &app,
        form_request(
            Method::POST,
            "/api/products",
            &[Part::Text("name", "Denim"), png("denim.png")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let image = created["data"]["image"].as_str().expect("image").to_string();
    assert!(image.starts_with(&format!("{BASE_URL}/uploads/product-")), "{image}");
    assert!(image.ends_with(".png"), "{image}");
    assert!(file_on_disk(&test.uploads_dir(), &image).exists());

    let path = image.trim_start_matches(BASE_URL);
    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, path))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn replacing_image_removes_previous_file() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (_, created) = send(
        &app,
        form_request(
            Method::POST,
            "/api/products",
            &[Part::Text("name", "Denim"), Part::Text("price", "20"), png("old.png")],
        ),
    )
    .await;
    let id = created["data"]["id"].as_str().expect("id").to_string();
    let old_file = file_on_disk(
        &test.uploads_dir(),
        created["data"]["image"].as_str().expect("image"),
    );
    assert!(old_file.exists());

    let (status, updated) = send(
        &app,
        form_request(Method::PUT, &format!("/api/products/{id}"), &[png("new.png")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_file = file_on_disk(
        &test.uploads_dir(),
        updated["data"]["image"].as_str().expect("image"),
    );

    assert!(!old_file.exists());
    assert!(new_file.exists());
    assert_eq!(updated["data"]["name"], "Denim");
    assert_eq!(updated["data"]["price"], 20.0);
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (_, created) = send(
        &app,
        form_request(
            Method::POST,
            "/api/products",
            &[
                Part::Text("name", "Cotton Duck"),
                Part::Text("price", "10"),
                Part::Text("mainCategory", "Canvas"),
                Part::Text("gsm", "340"),
                Part::Text("tags", "heavy, outdoor"),
            ],
        ),
    )
    .await;
    let before = &created["data"];
    let id = before["id"].as_str().expect("id");

    let (status, updated) = send(
        &app,
        form_request(
            Method::PUT,
            &format!("/api/products/{id}"),
            &[Part::Text("price", "11.5"), Part::Text("specifications[finish]", "waxed")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let after = &updated["data"];
    assert_eq!(after["price"], 11.5);
    assert_eq!(after["name"], before["name"]);
    assert_eq!(after["category"], "Canvas");
    assert_eq!(after["tags"], before["tags"]);
    assert_eq!(after["specifications"]["gsm"], "340");
    assert_eq!(after["specifications"]["finish"], "waxed");
    assert_eq!(after["createdAt"], before["createdAt"]);
}

#[tokio::test]
async fn delete_removes_record_and_image() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (_, created) = send(
        &app,
        form_request(
            Method::POST,
            "/api/products",
            &[Part::Text("name", "Chambray"), png("chambray.png")],
        ),
    )
    .await;
    let id = created["data"]["id"].as_str().expect("id").to_string();
    let file = file_on_disk(
        &test.uploads_dir(),
        created["data"]["image"].as_str().expect("image"),
    );

    let (status, deleted) = send(

        &app,

        empty_request(Method::DELETE, &format!("/api/products/{id}")),

    )

    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"]["id"], id.as_str());
    assert!(!file.exists());

    let (status, body) = send(

        &app,

        empty_request(Method::DELETE, &format!("/api/products/{id}")),

    )

    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/products/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        form_request(Method::PUT, "/api/products/nope", &[Part::Text("name", "X")]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_image_attachments_are_rejected() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (status, body) = send(
        &app,
        form_request(
            Method::POST,
            "/api/products",
            &[
                Part::Text("name", "Twill"),
                Part::File {
                    field: "image",
                    file_name: "notes.txt",
                    content_type: "text/plain",
                    bytes: b"hello".to_vec(),
                },
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "unsupported_media_type");

    let (_, listed) = send(&app, empty_request(Method::GET, "/api/products")).await;
    assert_eq!(listed["count"], 0);
    let stored = std::fs::read_dir(test.uploads_dir()).expect("uploads dir").count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn oversized_images_are_rejected() {
    let test = TestApp::new("memory");
    let app = test.router().await;

    let (status, body) = send(
        &app,
        form_request(
            Method::POST,
            "/api/products",
            &[
                Part::Text("name", "Velvet"),
                Part::File {
                    field: "image",
                    file_name: "huge.png",
                    content_type: "image/png",
                    bytes: vec![0u8; catalog_core::MAX_IMAGE_BYTES + 1],
                },
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "payload_too_large");
}

#[tokio::test]
async fn json_storage_survives_restart() {
    let test = TestApp::new("json");
    let app = test.router().await;

    let (status, created) = send(
        &app,
        form_request(Method::POST, "/api/products", &[Part::Text("name", "Organza")]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let restarted = test.router().await;
    let (status, fetched) = send(
        &restarted,
        empty_request(Method::GET, &format!("/api/products/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["name"], "Organza");
}

#[tokio::test]
async fn health_reports_product_count() {
    let test = TestApp::new("memory");
    let app = test.router().await;
    send(
        &app,
        form_request(Method::POST, "/api/products", &[Part::Text("name", "Voile")]),
    )
    .await;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["products"], 1);
    assert!(body["data"]["uptimeSeconds"].as_i64().is_some());
}
