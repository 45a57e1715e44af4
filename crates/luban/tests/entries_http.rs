use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use luban::server::{router, ServerState};
use luban::ServiceConfig;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

const ENTRY: &str = "/currentUser/entry";

fn app(config: ServiceConfig) -> Router {
    router(Arc::new(ServerState::from_config(config)))
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-luban-user-id", "u1")
        .header("x-luban-user-name", "alice");
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response");
    read_json(response).await
}

async fn get(app: &Router, uri: &str) -> Value {
    call(app, Method::GET, uri, None).await.1
}

async fn create(app: &Router, dir: &str, name: &str, kind: &str) -> Value {
    let body = json!({
        "dir": dir,
        "entry": { "name": name, "type": kind, "comment": "", "icon": "" }
    });
    call(app, Method::POST, ENTRY, Some(body)).await.1
}

async fn delete(app: &Router, dir: &str, name: &str) -> Value {
    let body = json!({ "dir": dir, "entryName": name });
    call(app, Method::DELETE, ENTRY, Some(body)).await.1
}

#[tokio::test]
async fn health_needs_no_identity() {
    let app = app(ServiceConfig::default());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_identity_is_unauthenticated() {
    let app = app(ServiceConfig::default());
    let response = app
        .oneshot(Request::get("/currentUser").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn create_list_and_delete() {
    let app = app(ServiceConfig::default());

    let body = create(&app, "/", "entry1", "App").await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["type"], "application");
    assert!(body["data"]["appId"].is_u64());
    assert!(body["data"].get("children").is_none());

    let body = create(&app, "/", "entry1", "application").await;
    assert_eq!(body["code"], 200);
    assert_eq!(
        body["message"],
        "entry(entry1) already exists under directory(/)"
    );

    let body = get(&app, "/currentUser").await;
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["rootDir"].as_array().map(Vec::len), Some(1));

    let body = delete(&app, "/", "entry1").await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"], Value::Null);

    let body = get(&app, "/currentUser/entry?dir=/").await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn nested_tree_and_error_codes() {
    let app = app(ServiceConfig::default());
    let steps = [("/", "a", "directory"), ("/a/", "b", "directory"), ("/a/b/", "c", "app")];
    for (dir, name, kind) in steps {
        let body = create(&app, dir, name, kind).await;
        assert_eq!(body["code"], 0, "create {dir}{name}");
    }

    let body = get(&app, "/currentUser/entry?dir=/a/b/").await;
    assert_eq!(body["data"][0]["name"], "c");

    assert_eq!(delete(&app, "/", "a").await["code"], 201);
    assert_eq!(create(&app, "/dir/", "x", "directory").await["code"], 103);
    assert_eq!(create(&app, "a/", "x", "directory").await["code"], 102);
    assert_eq!(create(&app, "/", "x", "folder").await["code"], 102);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let app = app(ServiceConfig::default());
    let request = Request::post(ENTRY)
        .header("x-luban-user-id", "u1")
        .header("content-type", "application/json")
        .body(Body::from("{\"dir\":"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 100);
}

#[tokio::test]
async fn unknown_user_without_provisioning() {
    let app = app(ServiceConfig {
        auto_provision_users: false,
        ..ServiceConfig::default()
    });
    let (status, body) = call(&app, Method::GET, "/currentUser", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 104);
}

#[tokio::test]
async fn app_content_save_and_publish() {
    let app = app(ServiceConfig::default());
    let body = create(&app, "/", "entry1", "application").await;
    let app_id = body["data"]["appId"].as_u64().expect("app id");

    let content = json!({ "widgets": [1] });
    let save = format!("/app?appId={app_id}&op=save");
    let (_, body) = call(&app, Method::POST, &save, Some(content.clone())).await;
    assert_eq!(body["code"], 0);

    let body = get(&app, &format!("/app?appId={app_id}&loadType=edit")).await;
    assert_eq!(body["data"], content);
    let body = get(&app, &format!("/app?appId={app_id}&loadType=view")).await;
    assert_eq!(body["data"], Value::Null);

    let body = get(&app, &format!("/app?appId={app_id}&loadType=raw")).await;
    assert_eq!(body["code"], 101);
    assert_eq!(get(&app, "/app?appId=999&loadType=view").await["code"], 103);
    assert_eq!(get(&app, "/app?loadType=view").await["code"], 102);
}

#[tokio::test]
async fn file_storage_survives_restart() {
    let dir = tempdir().expect("tempdir");
    let config = ServiceConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..ServiceConfig::default()
    };

    let first = app(config.clone());
    assert_eq!(create(&first, "/", "a", "directory").await["code"], 0);
    assert!(dir.path().join("users").join("u1.json").exists());

    let second = app(config);
    let body = get(&second, ENTRY).await;
    assert_eq!(body["data"][0]["name"], "a");
    assert_eq!(body["data"][0]["children"], json!([]));
}
