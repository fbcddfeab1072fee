// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use social_photos::config::Config;
use social_photos::db::Store;
use social_photos::routes::create_router;
use social_photos::services::InMemoryAssetStore;
use social_photos::AppState;
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "----social-photos-test-boundary";

/// Test app wired to an in-memory image store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub assets: Arc<InMemoryAssetStore>,
}

/// Create a test app with offline dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let config = Config::test_default();
    let assets = Arc::new(InMemoryAssetStore::new());
    let state = Arc::new(AppState::new(config, Store::new(), assets.clone()));

    TestApp {
        router: create_router(state.clone()),
        state,
        assets,
    }
}

impl TestApp {
    /// Send one request through a fresh clone of the router.
    #[allow(dead_code)]
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register `username` and log in, returning (user ID, token).
    #[allow(dead_code)]
    pub async fn register_and_login(&self, username: &str) -> (u64, String) {
        let response = self
            .send(json_request(
                "POST",
                "/api/auth/register",
                serde_json::json!({ "username": username, "password": "password" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                serde_json::json!({ "username": username, "password": "password" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();
        let user_id = body["user"]["id"].as_u64().unwrap();
        (user_id, token)
    }

    /// Upload a small image for `user_id`, returning the response.
    #[allow(dead_code)]
    pub async fn upload(&self, user_id: u64, token: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(format!("/api/users/{}/photos", user_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(b"\xff\xd8\xff\xe0fake-jpeg", Some("me"))))
                .unwrap(),
        )
        .await
    }

    /// Upload and return the created photo ID.
    #[allow(dead_code)]
    pub async fn upload_ok(&self, user_id: u64, token: &str) -> u64 {
        let response = self.upload(user_id, token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        read_json(response).await["id"].as_u64().unwrap()
    }
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a bodiless request with a bearer token.
#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Multipart body with a `file` part and optional `description`.
#[allow(dead_code)]
pub fn multipart_body(file: &[u8], description: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(description) = description {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{}\r\n",
                BOUNDARY, description
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"me.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
            BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
