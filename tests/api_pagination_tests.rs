// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API pagination tests.
//!
//! These tests verify that:
//! 1. Paging counters travel in the `Pagination` header, not the body
//! 2. Non-positive page parameters are rejected

use axum::http::StatusCode;
use social_photos::pagination::PaginationHeader;

mod common;
use common::{authed_request, create_test_app, read_json};

fn pagination(response: &axum::http::Response<axum::body::Body>) -> PaginationHeader {
    let raw = response
        .headers()
        .get("Pagination")
        .expect("Pagination header missing")
        .to_str()
        .unwrap();
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn test_user_list_pagination_header() {
    let app = create_test_app();
    let mut token = String::new();
    for name in ["ann", "bob", "cat", "dan", "eve", "fay", "gus"] {
        token = app.register_and_login(name).await.1;
    }

    let response = app
        .send(authed_request(
            "GET",
            "/api/users?pageNumber=2&pageSize=5",
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let meta = pagination(&response);
    assert_eq!(
        meta,
        PaginationHeader {
            current_page: 2,
            items_per_page: 5,
            total_pages: 2,
            total_items: 7,
        }
    );

    // Body is the bare page
    let body = read_json(response).await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["username"], "fay");
}

#[tokio::test]
async fn test_photo_list_pagination() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    for _ in 0..3 {
        app.upload_ok(user_id, &token).await;
    }

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos?pageNumber=1&pageSize=2", user_id),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let meta = pagination(&response);
    assert_eq!(meta.total_pages, 2);
    assert_eq!(meta.total_items, 3);

    let body = read_json(response).await;
    let photos = body.as_array().unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0]["isMain"], true);
}

#[tokio::test]
async fn test_empty_photo_list_has_zero_pages() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos", user_id),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let meta = pagination(&response);
    assert_eq!(meta.total_pages, 0);
    assert_eq!(meta.current_page, 1);
    assert_eq!(meta.items_per_page, 10);
}

#[tokio::test]
async fn test_page_zero_rejected() {
    let app = create_test_app();
    let (_, token) = app.register_and_login("bob").await;

    let response = app
        .send(authed_request("GET", "/api/users?pageNumber=0", &token))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_argument");
}

#[tokio::test]
async fn test_negative_page_size_rejected() {
    let app = create_test_app();
    let (_, token) = app.register_and_login("bob").await;

    let response = app
        .send(authed_request("GET", "/api/users?pageSize=-5", &token))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
