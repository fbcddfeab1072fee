// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo upload / set-main / delete tests through the HTTP API.

use axum::http::{header, StatusCode};
use tower::ServiceExt;

mod common;
use common::{authed_request, create_test_app, read_json};

#[tokio::test]
async fn test_first_upload_is_main_second_is_not() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;

    let response = app.upload(user_id, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let first = read_json(response).await;
    assert_eq!(first["isMain"], true);
    assert_eq!(first["description"], "me");
    assert_eq!(
        location,
        format!("/api/users/{}/photos/{}", user_id, first["id"])
    );

    let response = app.upload(user_id, &token).await;
    let second = read_json(response).await;
    assert_eq!(second["isMain"], false);

    // First photo is still main
    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos/main", user_id),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["id"], first["id"]);
}

#[tokio::test]
async fn test_upload_for_other_user_is_unauthorized() {
    let app = create_test_app();
    let (_, bob_token) = app.register_and_login("bob").await;
    let (alice_id, _) = app.register_and_login("alice").await;

    let response = app.upload(alice_id, &bob_token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.assets.is_empty());
}

#[tokio::test]
async fn test_upload_store_failure_creates_no_photo() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    app.assets.set_fail_uploads(true);

    let response = app.upload(user_id, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "asset_store_error");
    // Raw store errors are not exposed
    assert!(body.get("details").is_none());

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos/main", user_id),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_main_moves_flag() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    let first = app.upload_ok(user_id, &token).await;
    let second = app.upload_ok(user_id, &token).await;

    let response = app
        .send(authed_request(
            "POST",
            &format!("/api/users/{}/photos/{}/setMain", user_id, second),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos/{}", user_id, first),
            &token,
        ))
        .await;
    assert_eq!(read_json(response).await["isMain"], false);

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos/{}", user_id, second),
            &token,
        ))
        .await;
    assert_eq!(read_json(response).await["isMain"], true);
}

#[tokio::test]
async fn test_set_main_on_current_main_is_bad_request() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    let first = app.upload_ok(user_id, &token).await;

    let response = app
        .send(authed_request(
            "POST",
            &format!("/api/users/{}/photos/{}/setMain", user_id, first),
            &token,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_state");
}

#[tokio::test]
async fn test_set_main_on_someone_elses_photo_is_unauthorized() {
    let app = create_test_app();
    let (bob_id, bob_token) = app.register_and_login("bob").await;
    let (alice_id, alice_token) = app.register_and_login("alice").await;
    app.upload_ok(bob_id, &bob_token).await;
    app.upload_ok(alice_id, &alice_token).await;
    let alices_second = app.upload_ok(alice_id, &alice_token).await;

    // Bob's own path, Alice's photo
    let response = app
        .send(authed_request(
            "POST",
            &format!("/api/users/{}/photos/{}/setMain", bob_id, alices_second),
            &bob_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Alice's path with Bob's token
    let response = app
        .send(authed_request(
            "POST",
            &format!("/api/users/{}/photos/{}/setMain", alice_id, alices_second),
            &bob_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_main_photo_is_refused() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    let first = app.upload_ok(user_id, &token).await;

    let response = app
        .send(authed_request(
            "DELETE",
            &format!("/api/users/{}/photos/{}", user_id, first),
            &token,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_state");
    assert_eq!(app.assets.len(), 1);
}

#[tokio::test]
async fn test_delete_non_main_photo() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    app.upload_ok(user_id, &token).await;
    let second = app.upload_ok(user_id, &token).await;

    let response = app
        .send(authed_request(
            "DELETE",
            &format!("/api/users/{}/photos/{}", user_id, second),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.assets.len(), 1);

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos/{}", user_id, second),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_store_failure_keeps_photo() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    app.upload_ok(user_id, &token).await;
    let second = app.upload_ok(user_id, &token).await;
    app.assets.set_fail_deletes(true);

    let response = app
        .send(authed_request(
            "DELETE",
            &format!("/api/users/{}/photos/{}", user_id, second),
            &token,
        ))
        .await;
    assert!(response.status().is_server_error());
    assert_eq!(read_json(response).await["error"], "asset_store_error");

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos/{}", user_id, second),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_photo_under_wrong_user_is_not_found() {
    let app = create_test_app();
    let (bob_id, bob_token) = app.register_and_login("bob").await;
    let (alice_id, _) = app.register_and_login("alice").await;
    let photo = app.upload_ok(bob_id, &bob_token).await;

    let response = app
        .send(authed_request(
            "GET",
            &format!("/api/users/{}/photos/{}", alice_id, photo),
            &bob_token,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_reports_main_photo_url() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    let response = app.upload(user_id, &token).await;
    let url = read_json(response).await["url"].clone();

    let response = app
        .send(common::json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": "bob", "password": "password" }),
        ))
        .await;

    assert_eq!(read_json(response).await["user"]["photoUrl"], url);
}

#[tokio::test]
async fn test_login_not_delayed_by_slow_delete() {
    let app = create_test_app();
    let (user_id, token) = app.register_and_login("bob").await;
    let response = app.upload(user_id, &token).await;
    let main_url = read_json(response).await["url"].clone();
    let second = app.upload_ok(user_id, &token).await;
    app.assets.set_latency(std::time::Duration::from_millis(1000));

    let router = app.router.clone();
    let delete = authed_request(
        "DELETE",
        &format!("/api/users/{}/photos/{}", user_id, second),
        &token,
    );
    let in_flight = tokio::spawn(async move { router.oneshot(delete).await.unwrap() });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let response = tokio::time::timeout(
        std::time::Duration::from_millis(500),
        app.send(common::json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({ "username": "bob", "password": "password" }),
        )),
    )
    .await
    .expect("login waited on the image store delete");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["user"]["photoUrl"], main_url);

    let response = in_flight.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
