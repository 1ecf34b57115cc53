// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end session tests against a mock PocketBase.
//!
//! Covers login → page render → logout, and the window where a revoked but
//! unexpired token passes the gate and is only caught by page validation.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use pocketkit::services::{is_well_formed, refresh_and_validate, AuthStore, ClientFactory};
use serde_json::json;
use tower::ServiceExt;

mod common;

async fn login(app: &Router, token: &str) -> String {
    let body = json!({"token": token, "record": common::test_record()});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    common::auth_cookie_pair(&response).expect("login should set pb_auth")
}

async fn get_home(app: &Router, cookie: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri("/");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_login_then_home_shows_identity() {
    let (pocketbase_url, mock) = common::spawn_mock_pocketbase().await;
    let (app, _) = common::create_test_app(&pocketbase_url);

    let cookie = login(&app, &common::mint_token("u1", 3600)).await;
    let response = get_home(&app, Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.refresh_calls(), 1);

    // Refreshed session is written back
    assert!(common::auth_set_cookie(&response).is_some());

    assert_eq!(
        common::json_body(response).await,
        json!({"id": "u1", "email": "a@b.com", "verified": true})
    );
}

#[tokio::test]
async fn test_logout_then_home_redirects() {
    let (pocketbase_url, _) = common::spawn_mock_pocketbase().await;
    let (app, _) = common::create_test_app(&pocketbase_url);

    let cookie = login(&app, &common::mint_token("u1", 3600)).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let removal = common::auth_cookie_pair(&response).unwrap();
    assert_eq!(removal, "pb_auth=");

    // The browser now sends no cookie
    let response = get_home(&app, None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/login"
    );
}

#[tokio::test]
async fn test_revoked_token_passes_gate_but_fails_page_validation() {
    let (pocketbase_url, mock) = common::spawn_mock_pocketbase().await;
    let (app, _) = common::create_test_app(&pocketbase_url);

    let token = common::mint_token("u1", 3600);
    let cookie = login(&app, &token).await;
    mock.revoke(&token);

    let response = get_home(&app, Some(&cookie)).await;

    // The gate let it through (the page handler ran and asked PocketBase)
    assert_eq!(mock.refresh_calls(), 1);
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/login"
    );

    let removal = common::auth_set_cookie(&response).expect("cookie should be removed");
    assert!(removal.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_provider_unavailable_is_unauthenticated() {
    let (app, _) = common::create_offline_test_app();

    let cookie = login(&app, &common::mint_token("u1", 3600)).await;
    let response = get_home(&app, Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_refresh_skips_network_for_invalid_credentials() {
    let (pocketbase_url, mock) = common::spawn_mock_pocketbase().await;
    let (_, state) = common::create_test_app(&pocketbase_url);

    let mut empty = state.clients.new_handle();
    assert_eq!(refresh_and_validate(&mut empty).await, None);

    let mut expired = state.clients.new_handle();
    expired
        .auth_store
        .save(common::mint_token("u1", -3600), None);
    assert_eq!(refresh_and_validate(&mut expired).await, None);

    assert_eq!(mock.refresh_calls(), 0);
}

#[tokio::test]
async fn test_refresh_failure_clears_handle() {
    let (pocketbase_url, mock) = common::spawn_mock_pocketbase().await;
    let (_, state) = common::create_test_app(&pocketbase_url);

    let token = common::mint_token("u1", 3600);
    mock.revoke(&token);

    let mut pb = state.clients.new_handle();
    pb.auth_store.save(token, common::test_record().as_object().cloned());
    assert!(is_well_formed(&pb));

    assert_eq!(refresh_and_validate(&mut pb).await, None);
    assert_eq!(pb.auth_store, AuthStore::default());
    assert_eq!(mock.refresh_calls(), 1);
}

#[tokio::test]
async fn test_export_round_trip_preserves_validity() {
    let factory: ClientFactory = {
        let (_, state) = common::create_offline_test_app();
        state.clients.clone()
    };

    for offset in [3600, -3600] {
        let mut original = factory.new_handle();
        original
            .auth_store
            .save(common::mint_token("u1", offset), None);

        let value = pocketkit::services::cookie::export_value(&original.auth_store.export_to_cookie())
            .unwrap()
            .to_string();
        let restored = factory.handle_from_cookie(&value);

        assert_eq!(is_well_formed(&restored), is_well_formed(&original));
        assert_eq!(restored.auth_store, original.auth_store);
    }
}
