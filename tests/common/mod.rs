// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::post,
    Json, Router,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pocketkit::config::Config;
use pocketkit::routes::create_router;
use pocketkit::AppState;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Signing key of the mock PocketBase.
pub const MOCK_SECRET: &[u8] = b"mock_pocketbase_signing_key";

/// Credentials accepted by the mock password endpoint.
#[allow(dead_code)]
pub const TEST_EMAIL: &str = "a@b.com";
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "correct horse battery";

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Create a PocketBase-style auth token expiring `exp_offset` seconds from now.
pub fn mint_token(user_id: &str, exp_offset: i64) -> String {
    let claims = json!({
        "id": user_id,
        "type": "auth",
        "collectionId": "_pb_users_auth_",
        "refreshable": true,
        "exp": now() + exp_offset,
    });

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(MOCK_SECRET),
    )
    .unwrap()
}

/// The record used throughout the tests.
pub fn test_record() -> Value {
    json!({"id": "u1", "email": TEST_EMAIL, "verified": true})
}

/// In-process stand-in for PocketBase's auth endpoints.
#[derive(Default)]
pub struct MockPocketBase {
    refresh_calls: AtomicUsize,
    revoked: Mutex<HashSet<String>>,
}

#[allow(dead_code)]
impl MockPocketBase {
    /// Reject this token on refresh even though it is still unexpired.
    pub fn revoke(&self, token: &str) {
        self.revoked.lock().unwrap().insert(token.to_string());
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"code": status.as_u16(), "message": message, "data": {}})),
    )
}

async fn auth_refresh(
    State(mock): State<Arc<MockPocketBase>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    mock.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    let revoked = mock.revoked.lock().unwrap().contains(token);
    let verified = decode::<Value>(
        token,
        &DecodingKey::from_secret(MOCK_SECRET),
        &Validation::new(Algorithm::HS256),
    )
    .is_ok();

    if revoked || !verified {
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "The request requires valid record authorization token.",
        ));
    }

    Ok(Json(json!({
        "token": mint_token("u1", 3600),
        "record": test_record(),
    })))
}

#[derive(Deserialize)]
struct PasswordBody {
    identity: String,
    password: String,
}

async fn auth_with_password(
    Json(body): Json<PasswordBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.identity != TEST_EMAIL || body.password != TEST_PASSWORD {
        return Err(api_error(StatusCode::BAD_REQUEST, "Failed to authenticate."));
    }

    Ok(Json(json!({
        "token": mint_token("u1", 3600),
        "record": test_record(),
    })))
}

/// Serve a router on an ephemeral local port. Returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start a mock PocketBase. Returns its base URL and a handle for assertions.
pub async fn spawn_mock_pocketbase() -> (String, Arc<MockPocketBase>) {
    let mock = Arc::new(MockPocketBase::default());
    let router = Router::new()
        .route(
            "/api/collections/users/auth-refresh",
            post(auth_refresh),
        )
        .route(
            "/api/collections/users/auth-with-password",
            post(auth_with_password),
        )
        .with_state(mock.clone());

    (serve(router).await, mock)
}

/// Create a test app talking to the given PocketBase URL.
pub fn create_test_app(pocketbase_url: &str) -> (Router, Arc<AppState>) {
    let config = Config {
        pocketbase_url: pocketbase_url.to_string(),
        ..Config::test_default()
    };
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Create a test app whose PocketBase is unreachable.
#[allow(dead_code)]
pub fn create_offline_test_app() -> (Router, Arc<AppState>) {
    // Port 9 (discard) is not listening on test machines
    create_test_app("http://127.0.0.1:9")
}

/// All Set-Cookie header values of a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The `pb_auth` Set-Cookie header, if the response has one.
#[allow(dead_code)]
pub fn auth_set_cookie(response: &Response) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with("pb_auth="))
}

/// `pb_auth=<value>` suitable for a Cookie request header.
#[allow(dead_code)]
pub fn auth_cookie_pair(response: &Response) -> Option<String> {
    auth_set_cookie(response).and_then(|value| value.split(';').next().map(str::to_string))
}

/// Read a JSON body.
#[allow(dead_code)]
pub async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
