//! End-to-end session lifecycle tests against an in-process stub backend.
//!
//! The stub is a small axum router speaking the backend's JSON contract
//! (`/auth/google`, `/auth/logout`, `/me`, the feed endpoints) with per-route
//! hit counters, so the tests can assert not just the resulting state but
//! how many network calls were made to get there.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use shhava_client::store::{CredentialStore, KEY_TOKEN, KEY_USER, MemoryStore};
use shhava_client::{ClientConfig, SessionError, SessionManager, SessionStatus};

/// Token the stub backend hands out on a successful exchange and accepts
/// on `/me`.
const VALID_TOKEN: &str = "tok-server-1";
/// Accepted on `/me` after a 300ms delay, to observe the validating state.
const SLOW_VALID_TOKEN: &str = "tok-slow-valid";
/// Exchange code that succeeds after a 200ms delay.
const SLOW_CODE: &str = "slow-code";
/// Exchange code the backend refuses with `success: false`.
const REJECTED_CODE: &str = "bad-code";

#[derive(Default)]
struct Backend {
    exchange_calls: AtomicUsize,
    me_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

fn user_json() -> Value {
    json!({
        "user_id": "u-1",
        "name": "Meera",
        "email": "meera@example.com",
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-06-01T00:00:00Z"
    })
}

async fn exchange(
    State(backend): State<Arc<Backend>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.exchange_calls.fetch_add(1, Ordering::SeqCst);
    let code = body["code"].as_str().unwrap_or_default();

    if code == SLOW_CODE {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    if code == REJECTED_CODE {
        return (
            StatusCode::OK,
            Json(json!({ "success": false, "message": "Account not eligible" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "token": VALID_TOKEN, "user": user_json() })),
    )
}

async fn me(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    backend.me_calls.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        Some(SLOW_VALID_TOKEN) => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            (StatusCode::OK, Json(json!({ "success": true, "user": user_json() })))
        }
        Some(VALID_TOKEN) => {
            (StatusCode::OK, Json(json!({ "success": true, "user": user_json() })))
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid token" })),
        ),
    }
}

async fn logout(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> StatusCode {
    backend.logout_calls.fetch_add(1, Ordering::SeqCst);
    if bearer(&headers).is_some() { StatusCode::OK } else { StatusCode::UNAUTHORIZED }
}

async fn list_moments(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers) != Some(VALID_TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "moments": [{
                "_id": "m-1",
                "location_name": "Coffee House, Ludhiana",
                "latitude": 30.9,
                "longitude": 75.85,
                "moment_description": "Eyes met over Ghalib verses",
                "emotional_state": "contemplative"
            }]
        })),
    )
}

async fn create_moment(headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    if bearer(&headers) != Some(VALID_TOKEN) || body["location_name"].as_str().is_none() {
        return StatusCode::UNAUTHORIZED;
    }
    StatusCode::CREATED
}

async fn list_flashbacks(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers) != Some(VALID_TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "flashbacks": [{
                "_id": "fb-1",
                "title": "Crossed Paths",
                "story_content": "You both ordered chai at the same stall.",
                "week_start_date": "2025-03-03",
                "week_end_date": "2025-03-09",
                "crossings_count": 2,
                "shared_locations": ["Clock Tower"],
                "is_viewed": false,
                "is_shared": false
            }]
        })),
    )
}

async fn flashback_action(headers: HeaderMap) -> StatusCode {
    if bearer(&headers) == Some(VALID_TOKEN) { StatusCode::OK } else { StatusCode::UNAUTHORIZED }
}

/// Spawn the stub backend on an ephemeral port. Aborting the handle drops
/// the listener, making the base URL unreachable.
async fn spawn_backend(backend: Arc<Backend>) -> (String, JoinHandle<()>) {
    let app = Router::new()
        .route("/auth/google", post(exchange))
        .route("/auth/logout", post(logout))
        .route("/me", get(me))
        .route("/serendipity-moments", get(list_moments).post(create_moment))
        .route("/flashbacks", get(list_flashbacks))
        .route("/flashbacks/{id}/view", post(flashback_action))
        .route("/flashbacks/{id}/share", post(flashback_action))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), handle)
}

fn manager_with_store(base_url: &str, store: Arc<MemoryStore>) -> SessionManager {
    let config = ClientConfig::new(base_url).expect("config");
    SessionManager::new(&config, Box::new(store)).expect("manager")
}

fn seed_credentials(store: &MemoryStore, token: &str) {
    store.set(KEY_TOKEN, token).expect("seed token");
    store.set(KEY_USER, &user_json().to_string()).expect("seed user");
}

// =============================================================
// Startup hydration and one-shot validation
// =============================================================

#[tokio::test]
async fn startup_without_token_makes_no_network_call() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store);

    manager.initialize().await.expect("initialize");

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Unauthenticated);
    assert!(snapshot.user.is_none());
    assert_eq!(backend.me_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn startup_validation_runs_exactly_once() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    seed_credentials(&store, VALID_TOKEN);
    let manager = manager_with_store(&base_url, store);

    manager.initialize().await.expect("initialize");
    manager.initialize().await.expect("initialize again");
    manager.initialize().await.expect("and again");

    assert!(manager.is_authenticated());
    assert_eq!(backend.me_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cached_user_is_visible_while_validation_is_in_flight() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    seed_credentials(&store, SLOW_VALID_TOKEN);
    let manager = Arc::new(manager_with_store(&base_url, store));

    let task = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.initialize().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mid_flight = manager.snapshot();
    assert_eq!(mid_flight.status, SessionStatus::Validating);
    assert_eq!(mid_flight.user.map(|u| u.id), Some("u-1".to_owned()));

    task.await.expect("join").expect("initialize");
    assert!(manager.is_authenticated());
}

#[tokio::test]
async fn rejected_startup_token_clears_credentials_silently() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    seed_credentials(&store, "tok-stale");
    let manager = manager_with_store(&base_url, store.clone());

    manager.initialize().await.expect("initialize");

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Unauthenticated);
    assert!(snapshot.user.is_none());
    assert!(snapshot.login_error.is_none(), "validation failure must stay silent");
    assert!(store.get(KEY_TOKEN).expect("get").is_none());
    assert!(store.get(KEY_USER).expect("get").is_none());
    assert_eq!(backend.me_calls.load(Ordering::SeqCst), 1);
}

// =============================================================
// Login
// =============================================================

#[tokio::test]
async fn successful_login_authenticates_and_persists_server_token() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store.clone());
    manager.initialize().await.expect("initialize");

    manager.login("good-code").await.expect("login");

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Authenticated);
    assert_eq!(snapshot.user.as_ref().map(|u| u.email.as_str()), Some("meera@example.com"));
    assert!(snapshot.login_error.is_none());
    assert!(!snapshot.loading);
    assert_eq!(store.get(KEY_TOKEN).expect("get").as_deref(), Some(VALID_TOKEN));
    assert!(store.get(KEY_USER).expect("get").is_some());
}

#[tokio::test]
async fn rejected_login_surfaces_the_server_message() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store.clone());
    manager.initialize().await.expect("initialize");

    let err = manager.login(REJECTED_CODE).await.expect_err("login must fail");
    assert!(matches!(err, SessionError::LoginFailed(_)));

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Error);
    assert!(!snapshot.is_authenticated());
    assert_eq!(snapshot.login_error.as_deref(), Some("Account not eligible"));
    assert!(store.get(KEY_TOKEN).expect("get").is_none(), "nothing may be persisted");
}

#[tokio::test]
async fn overlapping_login_is_rejected_without_a_second_exchange() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store);
    manager.initialize().await.expect("initialize");

    let (first, second) = tokio::join!(manager.login(SLOW_CODE), manager.login(SLOW_CODE));

    assert!(first.is_ok());
    assert!(matches!(second, Err(SessionError::LoginInFlight)));
    assert_eq!(backend.exchange_calls.load(Ordering::SeqCst), 1);

    // The busy flag releases once the first exchange resolves.
    manager.logout().await;
    manager.login("good-code").await.expect("retry after release");
}

// =============================================================
// Logout
// =============================================================

#[tokio::test]
async fn logout_notifies_the_server_and_clears_everything() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store.clone());
    manager.initialize().await.expect("initialize");
    manager.login("good-code").await.expect("login");

    manager.logout().await;

    assert_eq!(backend.logout_calls.load(Ordering::SeqCst), 1);
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Unauthenticated);
    assert!(snapshot.user.is_none());
    assert!(store.get(KEY_TOKEN).expect("get").is_none());
    assert!(store.get(KEY_USER).expect("get").is_none());
}

#[tokio::test]
async fn logout_clears_local_state_even_when_the_server_is_unreachable() {
    let backend = Arc::new(Backend::default());
    let (base_url, server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    seed_credentials(&store, VALID_TOKEN);
    let manager = manager_with_store(&base_url, store.clone());
    manager.initialize().await.expect("initialize");
    assert!(manager.is_authenticated());

    // Kill the backend; the logout notification will fail on the wire.
    server.abort();
    let _ = server.await;

    manager.logout().await;

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.status, SessionStatus::Unauthenticated);
    assert!(snapshot.user.is_none());
    assert!(store.get(KEY_TOKEN).expect("get").is_none());
    assert!(store.get(KEY_USER).expect("get").is_none());
}

#[tokio::test]
async fn logout_without_a_session_skips_the_server_call() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store);
    manager.initialize().await.expect("initialize");

    manager.logout().await;

    assert_eq!(backend.logout_calls.load(Ordering::SeqCst), 0);
    assert_eq!(manager.snapshot().status, SessionStatus::Unauthenticated);
}

// =============================================================
// Authenticated feed endpoints
// =============================================================

#[tokio::test]
async fn feed_endpoints_attach_the_bearer_token_and_decode() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store);
    manager.initialize().await.expect("initialize");
    manager.login("good-code").await.expect("login");
    let token = manager.token().expect("token");

    let moments = manager.api().list_moments(&token).await.expect("moments");
    assert_eq!(moments.len(), 1);
    assert_eq!(moments[0].location_name, "Coffee House, Ludhiana");

    let flashbacks = manager.api().list_flashbacks(&token).await.expect("flashbacks");
    assert_eq!(flashbacks.len(), 1);
    assert_eq!(flashbacks[0].id, "fb-1");
    assert_eq!(flashbacks[0].crossings_count, 2);

    manager
        .api()
        .create_moment(
            &token,
            &shhava_client::net::types::NewSerendipityMoment {
                location_name: "Clock Tower".to_owned(),
                latitude: 30.91,
                longitude: 75.85,
                moment_description: "Same bench, same sunset".to_owned(),
                emotional_state: "hopeful".to_owned(),
            },
        )
        .await
        .expect("create moment");

    manager.api().mark_flashback_viewed(&token, "fb-1").await.expect("view");
    manager.api().share_flashback(&token, "fb-1").await.expect("share");
}

#[tokio::test]
async fn feed_endpoints_reject_a_bad_token() {
    let backend = Arc::new(Backend::default());
    let (base_url, _server) = spawn_backend(backend.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let manager = manager_with_store(&base_url, store);

    let err = manager.api().list_moments("tok-forged").await.expect_err("must fail");
    assert!(matches!(err, shhava_client::ApiError::Status(401)));
}
