//! End-to-end auth flows against a local axum server standing in for the
//! backend: cookie-carried refresh credential (persisted across restarts),
//! single-flight refresh, logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use portal_auth::{AuthClientError, AuthContext, AuthEvent, LoginOutcome, Settings};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Backend {
    refresh_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

fn grant(token: &str) -> Value {
    json!({
        "status": 200,
        "data": {
            "accessToken": token,
            "expiresIn": 900,
            "username": "ana@example.com",
            "roles": ["CANDIDATE"]
        }
    })
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "wrong" {
        // HTTP 200 wrapping a business 401
        return (
            StatusCode::OK,
            [(header::SET_COOKIE, "ignored=1")],
            Json(json!({"status": 401, "message": "Bad credentials"})),
        );
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "refresh=abc; HttpOnly; Path=/")],
        Json(grant("T1")),
    )
}

async fn refresh(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> impl IntoResponse {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("refresh=abc"))
        .unwrap_or(false);

    if has_cookie {
        (StatusCode::OK, Json(grant("T2")))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": 401, "message": "missing refresh cookie"})),
        )
    }
}

async fn logout(State(backend): State<Arc<Backend>>) -> Json<Value> {
    backend.logout_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"status": 200}))
}

async fn start_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

fn context(api_url: String, dir: &tempfile::TempDir) -> AuthContext {
    let settings = Settings {
        api_url,
        storage_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    AuthContext::bootstrap(settings).unwrap()
}

async fn signed_in(ctx: &AuthContext) {
    match ctx.auth_client.login("ana@example.com", "secret").await.unwrap() {
        LoginOutcome::Authenticated(grant) => {
            ctx.sign_in(grant).unwrap();
        }
        LoginOutcome::OtpRequired(_) => panic!("backend does not ask for OTP"),
    }
}

#[tokio::test]
async fn refresh_cookie_from_login_is_used_once_for_concurrent_callers() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(url, &dir);

    signed_in(&ctx).await;
    assert_eq!(ctx.tokens.get().unwrap().access_token(), "T1");

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..5 {
        let coordinator = ctx.coordinator.clone();
        set.spawn(async move { coordinator.ensure_fresh_token().await });
    }
    while let Some(result) = set.join_next().await {
        let session = result.unwrap().expect("refresh should succeed");
        assert_eq!(session.access_token(), "T2");
    }

    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.tokens.get().unwrap().access_token(), "T2");
}

#[tokio::test]
async fn refresh_without_cookie_expires_session_once() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(url, &dir);
    let mut events = ctx.coordinator.subscribe();

    let (a, b, c) = tokio::join!(
        ctx.coordinator.ensure_fresh_token(),
        ctx.coordinator.ensure_fresh_token(),
        ctx.coordinator.ensure_fresh_token()
    );

    assert!(a.is_none() && b.is_none() && c.is_none());
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(events.recv().await.unwrap(), AuthEvent::SessionExpired);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn embedded_unauthorized_on_login_is_an_error() {
    let (url, _backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(url, &dir);

    let err = ctx
        .auth_client
        .login("ana@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthClientError::Unauthorized(ref msg) if msg == "Bad credentials"));
    assert!(ctx.tokens.get().is_none());
}

#[tokio::test]
async fn sign_out_suppresses_refresh_on_next_start() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(url.clone(), &dir);

    signed_in(&ctx).await;
    ctx.sign_out().await;

    assert!(ctx.tokens.get().is_none());
    assert_eq!(backend.logout_calls.load(Ordering::SeqCst), 1);

    // A fresh process over the same storage
    let next = context(url, &dir);
    let hydration = next.hydrator().hydrate();
    assert!(hydration.identity.is_none());
    assert!(hydration.refresh.is_none());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hydration_restores_identity_then_refreshes() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(url.clone(), &dir);
    signed_in(&ctx).await;

    let hydration = ctx.hydrator().hydrate();
    assert_eq!(hydration.identity.unwrap().username, "ana@example.com");

    let session = hydration.refresh.unwrap().wait().await.unwrap();
    assert_eq!(session.access_token(), "T2");
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_cookie_survives_a_restart() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();

    let first = context(url.clone(), &dir);
    signed_in(&first).await;
    drop(first);

    // A fresh process over the same storage
    let next = context(url, &dir);
    let hydration = next.hydrator().hydrate();
    assert_eq!(hydration.identity.unwrap().username, "ana@example.com");

    let session = hydration
        .refresh
        .expect("record without logout flag should refresh")
        .wait()
        .await
        .expect("persisted cookie should refresh");
    assert_eq!(session.access_token(), "T2");
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(next.tokens.records().load_record().unwrap().is_some());
}

#[tokio::test]
async fn sign_out_forgets_refresh_cookie() {
    let (url, backend) = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(url.clone(), &dir);

    signed_in(&ctx).await;
    ctx.sign_out().await;
    assert!(!dir.path().join("cookies.json").exists());

    // Even a caller that ignores the logout flag has nothing to refresh with
    let next = context(url, &dir);
    assert!(next.coordinator.ensure_fresh_token().await.is_none());
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
}
