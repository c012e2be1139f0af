#![allow(dead_code)]
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use service::identity::Hs256IdentityVerifier;
use service::payments::gateway::mock::MockGateway;
use service::repository::Repositories;

pub const GATEWAY_SECRET: &str = "gateway-test-secret";
pub const IDENTITY_SECRET: &str = "identity-test-secret";
pub const ADMIN_PASSWORD: &str = "Adm1nPassw0rd";

pub struct TestApp {
    pub router: Router,
    pub repos: Repositories,
}

pub fn config() -> configs::AppConfig {
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = "legacy-test-secret".into();
    cfg.auth.identity_secret = IDENTITY_SECRET.into();
    cfg.admin.debug_routes = true;
    cfg.admin.bootstrap_password = Some(ADMIN_PASSWORD.into());
    cfg
}

pub fn app() -> TestApp {
    let repos = Repositories::in_memory();
    let router = server::startup::build_app(&config(), repos.clone(), Arc::new(MockGateway::new(GATEWAY_SECRET)));
    TestApp { router, repos }
}

/// Identity-provider session token for `clerk_id`.
pub fn identity_token(clerk_id: &str) -> String {
    Hs256IdentityVerifier::new(IDENTITY_SECRET, None)
        .issue(clerk_id, Some(&format!("{clerk_id}@example.com")), 30)
        .unwrap()
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, json)
}

/// `token` value from a Set-Cookie header.
pub fn session_cookie(resp: &axum::response::Response) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.split(';').next()?.trim().strip_prefix("token=").map(str::to_string))
}

/// Bootstrap the administrator through the debug route and log in as them.
pub async fn admin_token(app: &TestApp) -> String {
    let (status, _) = send(app, request("POST", "/api/debug/admin", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let body = serde_json::json!({"email": "admin@roborumble.com", "password": ADMIN_PASSWORD});
    let resp = app.router.clone().oneshot(request("POST", "/api/auth/login", None, Some(body))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    session_cookie(&resp).expect("session cookie")
}

/// Onboard a profile for `clerk_id` and return its identity token.
pub async fn onboard(app: &TestApp, clerk_id: &str) -> String {
    let token = identity_token(clerk_id);
    let body = serde_json::json!({"username": clerk_id, "email": format!("{clerk_id}@example.com"), "college": "CSJMU"});
    let (status, _) = send(app, request("POST", "/api/profile", Some(&token), Some(body))).await;
    assert_eq!(status, StatusCode::OK);
    token
}
