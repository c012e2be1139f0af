mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use helpers::{admin_token, app, request, send, session_cookie};

fn registration() -> serde_json::Value {
    json!({
        "name": "Tester",
        "teamName": "Sparks",
        "email": "Tester@Example.com",
        "password": "S3curePass!",
        "college": "CSJMU"
    })
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();

    let resp = app.router.clone().oneshot(request("POST", "/api/auth/register", None, Some(registration()))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let set_cookie = resp.headers().get("set-cookie").unwrap().to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=604800"));

    let (status, body) = send(&app, request("POST", "/api/auth/register", None, Some(registration()))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "USER_ALREADY_EXISTS");

    let creds = json!({"email": "tester@example.com", "password": "S3curePass!"});
    let resp = app.router.clone().oneshot(request("POST", "/api/auth/login", None, Some(creds))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = session_cookie(&resp).unwrap();

    let (status, body) = send(&app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "tester@example.com");
    assert!(body["user"].get("passwordHash").is_none());

    let bad = json!({"email": "tester@example.com", "password": "wrong-password"});
    let (status, body) = send(&app, request("POST", "/api/auth/login", None, Some(bad))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn register_validates_input() {
    let app = app();
    let (status, body) = send(&app, request("POST", "/api/auth/register", None, Some(json!({"email": "x@y.z"})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ALL_FIELDS_REQUIRED");
}

#[tokio::test]
async fn sessions_are_required() {
    let app = app();
    let (status, _) = send(&app, request("GET", "/api/auth/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, request("GET", "/api/auth/me", Some("garbage"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, request("GET", "/api/teams", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_need_admin_role() {
    let app = app();
    let resp = app.router.clone().oneshot(request("POST", "/api/auth/register", None, Some(registration()))).await.unwrap();
    let user_token = session_cookie(&resp).unwrap();
    let (status, body) = send(&app, request("GET", "/api/admin/users", Some(&user_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, body) = send(&app, request("GET", "/api/debug/admin", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "MISSING");

    let admin = admin_token(&app).await;
    let (status, body) = send(&app, request("GET", "/api/admin/users", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, body) = send(&app, request("POST", "/api/debug/admin", None, None)).await;
    assert_eq!(body["message"], "Admin role restored.");
}

#[tokio::test]
async fn legacy_event_selection_and_manual_payment() {
    let app = app();
    let admin = admin_token(&app).await;
    let event = json!({
        "eventId": "robo-wars", "title": "Robo Wars", "category": "combat",
        "description": "Fight", "teamSize": "2-4", "prize": "50000", "fees": 500
    });
    let (status, _) = send(&app, request("POST", "/api/admin/events", Some(&admin), Some(event))).await;
    assert_eq!(status, StatusCode::CREATED);

    let resp = app.router.clone().oneshot(request("POST", "/api/auth/register", None, Some(registration()))).await.unwrap();
    let token = session_cookie(&resp).unwrap();
    let user_id = {
        let (_, me) = send(&app, request("GET", "/api/auth/me", Some(&token), None)).await;
        me["user"]["id"].as_str().unwrap().to_string()
    };

    let (status, body) = send(&app, request("POST", "/api/events/select", Some(&token), Some(json!({"eventId": "robo-wars"})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"], json!(["robo-wars"]));

    let payment = json!({"transactionId": "UTR123", "amount": 500, "screenshotUrl": "https://img/1.png"});
    let (status, body) = send(&app, request("POST", "/api/payment/submit", Some(&token), Some(payment))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, request("POST", "/api/admin/payment", Some(&admin), Some(json!({"userId": user_id, "status": "bogus"})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_STATUS");
    let (status, body) = send(&app, request("POST", "/api/admin/payment", Some(&admin), Some(json!({"userId": user_id, "status": "paid"})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "STATUS_UPDATED");

    let (status, body) = send(&app, request("POST", "/api/events/cancel", Some(&token), Some(json!({"eventId": "robo-wars"})))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "PAYMENT_LOCKED");

    let (_, me) = send(&app, request("GET", "/api/auth/me", Some(&token), None)).await;
    assert_eq!(me["user"]["paidEvents"], json!(["robo-wars"]));
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = app();
    let resp = app.router.clone().oneshot(request("POST", "/api/auth/logout", None, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let set_cookie = resp.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("token="));
}
