mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{admin_token, app, onboard, request, send, TestApp, GATEWAY_SECRET};
use service::payments::gateway::sign;

async fn create_event(app: &TestApp, admin: &str, event_id: &str, fees: i64, team_size: &str) {
    let body = json!({
        "eventId": event_id, "title": format!("Event {event_id}"), "category": "robotics",
        "description": "desc", "teamSize": team_size, "prize": "10000", "fees": fees
    });
    let (status, _) = send(app, request("POST", "/api/admin/events", Some(admin), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn profile_status_before_and_after_onboarding() {
    let app = app();
    let token = helpers::identity_token("ghost");
    let (status, body) = send(&app, request("GET", "/api/profile/status", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["onboardingCompleted"], false);
    assert_eq!(body["registeredEvents"], json!([]));

    let token = onboard(&app, "pilot").await;
    let (_, body) = send(&app, request("GET", "/api/profile/status", Some(&token), None)).await;
    assert_eq!(body["onboardingCompleted"], true);
    assert_eq!(body["username"], "pilot");
}

#[tokio::test]
async fn team_formation_and_gateway_payment() {
    let app = app();
    let admin = admin_token(&app).await;
    create_event(&app, &admin, "robo-wars", 500, "2-4").await;

    let lead = onboard(&app, "lead").await;
    let mate = onboard(&app, "mate").await;

    let (status, body) = send(&app, request("POST", "/api/teams", Some(&lead), Some(json!({"name": "Sparks"})))).await;
    assert_eq!(status, StatusCode::CREATED);
    let team_id = body["team"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, request("POST", "/api/teams", Some(&mate), Some(json!({"name": "sparks"})))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "TEAM_NAME_TAKEN");

    let (status, _) = send(&app, request("POST", "/api/teams/invite", Some(&lead), Some(json!({"email": "mate@example.com"})))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, request("GET", "/api/teams", Some(&mate), None)).await;
    assert_eq!(body["invitations"][0]["name"], "Sparks");

    let respond = json!({"action": "accept_invitation", "teamId": team_id});
    let (status, body) = send(&app, request("POST", "/api/teams/respond", Some(&mate), Some(respond))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Joined team");

    let (_, body) = send(&app, request("GET", "/api/teams?search=spa", Some(&mate), None)).await;
    assert_eq!(body["teams"][0]["members"].as_array().unwrap().len(), 2);

    // pay before registering
    let (status, body) = send(&app, request("POST", "/api/payments/create-order", Some(&lead), Some(json!({"eventId": "robo-wars"})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NOT_REGISTERED");

    let (status, body) = send(&app, request("POST", "/api/events/register", Some(&lead), Some(json!({"eventId": "robo-wars"})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully registered!");

    let (status, order) = send(&app, request("POST", "/api/payments/create-order", Some(&lead), Some(json!({"eventId": "robo-wars"})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["amount"], 50_000);
    assert_eq!(order["isFree"], false);
    let order_id = order["orderId"].as_str().unwrap().to_string();

    // locked team
    let (status, body) = send(&app, request("POST", "/api/teams/leave", Some(&mate), None)).await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["error"], "TEAM_LOCKED");

    let sig = sign(GATEWAY_SECRET, &order_id, "pay_42").unwrap();
    let verify = json!({"orderId": order_id, "paymentId": "pay_42", "signature": sig});
    let (status, body) = send(&app, request("POST", "/api/payments/verify", Some(&lead), Some(verify))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registration"]["paymentStatus"], "paid");

    let (_, body) = send(&app, request("GET", "/api/profile/status", Some(&mate), None)).await;
    assert_eq!(body["paidEvents"], json!(["robo-wars"]));

    let (_, body) = send(&app, request("GET", "/api/registrations/mine", Some(&mate), None)).await;
    assert_eq!(body[0]["team"]["name"], "Sparks");
    assert_eq!(body[0]["event"]["title"], "Event robo-wars");

    let (status, body) = send(&app, request("GET", "/api/registrations", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let reg_id = body["items"][0]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin/registrations/{reg_id}");
    let (status, body) = send(&app, request("PATCH", &uri, Some(&admin), Some(json!({"status": "pending"})))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_TRANSITION");
    let (status, _) = send(&app, request("PATCH", &uri, Some(&admin), Some(json!({"status": "refunded"})))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, request("GET", "/api/events/robo-wars", None, None)).await;
    assert_eq!(body["currentRegistrations"], 0);
    let (status, _) = send(&app, request("POST", "/api/teams/leave", Some(&mate), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn tampered_signature_is_rejected() {
    let app = app();
    let admin = admin_token(&app).await;
    create_event(&app, &admin, "line-follower", 200, "Individual").await;
    let solo = onboard(&app, "solo").await;
    send(&app, request("POST", "/api/events/register", Some(&solo), Some(json!({"eventId": "line-follower"})))).await;

    let (_, order) = send(&app, request("POST", "/api/payments/create-order", Some(&solo), Some(json!({"eventId": "line-follower"})))).await;
    let verify = json!({"orderId": order["orderId"], "paymentId": "pay_1", "signature": "deadbeef"});
    let (status, body) = send(&app, request("POST", "/api/payments/verify", Some(&solo), Some(verify))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_SIGNATURE");

    let (_, body) = send(&app, request("GET", "/api/registrations/mine", Some(&solo), None)).await;
    assert_eq!(body[0]["paymentStatus"], "failed");
}

#[tokio::test]
async fn free_event_needs_no_order() {
    let app = app();
    let admin = admin_token(&app).await;
    create_event(&app, &admin, "quiz", 0, "Individual").await;
    let solo = onboard(&app, "solo").await;

    let (_, body) = send(&app, request("POST", "/api/events/register", Some(&solo), Some(json!({"eventId": "quiz"})))).await;
    assert_eq!(body["fees"], 0);
    let (status, body) = send(&app, request("POST", "/api/payments/create-order", Some(&solo), Some(json!({"eventId": "quiz"})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFree"], true);

    let (_, body) = send(&app, request("GET", "/api/events", None, None)).await;
    assert_eq!(body["events"][0]["currentRegistrations"], 1);
}

#[tokio::test]
async fn announcements_lifecycle() {
    let app = app();
    let admin = admin_token(&app).await;
    let user = onboard(&app, "viewer").await;

    let (status, _) = send(&app, request("POST", "/api/announcements", Some(&user), Some(json!({"title": "t", "message": "m"})))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, request("POST", "/api/announcements", Some(&admin), Some(json!({"title": "Gates", "message": "Open at 9", "type": "alert"})))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "alert");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, list) = send(&app, request("GET", "/api/announcements", None, None)).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, request("DELETE", "/api/announcements", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ID_REQUIRED");
    let (status, body) = send(&app, request("DELETE", &format!("/api/announcements?id={id}"), Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted successfully");
}

#[tokio::test]
async fn deprecated_registration_post_and_probes() {
    let app = app();
    let (status, body) = send(&app, request("POST", "/api/registrations", None, None)).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, request("GET", "/api-docs/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/payments/verify"].is_object());
}
