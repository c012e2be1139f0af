pub mod admin;
pub mod announcements;
pub mod auth;
pub mod events;
pub mod legacy;
pub mod payments;
pub mod profiles;
pub mod teams;

use axum::{
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::metrics;
use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics_handler() -> impl IntoResponse {
    metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public, legacy-session, identity-session and admin routes.
/// Access control is enforced per handler by the session extractors in [`auth`].
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let static_dir = ServeDir::new("frontend").fallback(ServeFile::new("frontend/index.html"));

    // Probes and docs
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_json));

    // Legacy password accounts
    let legacy = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/events/select", post(legacy::select_event))
        .route("/api/events/cancel", post(legacy::cancel_event))
        .route("/api/payment/submit", post(legacy::submit_payment));

    // Identity-provider sessions
    let identity = Router::new()
        .route("/api/profile", post(profiles::onboard))
        .route("/api/profile/status", get(profiles::status))
        .route("/api/events", get(events::list))
        .route("/api/events/register", post(events::register))
        .route("/api/events/:event_id", get(events::get))
        .route("/api/teams", get(teams::overview_or_search).post(teams::create))
        .route("/api/teams/invite", post(teams::invite))
        .route("/api/teams/join", get(teams::join_requests).post(teams::request_join))
        .route("/api/teams/respond", post(teams::respond))
        .route("/api/teams/leave", post(teams::leave))
        .route("/api/payments/create-order", post(payments::create_order))
        .route("/api/payments/verify", post(payments::verify))
        .route("/api/registrations/mine", get(payments::my_registrations));

    // Admin routes
    let admin_routes = Router::new()
        .route("/api/admin/payment", post(admin::set_payment_status))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/legacy-registrations", get(admin::list_legacy_registrations))
        .route("/api/admin/events", get(admin::list_events).post(admin::create_event))
        .route("/api/admin/events/:event_id", put(admin::update_event))
        .route("/api/admin/registrations/:id", patch(admin::set_registration_status))
        .route(
            "/api/registrations",
            get(admin::list_registrations).post(payments::create_registration_deprecated),
        )
        .route(
            "/api/announcements",
            get(announcements::list).post(announcements::create).delete(announcements::delete),
        );

    let mut app = public.merge(legacy).merge(identity).merge(admin_routes);
    if state.debug_routes {
        app = app.route("/api/debug/admin", get(auth::debug_admin_status).post(auth::debug_admin_bootstrap));
    }

    // Compose
    app.fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
