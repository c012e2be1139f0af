use axum::{extract::{Path, State}, Json};
use serde_json::{json, Value};

use models::event;
use service::events::EventRegistration;

use crate::errors::JsonApiError;
use crate::metrics;
use crate::routes::auth::{CurrentIdentity, ServerState};
use crate::routes::legacy::EventIdBody;

#[utoipa::path(get, path = "/api/events", tag = "events", responses((status = 200, description = "Live events")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Value>, JsonApiError> {
    let events = state.services.events.list_live().await?;
    Ok(Json(json!({ "events": events })))
}

pub async fn get(State(state): State<ServerState>, Path(event_id): Path<String>) -> Result<Json<event::Model>, JsonApiError> {
    Ok(Json(state.services.events.get(&event_id).await?))
}

#[utoipa::path(post, path = "/api/events/register", tag = "events", request_body = EventIdBody, responses((status = 200, description = "Registered"), (status = 400, description = "Closed or full"), (status = 404, description = "No profile")))]
pub async fn register(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(body): Json<EventIdBody>,
) -> Result<Json<EventRegistration>, JsonApiError> {
    let out = state.services.events.register(&identity, &body.event_id).await?;
    if !out.already_registered {
        metrics::EVENT_REGISTRATIONS_TOTAL.inc();
    }
    Ok(Json(out))
}
