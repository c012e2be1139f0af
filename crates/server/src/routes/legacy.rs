use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use service::legacy::SubmitPaymentInput;

use crate::errors::JsonApiError;
use crate::routes::auth::{ServerState, SessionUser};

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventIdBody {
    #[serde(default)]
    pub event_id: String,
}

#[utoipa::path(post, path = "/api/events/select", tag = "legacy", request_body = EventIdBody, responses((status = 200, description = "Event added"), (status = 403, description = "Payment locked"), (status = 409, description = "Already selected")))]
pub async fn select_event(
    State(state): State<ServerState>,
    SessionUser(user): SessionUser,
    Json(body): Json<EventIdBody>,
) -> Result<Json<Value>, JsonApiError> {
    let events = state.services.legacy.select_event(user.id, &body.event_id).await?;
    Ok(Json(json!({ "message": "EVENT_SELECTED", "events": events })))
}

#[utoipa::path(post, path = "/api/events/cancel", tag = "legacy", request_body = EventIdBody, responses((status = 200, description = "Event removed"), (status = 403, description = "Payment locked")))]
pub async fn cancel_event(
    State(state): State<ServerState>,
    SessionUser(user): SessionUser,
    Json(body): Json<EventIdBody>,
) -> Result<Json<Value>, JsonApiError> {
    let events = state.services.legacy.cancel_event(user.id, &body.event_id).await?;
    Ok(Json(json!({ "message": "MISSION_ABORTED", "events": events })))
}

pub async fn submit_payment(
    State(state): State<ServerState>,
    SessionUser(user): SessionUser,
    Json(input): Json<SubmitPaymentInput>,
) -> Result<Json<Value>, JsonApiError> {
    state.services.legacy.submit_payment(user.id, input).await?;
    Ok(Json(json!({ "success": true, "message": "Payment submitted for verification" })))
}
