use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use models::{auth_user, event, legacy_registration};
use service::events::{CreateEventInput, UpdateEventInput};
use service::pagination::{Page, Pagination};
use service::registrations::{RegistrationView, SetStatusInput};

use crate::errors::JsonApiError;
use crate::routes::auth::{AdminUser, ServerState};

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusBody {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub status: String,
}

#[utoipa::path(post, path = "/api/admin/payment", tag = "admin", request_body = PaymentStatusBody, responses((status = 200, description = "Status updated"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn set_payment_status(
    State(state): State<ServerState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<PaymentStatusBody>,
) -> Result<Json<Value>, JsonApiError> {
    state.services.legacy.set_payment_status(admin.id, body.user_id, &body.status).await?;
    Ok(Json(json!({ "message": "STATUS_UPDATED" })))
}

pub async fn list_users(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Page<auth_user::Model>>, JsonApiError> {
    Ok(Json(state.services.legacy.list_users(page).await?))
}

pub async fn list_legacy_registrations(
    State(state): State<ServerState>,
    _admin: AdminUser,
) -> Result<Json<Vec<legacy_registration::Model>>, JsonApiError> {
    Ok(Json(state.services.legacy.list_legacy_registrations().await?))
}

pub async fn list_events(State(state): State<ServerState>, _admin: AdminUser) -> Result<Json<Value>, JsonApiError> {
    let events = state.services.events.list_all().await?;
    Ok(Json(json!({ "events": events })))
}

#[utoipa::path(post, path = "/api/admin/events", tag = "admin", responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn create_event(
    State(state): State<ServerState>,
    AdminUser(admin): AdminUser,
    Json(input): Json<CreateEventInput>,
) -> Result<(axum::http::StatusCode, Json<event::Model>), JsonApiError> {
    let ev = state.services.events.create(Some(admin.id), input).await?;
    Ok((axum::http::StatusCode::CREATED, Json(ev)))
}

pub async fn update_event(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(event_id): Path<String>,
    Json(input): Json<UpdateEventInput>,
) -> Result<Json<event::Model>, JsonApiError> {
    Ok(Json(state.services.events.update(&event_id, input).await?))
}

pub async fn list_registrations(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Page<RegistrationView>>, JsonApiError> {
    Ok(Json(state.services.registrations.list(page).await?))
}

#[utoipa::path(patch, path = "/api/admin/registrations/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Registration id")), responses((status = 200, description = "Updated"), (status = 409, description = "Illegal transition")))]
pub async fn set_registration_status(
    State(state): State<ServerState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SetStatusInput>,
) -> Result<Json<RegistrationView>, JsonApiError> {
    let view = state.services.registrations.set_status(id, &input.status).await?;
    info!(admin_id = %admin.id, registration_id = %id, status = %input.status, "registration status overridden");
    Ok(Json(view))
}
