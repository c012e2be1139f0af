use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::announcement;
use service::announcements::CreateAnnouncementInput;

use crate::errors::JsonApiError;
use crate::routes::auth::{AdminUser, ServerState};

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<Uuid>,
}

#[utoipa::path(get, path = "/api/announcements", tag = "announcements", responses((status = 200, description = "Newest first")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<announcement::Model>>, JsonApiError> {
    Ok(Json(state.services.announcements.list().await?))
}

pub async fn create(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Json(input): Json<CreateAnnouncementInput>,
) -> Result<Json<Value>, JsonApiError> {
    let row = state.services.announcements.create(input).await?;
    Ok(Json(json!({ "success": true, "data": row })))
}

pub async fn delete(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<Value>, JsonApiError> {
    state.services.announcements.delete(q.id).await?;
    Ok(Json(json!({ "success": true, "message": "Deleted successfully" })))
}
