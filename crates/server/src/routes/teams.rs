use axum::{extract::{Query, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use service::teams::{RespondInput, TeamOverview};

use crate::errors::JsonApiError;
use crate::metrics;
use crate::routes::auth::{CurrentIdentity, ServerState};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateTeamBody {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct InviteBody {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinBody {
    #[serde(default)]
    pub team_id: Option<Uuid>,
}

/// `?search=` switches from the caller's overview to a name search.
pub async fn overview_or_search(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Query(q): Query<SearchQuery>,
) -> Result<Response, JsonApiError> {
    if let Some(query) = q.search {
        let teams = state.services.teams.search(&identity, &query).await?;
        return Ok(Json(json!({ "teams": teams })).into_response());
    }
    let overview: TeamOverview = state.services.teams.overview(&identity).await?;
    Ok(Json(overview).into_response())
}

#[utoipa::path(post, path = "/api/teams", tag = "teams", request_body = CreateTeamBody, responses((status = 201, description = "Team created"), (status = 409, description = "Name taken or already in a team")))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(body): Json<CreateTeamBody>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let team = state.services.teams.create(&identity, &body.name).await?;
    metrics::TEAMS_CREATED_TOTAL.inc();
    Ok((StatusCode::CREATED, Json(json!({ "message": "Team created", "team": team }))))
}

pub async fn invite(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(body): Json<InviteBody>,
) -> Result<Json<Value>, JsonApiError> {
    state.services.teams.invite(&identity, &body.email).await?;
    Ok(Json(json!({ "message": "Invitation sent" })))
}

pub async fn request_join(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(body): Json<JoinBody>,
) -> Result<Json<Value>, JsonApiError> {
    state.services.teams.request_join(&identity, body.team_id).await?;
    Ok(Json(json!({ "message": "Join request sent" })))
}

pub async fn join_requests(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<Value>, JsonApiError> {
    let requests = state.services.teams.join_requests(&identity).await?;
    Ok(Json(json!({ "joinRequests": requests })))
}

pub async fn respond(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(input): Json<RespondInput>,
) -> Result<Json<Value>, JsonApiError> {
    let message = state.services.teams.respond(&identity, input).await?;
    Ok(Json(json!({ "message": message })))
}

pub async fn leave(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<Value>, JsonApiError> {
    let message = state.services.teams.leave(&identity).await?;
    Ok(Json(json!({ "message": message })))
}
