use axum::{extract::State, Json};

use models::profile;
use service::profiles::{OnboardInput, ProfileStatus};

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentIdentity, ServerState};

pub async fn onboard(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(input): Json<OnboardInput>,
) -> Result<Json<profile::Model>, JsonApiError> {
    Ok(Json(state.services.profiles.onboard(&identity, input).await?))
}

pub async fn status(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<ProfileStatus>, JsonApiError> {
    Ok(Json(state.services.profiles.status(&identity).await?))
}
