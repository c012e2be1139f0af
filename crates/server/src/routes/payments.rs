use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use service::payments::{CreateOrderInput, OrderResponse, VerifyPaymentInput};
use service::registrations::RegistrationView;

use crate::errors::JsonApiError;
use crate::metrics;
use crate::routes::auth::{CurrentIdentity, ServerState};

#[utoipa::path(post, path = "/api/payments/create-order", tag = "payments", responses((status = 200, description = "Order created or free event"), (status = 409, description = "Already paid"), (status = 502, description = "Gateway error")))]
pub async fn create_order(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(input): Json<CreateOrderInput>,
) -> Result<Json<OrderResponse>, JsonApiError> {
    let order = state.services.payments.create_order(&identity, &input.event_id).await.map_err(|e| {
        if matches!(e, service::errors::ServiceError::Gateway(_)) {
            metrics::PAYMENT_FAILURES_TOTAL.inc();
        }
        e
    })?;
    Ok(Json(order))
}

#[utoipa::path(post, path = "/api/payments/verify", tag = "payments", responses((status = 200, description = "Payment verified"), (status = 400, description = "Invalid signature"), (status = 404, description = "Unknown order")))]
pub async fn verify(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(input): Json<VerifyPaymentInput>,
) -> Result<Json<Value>, JsonApiError> {
    match state.services.payments.verify(&identity, input).await {
        Ok(reg) => Ok(Json(json!({ "success": true, "message": "Payment verified", "registration": reg }))),
        Err(e) => {
            if e.code() == "INVALID_SIGNATURE" {
                metrics::PAYMENT_FAILURES_TOTAL.inc();
            }
            Err(e.into())
        }
    }
}

pub async fn my_registrations(
    State(state): State<ServerState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<Vec<RegistrationView>>, JsonApiError> {
    Ok(Json(state.services.payments.my_registrations(&identity).await?))
}

/// The old direct registration form no longer creates records.
pub async fn create_registration_deprecated() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "success": false, "message": "Endpoint deprecated or needs update" })),
    )
}
