//! Event selection and manual payment flow for legacy password accounts.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::auth_user::{self, LegacyPaymentStatus};
use models::legacy_registration;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::repository::Repositories;

/// Amount as typed into the payment form: the client may send a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl DeclaredAmount {
    fn normalized(&self) -> Option<String> {
        match self {
            Self::Int(0) => None,
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) if *v == 0.0 => None,
            Self::Float(v) => Some(v.to_string()),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentInput {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub amount: Option<DeclaredAmount>,
    #[serde(default)]
    pub screenshot_url: String,
}

pub struct LegacyService {
    repos: Repositories,
}

impl LegacyService {
    pub fn new(repos: Repositories) -> Self { Self { repos } }

    async fn user(&self, user_id: Uuid) -> Result<auth_user::Model, ServiceError> {
        self.repos
            .auth_users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Add a live event to the account's selection. Returns the updated selection.
    #[instrument(skip(self))]
    pub async fn select_event(&self, user_id: Uuid, event_id: &str) -> Result<Vec<String>, ServiceError> {
        if event_id.trim().is_empty() {
            return Err(ServiceError::validation("EVENT_ID_MISSING", "eventId is required"));
        }
        let mut user = self.user(user_id).await?;
        if user.payment_status == LegacyPaymentStatus::Paid {
            return Err(ServiceError::forbidden("PAYMENT_LOCKED", "PAYMENT_LOCKED: CANNOT_MODIFY_PAID_EVENTS"));
        }
        let event = self.repos.events.find_by_event_id(event_id).await?;
        if !matches!(event, Some(ref e) if e.is_live) {
            return Err(ServiceError::validation("EVENT_NOT_AVAILABLE", "Event not found or not live"));
        }
        if !user.events.insert(event_id) {
            return Err(ServiceError::conflict("EVENT_ALREADY_SELECTED", "Event already selected"));
        }
        user.updated_at = Utc::now().into();
        let user = self.repos.auth_users.update(user).await?;
        info!(user_id = %user.id, event_id, "legacy_event_selected");
        Ok(user.events.0)
    }

    /// Drop an event from the selection unless the account has paid.
    #[instrument(skip(self))]
    pub async fn cancel_event(&self, user_id: Uuid, event_id: &str) -> Result<Vec<String>, ServiceError> {
        if event_id.trim().is_empty() {
            return Err(ServiceError::validation("EVENT_ID_MISSING", "eventId is required"));
        }
        let mut user = self.user(user_id).await?;
        if user.payment_status == LegacyPaymentStatus::Paid {
            return Err(ServiceError::forbidden("PAYMENT_LOCKED", "PAYMENT_LOCKED: CANNOT_CANCEL_PAID_EVENTS"));
        }
        if user.events.remove(event_id) {
            user.updated_at = Utc::now().into();
            user = self.repos.auth_users.update(user).await?;
            info!(user_id = %user.id, event_id, "legacy_event_cancelled");
        }
        Ok(user.events.0)
    }

    #[instrument(skip(self, input))]
    pub async fn submit_payment(&self, user_id: Uuid, input: SubmitPaymentInput) -> Result<(), ServiceError> {
        let amount = input.amount.as_ref().and_then(DeclaredAmount::normalized);
        let (Some(amount), false, false) = (amount, input.transaction_id.trim().is_empty(), input.screenshot_url.trim().is_empty()) else {
            return Err(ServiceError::validation("ALL_FIELDS_REQUIRED", "All fields are required"));
        };
        let mut user = self.user(user_id).await?;
        if user.payment_status == LegacyPaymentStatus::Paid {
            return Err(ServiceError::conflict("ALREADY_PAID", "Payment already confirmed"));
        }
        user.transaction_id = Some(input.transaction_id.trim().to_string());
        user.declared_amount = Some(amount);
        user.screenshot_url = Some(input.screenshot_url.trim().to_string());
        user.payment_status = LegacyPaymentStatus::VerificationPending;
        user.updated_at = Utc::now().into();
        let user = self.repos.auth_users.update(user).await?;
        info!(user_id = %user.id, "legacy_payment_submitted");
        Ok(())
    }

    /// Admin override of a legacy account's payment status.
    #[instrument(skip(self))]
    pub async fn set_payment_status(&self, admin_id: Uuid, user_id: Option<Uuid>, status: &str) -> Result<(), ServiceError> {
        let Some(user_id) = user_id.filter(|_| !status.trim().is_empty()) else {
            return Err(ServiceError::validation("MISSING_DATA", "userId and status are required"));
        };
        let status = LegacyPaymentStatus::parse(status.trim())
            .ok_or_else(|| ServiceError::validation("INVALID_STATUS", format!("unknown payment status: {status}")))?;
        let mut user = self.user(user_id).await?;
        user.payment_status = status;
        if status == LegacyPaymentStatus::Paid {
            user.paid_events = user.events.clone();
        }
        user.updated_at = Utc::now().into();
        let user = self.repos.auth_users.update(user).await?;
        info!(admin_id = %admin_id, user_id = %user.id, status = ?status, "legacy_payment_status_updated");
        Ok(())
    }

    pub async fn list_users(&self, page: Pagination) -> Result<Page<auth_user::Model>, ServiceError> {
        Ok(self.repos.auth_users.list(page).await?)
    }

    /// One-shot form submissions, newest first, with leader password hashes stripped.
    pub async fn list_legacy_registrations(&self) -> Result<Vec<legacy_registration::Model>, ServiceError> {
        let mut rows = self.repos.legacy_registrations.list().await?;
        for row in &mut rows {
            row.leader.password_hash.clear();
        }
        Ok(rows)
    }
}
