//! Gateway checkout: order creation, signature verification and the caller's
//! registration history.
pub mod gateway;

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::registration::{self, PaymentStatus};
use models::{event, profile, team};

use crate::errors::ServiceError;
use crate::identity::Identity;
use crate::registrations::{self as settle, RegistrationView};
use crate::repository::Repositories;
use gateway::PaymentGateway;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[serde(default)]
    pub event_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentInput {
    #[serde(default, alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(default, alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(default, alias = "razorpay_signature")]
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub is_free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    pub event_title: String,
}

impl OrderResponse {
    fn free(ev: &event::Model) -> Self {
        Self { is_free: true, order_id: None, amount: None, currency: None, key_id: None, event_title: ev.title.clone() }
    }
}

pub struct PaymentService {
    repos: Repositories,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(repos: Repositories, gateway: Arc<dyn PaymentGateway>) -> Self { Self { repos, gateway } }

    /// Team that pays for a team event: the caller must lead it and its size must fit the event.
    async fn paying_team(&self, me: &profile::Model, ev: &event::Model) -> Result<Option<team::Model>, ServiceError> {
        if !ev.is_team_event() {
            return Ok(None);
        }
        let team_id = me
            .team_id
            .ok_or_else(|| ServiceError::validation("TEAM_REQUIRED", "This is a team event. Create or join a team first."))?;
        let t = self.repos.teams.find_by_id(team_id).await?.ok_or_else(|| ServiceError::not_found("Team"))?;
        if !t.is_leader(me.id) {
            return Err(ServiceError::forbidden("NOT_TEAM_LEADER", "Only the team leader can pay for the team"));
        }
        let size = t.members.len() as i32;
        if size < ev.min_team_size || size > ev.max_team_size {
            return Err(ServiceError::validation(
                "TEAM_SIZE_OUT_OF_RANGE",
                format!(
                    "Team size must be between {} and {} for this event (currently {size})",
                    ev.min_team_size, ev.max_team_size
                ),
            ));
        }
        Ok(Some(t))
    }

    #[instrument(skip(self), fields(clerk_id = %identity.clerk_id))]
    pub async fn create_order(&self, identity: &Identity, event_id: &str) -> Result<OrderResponse, ServiceError> {
        if event_id.trim().is_empty() {
            return Err(ServiceError::validation("EVENT_ID_REQUIRED", "Event ID required"));
        }
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let ev = match self.repos.events.find_by_event_id(event_id).await? {
            Some(e) if e.is_live => e,
            _ => return Err(ServiceError::validation("EVENT_NOT_AVAILABLE", "Event not found or not available")),
        };
        if !me.registered_events.contains(&ev.event_id) {
            return Err(ServiceError::validation("NOT_REGISTERED", "Register for the event before paying"));
        }
        if ev.is_free() {
            return Ok(OrderResponse::free(&ev));
        }

        let team = self.paying_team(&me, &ev).await?;
        let team_id = team.as_ref().map(|t| t.id);
        let existing = self
            .repos
            .registrations
            .list_for_owner(team_id, me.id)
            .await?
            .into_iter()
            .find(|r| r.event_id == ev.id && r.payment_status != PaymentStatus::Refunded);
        if let Some(r) = &existing {
            if r.payment_status.is_settled() {
                return Err(ServiceError::conflict("ALREADY_PAID", "Payment already completed for this event"));
            }
            // pending registrations await manual review and keep their order
            if r.payment_status != PaymentStatus::Initiated && !r.payment_status.can_transition_to(PaymentStatus::Initiated) {
                return Err(ServiceError::conflict(
                    "INVALID_TRANSITION",
                    "Registration is awaiting review and cannot be re-ordered",
                ));
            }
        }
        if ev.is_full() {
            return Err(ServiceError::validation("EVENT_FULL", "Event is fully booked"));
        }

        let now = Utc::now().into();
        let reg = match existing {
            Some(r) => r,
            None => {
                let fresh = registration::Model {
                    id: Uuid::new_v4(),
                    event_id: ev.id,
                    team_id,
                    profile_id: me.id,
                    payment_status: PaymentStatus::Initiated,
                    amount_paid: None,
                    order_id: None,
                    payment_id: None,
                    created_at: now,
                    updated_at: now,
                };
                self.repos.registrations.insert(fresh).await?
            }
        };

        let amount = ev.fees * 100;
        let order = self.gateway.create_order(amount, &reg.id.to_string()).await?;

        let mut reg = reg;
        reg.order_id = Some(order.id.clone());
        reg.payment_status = PaymentStatus::Initiated;
        reg.updated_at = now;
        let reg = self.repos.registrations.update(reg).await?;
        if let Some(tid) = team_id {
            settle::set_team_lock(&self.repos, tid, true).await?;
        }
        info!(registration_id = %reg.id, order_id = %order.id, amount, "payment_order_created");

        Ok(OrderResponse {
            is_free: false,
            order_id: Some(order.id),
            amount: Some(order.amount),
            currency: Some(order.currency),
            key_id: Some(self.gateway.key_id().to_string()),
            event_title: ev.title,
        })
    }

    /// Check the checkout signature and settle the registration behind `order_id`.
    #[instrument(skip(self, input), fields(clerk_id = %identity.clerk_id, order_id = %input.order_id))]
    pub async fn verify(&self, identity: &Identity, input: VerifyPaymentInput) -> Result<registration::Model, ServiceError> {
        if input.order_id.trim().is_empty() || input.payment_id.trim().is_empty() || input.signature.trim().is_empty() {
            return Err(ServiceError::validation("MISSING_FIELDS", "orderId, paymentId and signature are required"));
        }
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let mut reg = self
            .repos
            .registrations
            .find_by_order_id(&input.order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Registration"))?;
        if !self.owns(&me, &reg).await? {
            return Err(ServiceError::forbidden("NOT_REGISTRATION_OWNER", "This order belongs to another team"));
        }
        if reg.payment_status.is_settled() {
            return Ok(reg);
        }

        let now = Utc::now().into();
        if !self.gateway.verify_signature(&input.order_id, &input.payment_id, &input.signature) {
            warn!(registration_id = %reg.id, "payment signature mismatch");
            if reg.payment_status.can_transition_to(PaymentStatus::Failed) {
                reg.payment_status = PaymentStatus::Failed;
                reg.updated_at = now;
                let reg = self.repos.registrations.update(reg).await?;
                settle::release_team_if_idle(&self.repos, &reg).await?;
            }
            return Err(ServiceError::validation("INVALID_SIGNATURE", "Payment verification failed"));
        }
        if !reg.payment_status.can_transition_to(PaymentStatus::Paid) {
            return Err(ServiceError::conflict(
                "INVALID_TRANSITION",
                "Registration is not awaiting payment; create a new order",
            ));
        }

        let ev = self.repos.events.find_by_id(reg.event_id).await?.ok_or_else(|| ServiceError::not_found("Event"))?;
        reg.payment_status = PaymentStatus::Paid;
        reg.payment_id = Some(input.payment_id);
        reg.amount_paid = Some(ev.fees * 100);
        reg.updated_at = now;
        let reg = self.repos.registrations.update(reg).await?;
        settle::apply_settlement(&self.repos, &reg).await?;
        info!(registration_id = %reg.id, event_id = %ev.event_id, "payment_verified");
        Ok(reg)
    }

    async fn owns(&self, me: &profile::Model, reg: &registration::Model) -> Result<bool, ServiceError> {
        if reg.profile_id == me.id {
            return Ok(true);
        }
        match reg.team_id {
            Some(tid) => Ok(self.repos.teams.find_by_id(tid).await?.is_some_and(|t| t.is_member(me.id))),
            None => Ok(false),
        }
    }

    /// Registrations of the caller's team plus the caller's solo ones.
    pub async fn my_registrations(&self, identity: &Identity) -> Result<Vec<RegistrationView>, ServiceError> {
        let me = self.repos.require_profile(&identity.clerk_id).await?;
        let mut regs = self.repos.registrations.list_for_owner(None, me.id).await?;
        if let Some(tid) = me.team_id {
            regs.extend(self.repos.registrations.list_for_owner(Some(tid), me.id).await?);
        }
        regs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut out = Vec::with_capacity(regs.len());
        for r in regs {
            out.push(settle::view(&self.repos, r).await?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_event, seed_profile, seed_team};
    use crate::registrations::RegistrationService;
    use gateway::{mock::MockGateway, sign};

    const SECRET: &str = "mock-secret";

    fn ident(id: &str) -> Identity {
        Identity { clerk_id: id.into(), email: None }
    }

    fn service(repos: &Repositories) -> PaymentService {
        PaymentService::new(repos.clone(), Arc::new(MockGateway::new(SECRET)))
    }

    async fn register(repos: &Repositories, clerk_id: &str, event_id: &str) {
        let mut p = repos.profiles.find_by_clerk_id(clerk_id).await.unwrap().unwrap();
        p.registered_events.insert(event_id);
        repos.profiles.update(p).await.unwrap();
    }

    async fn team_setup() -> (Repositories, team::Model) {
        let repos = Repositories::in_memory();
        seed_event(&repos, "robo-wars", 500, "2-4").await;
        let lead = seed_profile(&repos, "lead").await;
        let mate = seed_profile(&repos, "mate").await;
        let t = seed_team(&repos, "Sparks", &lead, &[&mate]).await;
        register(&repos, "lead", "robo-wars").await;
        (repos, t)
    }

    #[tokio::test]
    async fn order_then_verify_settles_team() {
        let (repos, t) = team_setup().await;
        let svc = service(&repos);
        let order = svc.create_order(&ident("lead"), "robo-wars").await.unwrap();
        assert!(!order.is_free);
        assert_eq!(order.amount, Some(50_000));
        assert_eq!(order.key_id.as_deref(), Some("rzp_test_mock"));
        assert!(repos.teams.find_by_id(t.id).await.unwrap().unwrap().is_locked);

        let order_id = order.order_id.unwrap();
        let sig = sign(SECRET, &order_id, "pay_1").unwrap();
        let input = VerifyPaymentInput { order_id: order_id.clone(), payment_id: "pay_1".into(), signature: sig.clone() };
        let reg = svc.verify(&ident("mate"), input).await.unwrap();
        assert_eq!(reg.payment_status, PaymentStatus::Paid);
        assert_eq!(reg.amount_paid, Some(50_000));

        let mate = repos.profiles.find_by_clerk_id("mate").await.unwrap().unwrap();
        assert!(mate.paid_events.contains("robo-wars"));
        assert!(mate.registered_events.contains("robo-wars"));
        let ev = repos.events.find_by_event_id("robo-wars").await.unwrap().unwrap();
        assert_eq!(ev.current_registrations, 1);

        // replay is a no-op
        let again = VerifyPaymentInput { order_id, payment_id: "pay_1".into(), signature: sig };
        svc.verify(&ident("lead"), again).await.unwrap();
        let ev = repos.events.find_by_event_id("robo-wars").await.unwrap().unwrap();
        assert_eq!(ev.current_registrations, 1);

        let err = svc.create_order(&ident("lead"), "robo-wars").await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_PAID");

        let mine = svc.my_registrations(&ident("mate")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].team.as_ref().unwrap().name, "Sparks");
    }

    #[tokio::test]
    async fn bad_signature_fails_and_unlocks() {
        let (repos, t) = team_setup().await;
        let svc = service(&repos);
        let order = svc.create_order(&ident("lead"), "robo-wars").await.unwrap();
        let input = VerifyPaymentInput {
            order_id: order.order_id.unwrap(),
            payment_id: "pay_1".into(),
            signature: "00".repeat(32),
        };
        let err = svc.verify(&ident("lead"), input).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_SIGNATURE");
        assert!(!repos.teams.find_by_id(t.id).await.unwrap().unwrap().is_locked);

        // retry reuses the failed registration
        let retry = svc.create_order(&ident("lead"), "robo-wars").await.unwrap();
        let mine = svc.my_registrations(&ident("lead")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].registration.payment_status, PaymentStatus::Initiated);
        assert_eq!(mine[0].registration.order_id, retry.order_id);
    }

    #[tokio::test]
    async fn team_rules_apply() {
        let repos = Repositories::in_memory();
        seed_event(&repos, "robo-wars", 500, "3-4").await;
        let lead = seed_profile(&repos, "lead").await;
        let mate = seed_profile(&repos, "mate").await;
        seed_profile(&repos, "solo").await;
        seed_team(&repos, "Sparks", &lead, &[&mate]).await;
        for who in ["lead", "mate", "solo"] {
            register(&repos, who, "robo-wars").await;
        }
        let svc = service(&repos);

        assert_eq!(svc.create_order(&ident("solo"), "robo-wars").await.unwrap_err().code(), "TEAM_REQUIRED");
        assert_eq!(svc.create_order(&ident("mate"), "robo-wars").await.unwrap_err().code(), "NOT_TEAM_LEADER");
        assert_eq!(svc.create_order(&ident("lead"), "robo-wars").await.unwrap_err().code(), "TEAM_SIZE_OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn free_and_unregistered_events() {
        let repos = Repositories::in_memory();
        seed_event(&repos, "quiz", 0, "Individual").await;
        seed_event(&repos, "line-follower", 200, "Individual").await;
        seed_profile(&repos, "solo").await;
        register(&repos, "solo", "quiz").await;
        let svc = service(&repos);

        let free = svc.create_order(&ident("solo"), "quiz").await.unwrap();
        assert!(free.is_free);
        assert!(free.order_id.is_none());
        assert_eq!(svc.create_order(&ident("solo"), "line-follower").await.unwrap_err().code(), "NOT_REGISTERED");
        assert_eq!(svc.create_order(&ident("solo"), "nope").await.unwrap_err().code(), "EVENT_NOT_AVAILABLE");

        register(&repos, "solo", "line-follower").await;
        let order = svc.create_order(&ident("solo"), "line-follower").await.unwrap();
        assert_eq!(order.amount, Some(20_000));
        let mine = svc.my_registrations(&ident("solo")).await.unwrap();
        assert!(mine[0].registration.team_id.is_none());
    }

    #[tokio::test]
    async fn pending_registration_is_not_reordered() {
        let (repos, _) = team_setup().await;
        let svc = service(&repos);
        let order = svc.create_order(&ident("lead"), "robo-wars").await.unwrap();
        let reg = repos.registrations.find_by_order_id(order.order_id.as_deref().unwrap()).await.unwrap().unwrap();
        RegistrationService::new(repos.clone()).set_status(reg.id, "pending").await.unwrap();

        let err = svc.create_order(&ident("lead"), "robo-wars").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
        let kept = repos.registrations.find_by_id(reg.id).await.unwrap().unwrap();
        assert_eq!(kept.payment_status, PaymentStatus::Pending);
        assert_eq!(kept.order_id, order.order_id);
    }

    #[tokio::test]
    async fn initiated_registration_is_reused_with_a_new_order() {
        let (repos, _) = team_setup().await;
        let svc = service(&repos);
        let first = svc.create_order(&ident("lead"), "robo-wars").await.unwrap();
        let second = svc.create_order(&ident("lead"), "robo-wars").await.unwrap();
        assert_ne!(first.order_id, second.order_id);

        let mine = svc.my_registrations(&ident("lead")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].registration.payment_status, PaymentStatus::Initiated);
        assert_eq!(mine[0].registration.order_id, second.order_id);
    }

    #[tokio::test]
    async fn full_event_rejects_new_orders() {
        let (repos, _) = team_setup().await;
        let mut ev = repos.events.find_by_event_id("robo-wars").await.unwrap().unwrap();
        ev.max_registrations = Some(1);
        ev.current_registrations = 1;
        repos.events.update(ev).await.unwrap();

        let err = service(&repos).create_order(&ident("lead"), "robo-wars").await.unwrap_err();
        assert_eq!(err.code(), "EVENT_FULL");
        assert!(service(&repos).my_registrations(&ident("lead")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn outsider_cannot_verify_someone_elses_order() {
        let (repos, _) = team_setup().await;
        seed_profile(&repos, "outsider").await;
        let svc = service(&repos);
        let order_id = svc.create_order(&ident("lead"), "robo-wars").await.unwrap().order_id.unwrap();
        let sig = sign(SECRET, &order_id, "pay_9").unwrap();
        let input = VerifyPaymentInput { order_id: order_id.clone(), payment_id: "pay_9".into(), signature: sig };

        let err = svc.verify(&ident("outsider"), input).await.unwrap_err();
        assert_eq!(err.code(), "NOT_REGISTRATION_OWNER");
        let reg = repos.registrations.find_by_order_id(&order_id).await.unwrap().unwrap();
        assert_eq!(reg.payment_status, PaymentStatus::Initiated);
    }

    #[tokio::test]
    async fn settlement_bumps_counter_and_replay_does_not_recount() {
        let (repos, _) = team_setup().await;
        let svc = service(&repos);
        let order_id = svc.create_order(&ident("lead"), "robo-wars").await.unwrap().order_id.unwrap();
        let sig = sign(SECRET, &order_id, "pay_2").unwrap();
        let input = VerifyPaymentInput { order_id, payment_id: "pay_2".into(), signature: sig };

        let before = crate::metrics::PAYMENTS_SETTLED_TOTAL.get();
        svc.verify(&ident("lead"), input.clone()).await.unwrap();
        assert!(crate::metrics::PAYMENTS_SETTLED_TOTAL.get() > before);
        svc.verify(&ident("lead"), input).await.unwrap();
        let ev = repos.events.find_by_event_id("robo-wars").await.unwrap().unwrap();
        assert_eq!(ev.current_registrations, 1);
    }

    #[tokio::test]
    async fn verify_requires_fields_and_known_order() {
        let (repos, _) = team_setup().await;
        let svc = service(&repos);
        let err = svc.verify(&ident("lead"), VerifyPaymentInput::default()).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_FIELDS");
        let input = VerifyPaymentInput { order_id: "order_x".into(), payment_id: "p".into(), signature: "s".into() };
        assert_eq!(svc.verify(&ident("lead"), input).await.unwrap_err().code(), "REGISTRATION_NOT_FOUND");
    }
}
