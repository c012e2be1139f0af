//! Registration records: admin listing, status overrides and the side effects
//! of settling or reversing a payment.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::registration::{self, PaymentStatus};
use models::{event, team};

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::repository::Repositories;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: Uuid,
    pub event_id: String,
    pub title: String,
    pub fees: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    #[serde(flatten)]
    pub registration: registration::Model,
    pub event: Option<EventSummary>,
    pub team: Option<TeamSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusInput {
    #[serde(default)]
    pub status: String,
}

/// Profiles whose event lists follow a registration: the team's members, or the payer alone.
async fn beneficiaries(repos: &Repositories, reg: &registration::Model) -> Result<Vec<Uuid>, ServiceError> {
    if let Some(team_id) = reg.team_id {
        if let Some(t) = repos.teams.find_by_id(team_id).await? {
            return Ok(t.members.0);
        }
    }
    Ok(vec![reg.profile_id])
}

/// Count the registration against the event and mark the event paid for every beneficiary.
pub(crate) async fn apply_settlement(repos: &Repositories, reg: &registration::Model) -> Result<event::Model, ServiceError> {
    let mut ev = repos.events.find_by_id(reg.event_id).await?.ok_or_else(|| ServiceError::not_found("Event"))?;
    let now = Utc::now().into();
    ev.current_registrations += 1;
    ev.updated_at = now;
    let ev = repos.events.update(ev).await?;
    crate::metrics::PAYMENTS_SETTLED_TOTAL.inc();

    for pid in beneficiaries(repos, reg).await? {
        if let Some(mut p) = repos.profiles.find_by_id(pid).await? {
            p.registered_events.insert(&ev.event_id);
            p.paid_events.insert(&ev.event_id);
            p.updated_at = now;
            repos.profiles.update(p).await?;
        }
    }
    Ok(ev)
}

/// Undo `apply_settlement`.
pub(crate) async fn reverse_settlement(repos: &Repositories, reg: &registration::Model) -> Result<(), ServiceError> {
    let Some(mut ev) = repos.events.find_by_id(reg.event_id).await? else {
        return Ok(());
    };
    let now = Utc::now().into();
    ev.current_registrations = (ev.current_registrations - 1).max(0);
    ev.updated_at = now;
    let ev = repos.events.update(ev).await?;

    for pid in beneficiaries(repos, reg).await? {
        if let Some(mut p) = repos.profiles.find_by_id(pid).await? {
            if p.paid_events.remove(&ev.event_id) {
                p.updated_at = now;
                repos.profiles.update(p).await?;
            }
        }
    }
    Ok(())
}

pub(crate) async fn set_team_lock(repos: &Repositories, team_id: Uuid, locked: bool) -> Result<Option<team::Model>, ServiceError> {
    let Some(mut t) = repos.teams.find_by_id(team_id).await? else {
        return Ok(None);
    };
    if t.is_locked == locked {
        return Ok(Some(t));
    }
    t.is_locked = locked;
    t.updated_at = Utc::now().into();
    let t = repos.teams.update(t).await?;
    info!(team_id = %t.id, locked, "team_lock_changed");
    Ok(Some(t))
}

/// Unlock the registration's team unless another of its registrations is still active.
pub(crate) async fn release_team_if_idle(repos: &Repositories, reg: &registration::Model) -> Result<(), ServiceError> {
    let Some(team_id) = reg.team_id else {
        return Ok(());
    };
    let others_active = repos
        .registrations
        .list_for_owner(Some(team_id), reg.profile_id)
        .await?
        .iter()
        .any(|r| r.id != reg.id && r.payment_status.is_active());
    if !others_active {
        set_team_lock(repos, team_id, false).await?;
    }
    Ok(())
}

pub(crate) async fn view(repos: &Repositories, reg: registration::Model) -> Result<RegistrationView, ServiceError> {
    let event = repos.events.find_by_id(reg.event_id).await?.map(|e| EventSummary {
        id: e.id,
        event_id: e.event_id,
        title: e.title,
        fees: e.fees,
    });
    let team = match reg.team_id {
        Some(tid) => repos.teams.find_by_id(tid).await?.map(|t| TeamSummary { id: t.id, name: t.name }),
        None => None,
    };
    Ok(RegistrationView { registration: reg, event, team })
}

pub struct RegistrationService {
    repos: Repositories,
}

impl RegistrationService {
    pub fn new(repos: Repositories) -> Self { Self { repos } }

    pub async fn list(&self, page: Pagination) -> Result<Page<RegistrationView>, ServiceError> {
        let page = self.repos.registrations.list(page).await?;
        let mut items = Vec::with_capacity(page.items.len());
        for reg in page.items {
            items.push(view(&self.repos, reg).await?);
        }
        Ok(Page { items, total: page.total, page: page.page, per_page: page.per_page })
    }

    /// Admin override along the allowed transitions, with the matching side effects.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: Uuid, status: &str) -> Result<RegistrationView, ServiceError> {
        let next = PaymentStatus::parse(status.trim())
            .ok_or_else(|| ServiceError::validation("INVALID_STATUS", format!("unknown payment status: {status}")))?;
        let mut reg = self
            .repos
            .registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Registration"))?;
        let prev = reg.payment_status;
        if !prev.can_transition_to(next) {
            return Err(ServiceError::conflict(
                "INVALID_TRANSITION",
                format!("cannot move registration from {prev:?} to {next:?}"),
            ));
        }

        reg.payment_status = next;
        reg.updated_at = Utc::now().into();
        if next.is_settled() && reg.amount_paid.is_none() {
            if let Some(ev) = self.repos.events.find_by_id(reg.event_id).await? {
                reg.amount_paid = Some(ev.fees * 100);
            }
        }
        let reg = self.repos.registrations.update(reg).await?;

        match next {
            s if s.is_settled() && !prev.is_settled() => {
                apply_settlement(&self.repos, &reg).await?;
            }
            PaymentStatus::Refunded => {
                reverse_settlement(&self.repos, &reg).await?;
                release_team_if_idle(&self.repos, &reg).await?;
            }
            PaymentStatus::Failed => {
                release_team_if_idle(&self.repos, &reg).await?;
            }
            PaymentStatus::Initiated | PaymentStatus::Pending => {
                if let Some(team_id) = reg.team_id {
                    set_team_lock(&self.repos, team_id, true).await?;
                }
            }
            _ => {}
        }
        info!(registration_id = %reg.id, from = ?prev, to = ?next, "registration_status_changed");
        view(&self.repos, reg).await
    }
}
