//! Service layer providing the competition's business rules on top of models.
//! - Separates business logic from data access (repository traits per aggregate).
//! - Reuses validation and entity definitions in `models` crate.
//! - Every failure carries a stable error code (`errors::ServiceError`).

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod repository;
pub mod identity;
pub mod legacy;
pub mod profiles;
pub mod events;
pub mod teams;
pub mod payments;
pub mod registrations;
pub mod announcements;
pub mod metrics;
#[cfg(test)]
pub mod test_support;

use std::sync::Arc;

use auth::repository::AuthRepository;
use repository::Repositories;

/// One instance of every service, sharing the same repositories.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<auth::AuthService<dyn AuthRepository>>,
    pub legacy: Arc<legacy::LegacyService>,
    pub profiles: Arc<profiles::ProfileService>,
    pub events: Arc<events::EventService>,
    pub teams: Arc<teams::TeamService>,
    pub payments: Arc<payments::PaymentService>,
    pub registrations: Arc<registrations::RegistrationService>,
    pub announcements: Arc<announcements::AnnouncementService>,
    pub repos: Repositories,
}

impl Services {
    pub fn new(
        repos: Repositories,
        auth_cfg: auth::AuthConfig,
        policy: teams::TeamPolicy,
        gateway: Arc<dyn payments::gateway::PaymentGateway>,
    ) -> Self {
        Self {
            auth: Arc::new(auth::AuthService::new(repos.auth_users.clone(), auth_cfg)),
            legacy: Arc::new(legacy::LegacyService::new(repos.clone())),
            profiles: Arc::new(profiles::ProfileService::new(repos.clone())),
            events: Arc::new(events::EventService::new(repos.clone())),
            teams: Arc::new(teams::TeamService::new(repos.clone(), policy)),
            payments: Arc::new(payments::PaymentService::new(repos.clone(), gateway)),
            registrations: Arc::new(registrations::RegistrationService::new(repos.clone())),
            announcements: Arc::new(announcements::AnnouncementService::new(repos.clone())),
            repos,
        }
    }
}
