//! Persistence seams for every aggregate besides legacy accounts.
//!
//! Each trait has a SeaORM implementation (`seaorm`) and an in-memory one
//! (`memory`). Unique keys (profile email and clerk id, event id and slug,
//! team name, order id) are enforced by both and surface as `Conflict`.

pub mod memory;
pub mod seaorm;

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::{announcement, event, legacy_registration, profile, registration, team};

use crate::auth::repository::{memory::InMemoryAuthRepository, AuthRepository};
use crate::auth::repo::seaorm::SeaOrmAuthRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<profile::Model>, ServiceError>;
    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<profile::Model>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<profile::Model>, ServiceError>;
    /// Missing ids are skipped; order follows `ids`.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<profile::Model>, ServiceError>;
    async fn insert(&self, p: profile::Model) -> Result<profile::Model, ServiceError>;
    async fn update(&self, p: profile::Model) -> Result<profile::Model, ServiceError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<event::Model>, ServiceError>;
    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<event::Model>, ServiceError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<event::Model>, ServiceError>;
    /// Live events ordered by title.
    async fn list_live(&self) -> Result<Vec<event::Model>, ServiceError>;
    /// All events ordered by title.
    async fn list_all(&self) -> Result<Vec<event::Model>, ServiceError>;
    async fn insert(&self, e: event::Model) -> Result<event::Model, ServiceError>;
    async fn update(&self, e: event::Model) -> Result<event::Model, ServiceError>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<team::Model>, ServiceError>;
    /// Case-insensitive exact name match.
    async fn find_by_name(&self, name: &str) -> Result<Option<team::Model>, ServiceError>;
    /// Teams whose pending invites include `profile_id`.
    async fn find_inviting(&self, profile_id: Uuid) -> Result<Vec<team::Model>, ServiceError>;
    /// Case-insensitive substring search on name, at most `limit` rows.
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<team::Model>, ServiceError>;
    async fn insert(&self, t: team::Model) -> Result<team::Model, ServiceError>;
    async fn update(&self, t: team::Model) -> Result<team::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<registration::Model>, ServiceError>;
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<registration::Model>, ServiceError>;
    /// Registrations of a team, or of a solo profile (no team) when `team_id` is `None`.
    async fn list_for_owner(&self, team_id: Option<Uuid>, profile_id: Uuid) -> Result<Vec<registration::Model>, ServiceError>;
    /// Newest first.
    async fn list(&self, page: Pagination) -> Result<Page<registration::Model>, ServiceError>;
    async fn insert(&self, r: registration::Model) -> Result<registration::Model, ServiceError>;
    async fn update(&self, r: registration::Model) -> Result<registration::Model, ServiceError>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<announcement::Model>, ServiceError>;
    async fn insert(&self, a: announcement::Model) -> Result<announcement::Model, ServiceError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait LegacyRegistrationRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<legacy_registration::Model>, ServiceError>;
    async fn insert(&self, r: legacy_registration::Model) -> Result<legacy_registration::Model, ServiceError>;
}

/// Every repository behind one cloneable handle.
#[derive(Clone)]
pub struct Repositories {
    pub auth_users: Arc<dyn AuthRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub events: Arc<dyn EventRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub legacy_registrations: Arc<dyn LegacyRegistrationRepository>,
}

impl Repositories {
    pub fn seaorm(db: DatabaseConnection) -> Self {
        Self {
            auth_users: Arc::new(SeaOrmAuthRepository { db: db.clone() }),
            profiles: Arc::new(seaorm::SeaOrmProfileRepository { db: db.clone() }),
            events: Arc::new(seaorm::SeaOrmEventRepository { db: db.clone() }),
            teams: Arc::new(seaorm::SeaOrmTeamRepository { db: db.clone() }),
            registrations: Arc::new(seaorm::SeaOrmRegistrationRepository { db: db.clone() }),
            announcements: Arc::new(seaorm::SeaOrmAnnouncementRepository { db: db.clone() }),
            legacy_registrations: Arc::new(seaorm::SeaOrmLegacyRegistrationRepository { db }),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            auth_users: Arc::new(InMemoryAuthRepository::default()),
            profiles: Arc::new(memory::InMemoryProfileRepository::default()),
            events: Arc::new(memory::InMemoryEventRepository::default()),
            teams: Arc::new(memory::InMemoryTeamRepository::default()),
            registrations: Arc::new(memory::InMemoryRegistrationRepository::default()),
            announcements: Arc::new(memory::InMemoryAnnouncementRepository::default()),
            legacy_registrations: Arc::new(memory::InMemoryLegacyRegistrationRepository::default()),
        }
    }

    /// Profile of the identity-session caller.
    pub async fn require_profile(&self, clerk_id: &str) -> Result<profile::Model, ServiceError> {
        self.profiles
            .find_by_clerk_id(clerk_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile"))
    }
}
