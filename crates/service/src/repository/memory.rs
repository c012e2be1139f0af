use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use models::{announcement, event, legacy_registration, profile, registration, team};

use super::*;

fn duplicate(what: &str) -> ServiceError {
    ServiceError::conflict("DUPLICATE_KEY", format!("duplicate value: {what}"))
}

fn missing(entity: &str) -> ServiceError {
    ServiceError::not_found(entity)
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    rows: RwLock<HashMap<Uuid, profile::Model>>,
}

impl InMemoryProfileRepository {
    fn clashes(rows: &HashMap<Uuid, profile::Model>, p: &profile::Model) -> Option<&'static str> {
        rows.values().filter(|o| o.id != p.id).find_map(|o| {
            if o.clerk_id == p.clerk_id {
                Some("clerk_id")
            } else if o.email == p.email {
                Some("email")
            } else {
                None
            }
        })
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<profile::Model>, ServiceError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<profile::Model>, ServiceError> {
        Ok(self.rows.read().await.values().find(|p| p.clerk_id == clerk_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<profile::Model>, ServiceError> {
        Ok(self.rows.read().await.values().find(|p| p.email == email).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<profile::Model>, ServiceError> {
        let rows = self.rows.read().await;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn insert(&self, p: profile::Model) -> Result<profile::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        if let Some(field) = Self::clashes(&rows, &p) {
            return Err(duplicate(field));
        }
        rows.insert(p.id, p.clone());
        Ok(p)
    }

    async fn update(&self, p: profile::Model) -> Result<profile::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&p.id) {
            return Err(missing("Profile"));
        }
        if let Some(field) = Self::clashes(&rows, &p) {
            return Err(duplicate(field));
        }
        rows.insert(p.id, p.clone());
        Ok(p)
    }
}

#[derive(Default)]
pub struct InMemoryEventRepository {
    rows: RwLock<HashMap<Uuid, event::Model>>,
}

impl InMemoryEventRepository {
    fn clashes(rows: &HashMap<Uuid, event::Model>, e: &event::Model) -> Option<&'static str> {
        rows.values().filter(|o| o.id != e.id).find_map(|o| {
            if o.event_id == e.event_id {
                Some("event_id")
            } else if o.slug == e.slug {
                Some("slug")
            } else {
                None
            }
        })
    }

    async fn sorted(&self, live_only: bool) -> Vec<event::Model> {
        let rows = self.rows.read().await;
        let mut all: Vec<_> = rows.values().filter(|e| !live_only || e.is_live).cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        all
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<event::Model>, ServiceError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<event::Model>, ServiceError> {
        Ok(self.rows.read().await.values().find(|e| e.event_id == event_id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<event::Model>, ServiceError> {
        Ok(self.rows.read().await.values().find(|e| e.slug == slug).cloned())
    }

    async fn list_live(&self) -> Result<Vec<event::Model>, ServiceError> {
        Ok(self.sorted(true).await)
    }

    async fn list_all(&self) -> Result<Vec<event::Model>, ServiceError> {
        Ok(self.sorted(false).await)
    }

    async fn insert(&self, e: event::Model) -> Result<event::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        if let Some(field) = Self::clashes(&rows, &e) {
            return Err(duplicate(field));
        }
        rows.insert(e.id, e.clone());
        Ok(e)
    }

    async fn update(&self, e: event::Model) -> Result<event::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&e.id) {
            return Err(missing("Event"));
        }
        if let Some(field) = Self::clashes(&rows, &e) {
            return Err(duplicate(field));
        }
        rows.insert(e.id, e.clone());
        Ok(e)
    }
}

#[derive(Default)]
pub struct InMemoryTeamRepository {
    rows: RwLock<HashMap<Uuid, team::Model>>,
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<team::Model>, ServiceError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<team::Model>, ServiceError> {
        let needle = name.to_lowercase();
        Ok(self.rows.read().await.values().find(|t| t.name.to_lowercase() == needle).cloned())
    }

    async fn find_inviting(&self, profile_id: Uuid) -> Result<Vec<team::Model>, ServiceError> {
        let rows = self.rows.read().await;
        let mut teams: Vec<_> = rows.values().filter(|t| t.invites.contains(profile_id)).cloned().collect();
        teams.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(teams)
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<team::Model>, ServiceError> {
        let needle = query.to_lowercase();
        let rows = self.rows.read().await;
        let mut teams: Vec<_> = rows.values().filter(|t| t.name.to_lowercase().contains(&needle)).cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        teams.truncate(limit as usize);
        Ok(teams)
    }

    async fn insert(&self, t: team::Model) -> Result<team::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        let lower = t.name.to_lowercase();
        if rows.values().any(|o| o.name.to_lowercase() == lower) {
            return Err(duplicate("name"));
        }
        rows.insert(t.id, t.clone());
        Ok(t)
    }

    async fn update(&self, t: team::Model) -> Result<team::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&t.id) {
            return Err(missing("Team"));
        }
        rows.insert(t.id, t.clone());
        Ok(t)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.rows.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRegistrationRepository {
    rows: RwLock<HashMap<Uuid, registration::Model>>,
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<registration::Model>, ServiceError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<registration::Model>, ServiceError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|r| r.order_id.as_deref() == Some(order_id)).cloned())
    }

    async fn list_for_owner(&self, team_id: Option<Uuid>, profile_id: Uuid) -> Result<Vec<registration::Model>, ServiceError> {
        let rows = self.rows.read().await;
        let mut regs: Vec<_> = rows
            .values()
            .filter(|r| match team_id {
                Some(tid) => r.team_id == Some(tid),
                None => r.team_id.is_none() && r.profile_id == profile_id,
            })
            .cloned()
            .collect();
        regs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(regs)
    }

    async fn list(&self, page: Pagination) -> Result<Page<registration::Model>, ServiceError> {
        let rows = self.rows.read().await;
        let mut all: Vec<_> = rows.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = all.len() as u64;
        let (offset, limit) = page.window();
        Ok(Page::new(all.into_iter().skip(offset).take(limit).collect(), total, page))
    }

    async fn insert(&self, r: registration::Model) -> Result<registration::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        if r.order_id.is_some() && rows.values().any(|o| o.order_id == r.order_id) {
            return Err(duplicate("order_id"));
        }
        rows.insert(r.id, r.clone());
        Ok(r)
    }

    async fn update(&self, r: registration::Model) -> Result<registration::Model, ServiceError> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&r.id) {
            return Err(missing("Registration"));
        }
        if r.order_id.is_some() && rows.values().any(|o| o.id != r.id && o.order_id == r.order_id) {
            return Err(duplicate("order_id"));
        }
        rows.insert(r.id, r.clone());
        Ok(r)
    }
}

#[derive(Default)]
pub struct InMemoryAnnouncementRepository {
    rows: RwLock<HashMap<Uuid, announcement::Model>>,
}

#[async_trait]
impl AnnouncementRepository for InMemoryAnnouncementRepository {
    async fn list(&self) -> Result<Vec<announcement::Model>, ServiceError> {
        let rows = self.rows.read().await;
        let mut all: Vec<_> = rows.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn insert(&self, a: announcement::Model) -> Result<announcement::Model, ServiceError> {
        self.rows.write().await.insert(a.id, a.clone());
        Ok(a)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryLegacyRegistrationRepository {
    rows: RwLock<Vec<legacy_registration::Model>>,
}

#[async_trait]
impl LegacyRegistrationRepository for InMemoryLegacyRegistrationRepository {
    async fn list(&self) -> Result<Vec<legacy_registration::Model>, ServiceError> {
        let mut all = self.rows.read().await.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn insert(&self, r: legacy_registration::Model) -> Result<legacy_registration::Model, ServiceError> {
        self.rows.write().await.push(r.clone());
        Ok(r)
    }
}
