//! Site-wide notices shown on the dashboard.
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::announcement::{self, AnnouncementKind};

use crate::errors::ServiceError;
use crate::repository::Repositories;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAnnouncementInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

pub struct AnnouncementService {
    repos: Repositories,
}

impl AnnouncementService {
    pub fn new(repos: Repositories) -> Self { Self { repos } }

    pub async fn list(&self) -> Result<Vec<announcement::Model>, ServiceError> {
        self.repos.announcements.list().await
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateAnnouncementInput) -> Result<announcement::Model, ServiceError> {
        let title = input.title.trim();
        let message = input.message.trim();
        if title.is_empty() || message.is_empty() {
            return Err(ServiceError::validation("MISSING_FIELDS", "Title and message are required"));
        }
        let kind = match input.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            None => AnnouncementKind::default(),
            Some(k) => AnnouncementKind::parse(k)
                .ok_or_else(|| ServiceError::validation("INVALID_TYPE", format!("type must be info, alert or warning, got {k}")))?,
        };
        let now = Utc::now().into();
        let row = announcement::Model {
            id: Uuid::new_v4(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            date: now,
            created_at: now,
            updated_at: now,
        };
        let row = self.repos.announcements.insert(row).await?;
        info!(id = %row.id, kind = ?row.kind, "announcement_created");
        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Option<Uuid>) -> Result<(), ServiceError> {
        let id = id.ok_or_else(|| ServiceError::validation("ID_REQUIRED", "ID required"))?;
        if !self.repos.announcements.delete(id).await? {
            return Err(ServiceError::not_found("Announcement"));
        }
        info!(%id, "announcement_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, message: &str, kind: Option<&str>) -> CreateAnnouncementInput {
        CreateAnnouncementInput { title: title.into(), message: message.into(), kind: kind.map(str::to_string) }
    }

    #[tokio::test]
    async fn create_defaults_to_info_and_lists_newest_first() {
        let svc = AnnouncementService::new(Repositories::in_memory());
        let first = svc.create(input("Gates open", "Arena opens at 9", None)).await.unwrap();
        assert_eq!(first.kind, AnnouncementKind::Info);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = svc.create(input("Delay", "Round 2 delayed", Some("warning"))).await.unwrap();

        let all = svc.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let svc = AnnouncementService::new(Repositories::in_memory());
        assert_eq!(svc.create(input("", "m", None)).await.unwrap_err().code(), "MISSING_FIELDS");
        assert_eq!(svc.create(input("t", "m", Some("urgent"))).await.unwrap_err().code(), "INVALID_TYPE");
    }

    #[tokio::test]
    async fn delete_requires_known_id() {
        let svc = AnnouncementService::new(Repositories::in_memory());
        assert_eq!(svc.delete(None).await.unwrap_err().code(), "ID_REQUIRED");
        assert_eq!(svc.delete(Some(Uuid::new_v4())).await.unwrap_err().code(), "ANNOUNCEMENT_NOT_FOUND");
        let a = svc.create(input("t", "m", Some("alert"))).await.unwrap();
        svc.delete(Some(a.id)).await.unwrap();
        assert!(svc.list().await.unwrap().is_empty());
    }
}
