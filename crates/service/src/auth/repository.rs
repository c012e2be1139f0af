use async_trait::async_trait;
use uuid::Uuid;

use models::auth_user;

use super::errors::AuthError;
use crate::pagination::{Page, Pagination};

/// Repository abstraction for legacy account persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<auth_user::Model>, AuthError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<auth_user::Model>, AuthError>;
    /// Fails with `Conflict` when the email is taken.
    async fn insert(&self, user: auth_user::Model) -> Result<auth_user::Model, AuthError>;
    async fn update(&self, user: auth_user::Model) -> Result<auth_user::Model, AuthError>;
    /// Newest accounts first.
    async fn list(&self, page: Pagination) -> Result<Page<auth_user::Model>, AuthError>;
}

/// In-memory repository for tests and local runs without a database
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryAuthRepository {
        users: RwLock<HashMap<Uuid, auth_user::Model>>,
    }

    #[async_trait]
    impl AuthRepository for InMemoryAuthRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<auth_user::Model>, AuthError> {
            let users = self.users.read().await;
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<auth_user::Model>, AuthError> {
            Ok(self.users.read().await.get(&id).cloned())
        }

        async fn insert(&self, user: auth_user::Model) -> Result<auth_user::Model, AuthError> {
            let mut users = self.users.write().await;
            if users.values().any(|u| u.email == user.email) {
                return Err(AuthError::Conflict);
            }
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn update(&self, user: auth_user::Model) -> Result<auth_user::Model, AuthError> {
            let mut users = self.users.write().await;
            if !users.contains_key(&user.id) {
                return Err(AuthError::NotFound);
            }
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn list(&self, page: Pagination) -> Result<Page<auth_user::Model>, AuthError> {
            let users = self.users.read().await;
            let mut all: Vec<_> = users.values().cloned().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = all.len() as u64;
            let (offset, limit) = page.window();
            let items = all.into_iter().skip(offset).take(limit).collect();
            Ok(Page::new(items, total, page))
        }
    }
}
