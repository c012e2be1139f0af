use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use models::auth_user;

use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn repo_err(e: sea_orm::DbErr) -> AuthError {
    AuthError::from(ServiceError::from(e))
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<auth_user::Model>, AuthError> {
        auth_user::Entity::find()
            .filter(auth_user::Column::Email.eq(email.to_string()))
            .one(&self.db)
            .await
            .map_err(repo_err)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<auth_user::Model>, AuthError> {
        auth_user::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)
    }

    async fn insert(&self, user: auth_user::Model) -> Result<auth_user::Model, AuthError> {
        auth_user::ActiveModel::from(user).insert(&self.db).await.map_err(repo_err)
    }

    async fn update(&self, user: auth_user::Model) -> Result<auth_user::Model, AuthError> {
        auth_user::ActiveModel::from(user).reset_all().update(&self.db).await.map_err(repo_err)
    }

    async fn list(&self, page: Pagination) -> Result<Page<auth_user::Model>, AuthError> {
        let (idx, per) = page.normalize();
        let paginator = auth_user::Entity::find()
            .order_by_desc(auth_user::Column::CreatedAt)
            .paginate(&self.db, per);
        let total = paginator.num_items().await.map_err(repo_err)?;
        let items = paginator.fetch_page(idx).await.map_err(repo_err)?;
        Ok(Page::new(items, total, page))
    }
}
