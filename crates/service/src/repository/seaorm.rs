use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use models::{announcement, event, legacy_registration, profile, registration, team};

use super::*;

pub struct SeaOrmProfileRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ProfileRepository for SeaOrmProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<profile::Model>, ServiceError> {
        Ok(profile::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_clerk_id(&self, clerk_id: &str) -> Result<Option<profile::Model>, ServiceError> {
        Ok(profile::Entity::find()
            .filter(profile::Column::ClerkId.eq(clerk_id.to_string()))
            .one(&self.db)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<profile::Model>, ServiceError> {
        Ok(profile::Entity::find()
            .filter(profile::Column::Email.eq(email.to_string()))
            .one(&self.db)
            .await?)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<profile::Model>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = profile::Entity::find()
            .filter(profile::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(ids.iter().filter_map(|id| rows.iter().find(|p| p.id == *id).cloned()).collect())
    }

    async fn insert(&self, p: profile::Model) -> Result<profile::Model, ServiceError> {
        Ok(profile::ActiveModel::from(p).insert(&self.db).await?)
    }

    async fn update(&self, p: profile::Model) -> Result<profile::Model, ServiceError> {
        Ok(profile::ActiveModel::from(p).reset_all().update(&self.db).await?)
    }
}

pub struct SeaOrmEventRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl EventRepository for SeaOrmEventRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<event::Model>, ServiceError> {
        Ok(event::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_event_id(&self, event_id: &str) -> Result<Option<event::Model>, ServiceError> {
        Ok(event::Entity::find()
            .filter(event::Column::EventId.eq(event_id.to_string()))
            .one(&self.db)
            .await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<event::Model>, ServiceError> {
        Ok(event::Entity::find()
            .filter(event::Column::Slug.eq(slug.to_string()))
            .one(&self.db)
            .await?)
    }

    async fn list_live(&self) -> Result<Vec<event::Model>, ServiceError> {
        Ok(event::Entity::find()
            .filter(event::Column::IsLive.eq(true))
            .order_by_asc(event::Column::Title)
            .all(&self.db)
            .await?)
    }

    async fn list_all(&self) -> Result<Vec<event::Model>, ServiceError> {
        Ok(event::Entity::find().order_by_asc(event::Column::Title).all(&self.db).await?)
    }

    async fn insert(&self, e: event::Model) -> Result<event::Model, ServiceError> {
        Ok(event::ActiveModel::from(e).insert(&self.db).await?)
    }

    async fn update(&self, e: event::Model) -> Result<event::Model, ServiceError> {
        Ok(event::ActiveModel::from(e).reset_all().update(&self.db).await?)
    }
}

pub struct SeaOrmTeamRepository {
    pub db: DatabaseConnection,
}

/// Case-insensitive substring pattern with LIKE wildcards escaped.
fn like_pattern(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 2);
    out.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn lower_name() -> Expr {
    Expr::expr(Func::lower(Expr::col(team::Column::Name)))
}

#[async_trait]
impl TeamRepository for SeaOrmTeamRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<team::Model>, ServiceError> {
        Ok(team::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<team::Model>, ServiceError> {
        Ok(team::Entity::find()
            .filter(lower_name().eq(name.to_lowercase()))
            .one(&self.db)
            .await?)
    }

    async fn find_inviting(&self, profile_id: Uuid) -> Result<Vec<team::Model>, ServiceError> {
        let needle = serde_json::json!([profile_id]);
        Ok(team::Entity::find()
            .filter(Expr::cust_with_values(r#""team"."invites" @> $1"#, [needle]))
            .order_by_asc(team::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<team::Model>, ServiceError> {
        let pattern = like_pattern(query);
        Ok(team::Entity::find()
            .filter(Expr::cust_with_values(r#"LOWER("team"."name") LIKE $1 ESCAPE '\'"#, [pattern]))
            .order_by_asc(team::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn insert(&self, t: team::Model) -> Result<team::Model, ServiceError> {
        // The unique index is case-sensitive; enforce the case-insensitive rule here.
        if self.find_by_name(&t.name).await?.is_some() {
            return Err(ServiceError::conflict("DUPLICATE_KEY", "duplicate value: name"));
        }
        Ok(team::ActiveModel::from(t).insert(&self.db).await?)
    }

    async fn update(&self, t: team::Model) -> Result<team::Model, ServiceError> {
        Ok(team::ActiveModel::from(t).reset_all().update(&self.db).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        team::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

pub struct SeaOrmRegistrationRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl RegistrationRepository for SeaOrmRegistrationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<registration::Model>, ServiceError> {
        Ok(registration::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<registration::Model>, ServiceError> {
        Ok(registration::Entity::find()
            .filter(registration::Column::OrderId.eq(order_id.to_string()))
            .one(&self.db)
            .await?)
    }

    async fn list_for_owner(&self, team_id: Option<Uuid>, profile_id: Uuid) -> Result<Vec<registration::Model>, ServiceError> {
        let query = match team_id {
            Some(tid) => registration::Entity::find().filter(registration::Column::TeamId.eq(tid)),
            None => registration::Entity::find()
                .filter(registration::Column::TeamId.is_null())
                .filter(registration::Column::ProfileId.eq(profile_id)),
        };
        Ok(query.order_by_desc(registration::Column::CreatedAt).all(&self.db).await?)
    }

    async fn list(&self, page: Pagination) -> Result<Page<registration::Model>, ServiceError> {
        let (idx, per) = page.normalize();
        let paginator = registration::Entity::find()
            .order_by_desc(registration::Column::CreatedAt)
            .paginate(&self.db, per);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(idx).await?;
        Ok(Page::new(items, total, page))
    }

    async fn insert(&self, r: registration::Model) -> Result<registration::Model, ServiceError> {
        Ok(registration::ActiveModel::from(r).insert(&self.db).await?)
    }

    async fn update(&self, r: registration::Model) -> Result<registration::Model, ServiceError> {
        Ok(registration::ActiveModel::from(r).reset_all().update(&self.db).await?)
    }
}

pub struct SeaOrmAnnouncementRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AnnouncementRepository for SeaOrmAnnouncementRepository {
    async fn list(&self) -> Result<Vec<announcement::Model>, ServiceError> {
        Ok(announcement::Entity::find()
            .order_by_desc(announcement::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn insert(&self, a: announcement::Model) -> Result<announcement::Model, ServiceError> {
        Ok(announcement::ActiveModel::from(a).insert(&self.db).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = announcement::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

pub struct SeaOrmLegacyRegistrationRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl LegacyRegistrationRepository for SeaOrmLegacyRegistrationRepository {
    async fn list(&self) -> Result<Vec<legacy_registration::Model>, ServiceError> {
        Ok(legacy_registration::Entity::find()
            .order_by_desc(legacy_registration::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn insert(&self, r: legacy_registration::Model) -> Result<legacy_registration::Model, ServiceError> {
        Ok(legacy_registration::ActiveModel::from(r).insert(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Bot_X"), r"%bot\_x%");
        assert_eq!(like_pattern("50%"), r"%50\%%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
        assert_eq!(like_pattern("Sparks"), "%sparks%");
    }
}
