//! Migrator registering collection tables in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_auth_user;
mod m20240101_000002_create_legacy_registration;
mod m20240101_000003_create_profile;
mod m20240101_000004_create_event;
mod m20240101_000005_create_team;
mod m20240101_000006_create_registration;
mod m20240101_000007_create_announcement;
mod m20240101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_auth_user::Migration),
            Box::new(m20240101_000002_create_legacy_registration::Migration),
            Box::new(m20240101_000003_create_profile::Migration),
            Box::new(m20240101_000004_create_event::Migration),
            Box::new(m20240101_000005_create_team::Migration),
            Box::new(m20240101_000006_create_registration::Migration),
            Box::new(m20240101_000007_create_announcement::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000099_add_indexes::Migration),
        ]
    }
}
