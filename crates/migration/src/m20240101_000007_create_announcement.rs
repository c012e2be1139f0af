//! Create `announcement` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Announcement::Table)
                    .if_not_exists()
                    .col(uuid(Announcement::Id).primary_key())
                    .col(string_len(Announcement::Title, 255).not_null())
                    .col(text(Announcement::Message).not_null())
                    .col(string_len(Announcement::Kind, 16).not_null().default("info"))
                    .col(timestamp_with_time_zone(Announcement::Date).not_null())
                    .col(timestamp_with_time_zone(Announcement::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Announcement::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Announcement::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Announcement { Table, Id, Title, Message, Kind, Date, CreatedAt, UpdatedAt }
