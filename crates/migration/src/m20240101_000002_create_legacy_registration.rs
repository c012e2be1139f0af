//! Create `legacy_registration` table holding one-shot registrations from the
//! single-page form flow (leader details, members and chosen events in one row).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LegacyRegistration::Table)
                    .if_not_exists()
                    .col(uuid(LegacyRegistration::Id).primary_key())
                    .col(json_binary(LegacyRegistration::Leader).not_null())
                    .col(string_len(LegacyRegistration::TeamName, 128).not_null())
                    .col(json_binary(LegacyRegistration::Members).not_null())
                    .col(json_binary(LegacyRegistration::SelectedEvents).not_null())
                    .col(big_integer(LegacyRegistration::TotalAmount).not_null())
                    .col(string_len(LegacyRegistration::TransactionId, 128).not_null())
                    .col(string_len(LegacyRegistration::Status, 32).not_null().default("Pending"))
                    .col(timestamp_with_time_zone(LegacyRegistration::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LegacyRegistration::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LegacyRegistration {
    Table,
    Id,
    Leader,
    TeamName,
    Members,
    SelectedEvents,
    TotalAmount,
    TransactionId,
    Status,
    CreatedAt,
}
