//! Create `registration` table: one payment record per (team or profile, event).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Registration::Table)
                    .if_not_exists()
                    .col(uuid(Registration::Id).primary_key())
                    .col(uuid(Registration::EventId).not_null())
                    .col(uuid_null(Registration::TeamId))
                    .col(uuid(Registration::ProfileId).not_null())
                    .col(string_len(Registration::PaymentStatus, 32).not_null())
                    .col(big_integer_null(Registration::AmountPaid))
                    .col(string_len_null(Registration::OrderId, 128))
                    .col(string_len_null(Registration::PaymentId, 128))
                    .col(timestamp_with_time_zone(Registration::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Registration::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registration_event")
                            .from(Registration::Table, Registration::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registration_profile")
                            .from(Registration::Table, Registration::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_registration_team")
                            .from(Registration::Table, Registration::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Registration::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Registration {
    Table,
    Id,
    EventId,
    TeamId,
    ProfileId,
    PaymentStatus,
    AmountPaid,
    OrderId,
    PaymentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Event { Table, Id }

#[derive(DeriveIden)]
enum Profile { Table, Id }

#[derive(DeriveIden)]
enum Team { Table, Id }
