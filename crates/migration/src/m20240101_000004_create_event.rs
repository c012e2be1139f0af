//! Create `event` table: the admin-defined competition catalog.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(uuid(Event::Id).primary_key())
                    .col(string_len(Event::EventId, 64).unique_key().not_null())
                    .col(string_len(Event::Title, 255).not_null())
                    .col(string_len(Event::Slug, 255).unique_key().not_null())
                    .col(string_len(Event::Category, 64).not_null())
                    .col(text(Event::Description).not_null())
                    .col(string_len(Event::TeamSize, 64).not_null())
                    .col(string_len(Event::Prize, 128).not_null())
                    .col(json_binary(Event::Rules).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(text_null(Event::Image))
                    .col(big_integer(Event::Fees).not_null().default(0))
                    .col(integer(Event::MinTeamSize).not_null().default(1))
                    .col(integer(Event::MaxTeamSize).not_null().default(4))
                    .col(integer_null(Event::MaxRegistrations))
                    .col(integer(Event::CurrentRegistrations).not_null().default(0))
                    .col(timestamp_with_time_zone_null(Event::RegistrationDeadline))
                    .col(boolean(Event::IsLive).not_null().default(true))
                    .col(uuid_null(Event::CreatedBy))
                    .col(timestamp_with_time_zone(Event::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Event::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Event::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
    EventId,
    Title,
    Slug,
    Category,
    Description,
    TeamSize,
    Prize,
    Rules,
    Image,
    Fees,
    MinTeamSize,
    MaxTeamSize,
    MaxRegistrations,
    CurrentRegistrations,
    RegistrationDeadline,
    IsLive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
