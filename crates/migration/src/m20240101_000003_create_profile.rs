//! Create `profile` table for identity-provider accounts.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(uuid(Profile::Id).primary_key())
                    .col(string_len(Profile::ClerkId, 128).unique_key().not_null())
                    .col(string_len(Profile::Email, 255).unique_key().not_null())
                    .col(string_len(Profile::Username, 128).not_null())
                    .col(string_len_null(Profile::College, 255))
                    .col(string_len_null(Profile::Phone, 32))
                    .col(text_null(Profile::AvatarUrl))
                    .col(json_binary(Profile::RegisteredEvents).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(json_binary(Profile::PaidEvents).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(boolean(Profile::OnboardingCompleted).not_null().default(false))
                    .col(uuid_null(Profile::TeamId))
                    .col(timestamp_with_time_zone(Profile::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Profile::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Profile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Profile {
    Table,
    Id,
    ClerkId,
    Email,
    Username,
    College,
    Phone,
    AvatarUrl,
    RegisteredEvents,
    PaidEvents,
    OnboardingCompleted,
    TeamId,
    CreatedAt,
    UpdatedAt,
}
