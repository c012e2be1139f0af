//! Create `auth_user` table for legacy password-based accounts.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthUser::Table)
                    .if_not_exists()
                    .col(uuid(AuthUser::Id).primary_key())
                    .col(string_len(AuthUser::Name, 128).not_null())
                    .col(string_len(AuthUser::Email, 255).unique_key().not_null())
                    .col(string_len(AuthUser::PasswordHash, 255).not_null())
                    .col(string_len(AuthUser::College, 255).not_null())
                    .col(json_binary(AuthUser::Events).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(json_binary(AuthUser::TeamMembers).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(string_len(AuthUser::PaymentStatus, 32).not_null().default("pending"))
                    .col(string_len(AuthUser::Role, 16).not_null().default("USER"))
                    .col(string_len_null(AuthUser::TeamName, 128))
                    .col(json_binary(AuthUser::PaidEvents).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(string_len_null(AuthUser::TransactionId, 128))
                    .col(text_null(AuthUser::ScreenshotUrl))
                    .col(string_len_null(AuthUser::DeclaredAmount, 32))
                    .col(timestamp_with_time_zone(AuthUser::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(AuthUser::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AuthUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AuthUser {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    College,
    Events,
    TeamMembers,
    PaymentStatus,
    Role,
    TeamName,
    PaidEvents,
    TransactionId,
    ScreenshotUrl,
    DeclaredAmount,
    CreatedAt,
    UpdatedAt,
}
