//! Create `team` table with FK from leader to `profile`.
//!
//! Member, join-request and invite lists are stored as jsonb arrays of profile ids.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(uuid(Team::Id).primary_key())
                    .col(string_len(Team::Name, 64).unique_key().not_null())
                    .col(uuid(Team::LeaderId).not_null())
                    .col(json_binary(Team::Members).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(json_binary(Team::JoinRequests).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(json_binary(Team::Invites).not_null().default(Expr::cust("'[]'::jsonb")))
                    .col(boolean(Team::IsLocked).not_null().default(false))
                    .col(timestamp_with_time_zone(Team::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Team::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_leader_profile")
                            .from(Team::Table, Team::LeaderId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Team::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Team { Table, Id, Name, LeaderId, Members, JoinRequests, Invites, IsLocked, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Profile { Table, Id }
