use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Registration: lookups by order id during gateway verification
        manager
            .create_index(
                Index::create()
                    .name("uniq_registration_order")
                    .table(Registration::Table)
                    .col(Registration::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Registration: duplicate checks per (event, team)
        manager
            .create_index(
                Index::create()
                    .name("idx_registration_event_team")
                    .table(Registration::Table)
                    .col(Registration::EventId)
                    .col(Registration::TeamId)
                    .to_owned(),
            )
            .await?;

        // Profile: team membership lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_team")
                    .table(Profile::Table)
                    .col(Profile::TeamId)
                    .to_owned(),
            )
            .await?;

        // Announcement: newest-first listing
        manager
            .create_index(
                Index::create()
                    .name("idx_announcement_created")
                    .table(Announcement::Table)
                    .col(Announcement::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_registration_order").table(Registration::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_registration_event_team").table(Registration::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_profile_team").table(Profile::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_announcement_created").table(Announcement::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Registration { Table, OrderId, EventId, TeamId }

#[derive(DeriveIden)]
enum Profile { Table, TeamId }

#[derive(DeriveIden)]
enum Announcement { Table, CreatedAt }
