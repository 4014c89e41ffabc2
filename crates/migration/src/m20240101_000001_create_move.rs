//! Create `moves` table.
//!
//! Only the columns the service-item engine reads: locator and approval status.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Moves::Table)
                    .if_not_exists()
                    .col(uuid(Moves::Id).primary_key())
                    .col(string_len(Moves::Locator, 16).unique_key().not_null())
                    .col(string_len(Moves::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Moves::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Moves::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Moves::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Moves { Table, Id, Locator, Status, CreatedAt, UpdatedAt }
