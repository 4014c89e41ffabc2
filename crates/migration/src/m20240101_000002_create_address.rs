//! Create `addresses` table.
//!
//! Address rows are immutable values; `fingerprint` holds the normalized content and is
//! unique so that identical addresses resolve to one row.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(uuid(Addresses::Id).primary_key())
                    .col(string_len(Addresses::StreetAddress1, 255).not_null())
                    .col(ColumnDef::new(Addresses::StreetAddress2).string_len(255).null())
                    .col(string_len(Addresses::City, 128).not_null())
                    .col(string_len(Addresses::State, 2).not_null())
                    .col(string_len(Addresses::PostalCode, 10).not_null())
                    .col(string_len(Addresses::Fingerprint, 700).unique_key().not_null())
                    .col(timestamp_with_time_zone(Addresses::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Addresses::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    #[sea_orm(iden = "street_address_1")]
    StreetAddress1,
    #[sea_orm(iden = "street_address_2")]
    StreetAddress2,
    City,
    State,
    PostalCode,
    Fingerprint,
    CreatedAt,
}
