//! Create `mto_service_item_dimensions` table (item and crate measurements for crating codes).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MtoServiceItemDimensions::Table)
                    .if_not_exists()
                    .col(uuid(MtoServiceItemDimensions::Id).primary_key())
                    .col(uuid(MtoServiceItemDimensions::MtoServiceItemId).not_null())
                    .col(string_len(MtoServiceItemDimensions::DimensionType, 8).not_null())
                    .col(integer(MtoServiceItemDimensions::LengthThousandthInches).not_null())
                    .col(integer(MtoServiceItemDimensions::WidthThousandthInches).not_null())
                    .col(integer(MtoServiceItemDimensions::HeightThousandthInches).not_null())
                    .col(timestamp_with_time_zone(MtoServiceItemDimensions::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dimension_service_item")
                            .from(MtoServiceItemDimensions::Table, MtoServiceItemDimensions::MtoServiceItemId)
                            .to(MtoServiceItems::Table, MtoServiceItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MtoServiceItemDimensions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MtoServiceItemDimensions {
    Table,
    Id,
    MtoServiceItemId,
    DimensionType,
    LengthThousandthInches,
    WidthThousandthInches,
    HeightThousandthInches,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MtoServiceItems { Table, Id }
