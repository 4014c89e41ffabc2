//! Create `mto_shipments` table with FKs to `moves` and `addresses`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MtoShipments::Table)
                    .if_not_exists()
                    .col(uuid(MtoShipments::Id).primary_key())
                    .col(uuid(MtoShipments::MoveId).not_null())
                    .col(string_len(MtoShipments::ShipmentType, 32).not_null())
                    .col(string_len(MtoShipments::Status, 32).not_null())
                    .col(ColumnDef::new(MtoShipments::PickupAddressId).uuid().null())
                    .col(ColumnDef::new(MtoShipments::DestinationAddressId).uuid().null())
                    .col(ColumnDef::new(MtoShipments::PrimeEstimatedWeight).integer().null())
                    .col(ColumnDef::new(MtoShipments::RequestedPickupDate).date().null())
                    .col(timestamp_with_time_zone(MtoShipments::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MtoShipments::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_shipment_move")
                            .from(MtoShipments::Table, MtoShipments::MoveId)
                            .to(Moves::Table, Moves::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_shipment_pickup_address")
                            .from(MtoShipments::Table, MtoShipments::PickupAddressId)
                            .to(Addresses::Table, Addresses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_shipment_destination_address")
                            .from(MtoShipments::Table, MtoShipments::DestinationAddressId)
                            .to(Addresses::Table, Addresses::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MtoShipments::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MtoShipments {
    Table,
    Id,
    MoveId,
    ShipmentType,
    Status,
    PickupAddressId,
    DestinationAddressId,
    PrimeEstimatedWeight,
    RequestedPickupDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Moves { Table, Id }

#[derive(DeriveIden)]
enum Addresses { Table, Id }
