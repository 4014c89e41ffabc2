//! Create `mto_service_items` table.
//!
//! One wide row per service item; which columns are populated depends on `re_service_code`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MtoServiceItems::Table)
                    .if_not_exists()
                    .col(uuid(MtoServiceItems::Id).primary_key())
                    .col(uuid(MtoServiceItems::MoveId).not_null())
                    .col(uuid(MtoServiceItems::MtoShipmentId).not_null())
                    .col(string_len(MtoServiceItems::ReServiceCode, 16).not_null())
                    .col(string_len(MtoServiceItems::Status, 16).not_null())
                    .col(ColumnDef::new(MtoServiceItems::Reason).text().null())
                    .col(ColumnDef::new(MtoServiceItems::RejectionReason).text().null())
                    .col(ColumnDef::new(MtoServiceItems::ReferenceId).string_len(32).null())
                    .col(ColumnDef::new(MtoServiceItems::Description).text().null())
                    .col(ColumnDef::new(MtoServiceItems::SitPostalCode).string_len(10).null())
                    .col(ColumnDef::new(MtoServiceItems::SitEntryDate).date().null())
                    .col(ColumnDef::new(MtoServiceItems::SitDepartureDate).date().null())
                    .col(ColumnDef::new(MtoServiceItems::SitOriginHhgOriginalAddressId).uuid().null())
                    .col(ColumnDef::new(MtoServiceItems::SitOriginHhgActualAddressId).uuid().null())
                    .col(ColumnDef::new(MtoServiceItems::SitDestinationFinalAddressId).uuid().null())
                    .col(ColumnDef::new(MtoServiceItems::EstimatedWeight).integer().null())
                    .col(ColumnDef::new(MtoServiceItems::ActualWeight).integer().null())
                    .col(ColumnDef::new(MtoServiceItems::StandaloneCrate).boolean().null())
                    .col(ColumnDef::new(MtoServiceItems::ExternalCrate).boolean().null())
                    .col(ColumnDef::new(MtoServiceItems::PricingEstimate).big_integer().null())
                    .col(timestamp_with_time_zone(MtoServiceItems::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MtoServiceItems::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_service_item_move")
                            .from(MtoServiceItems::Table, MtoServiceItems::MoveId)
                            .to(Moves::Table, Moves::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_service_item_shipment")
                            .from(MtoServiceItems::Table, MtoServiceItems::MtoShipmentId)
                            .to(MtoShipments::Table, MtoShipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_service_item_original_address")
                            .from(MtoServiceItems::Table, MtoServiceItems::SitOriginHhgOriginalAddressId)
                            .to(Addresses::Table, Addresses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_service_item_actual_address")
                            .from(MtoServiceItems::Table, MtoServiceItems::SitOriginHhgActualAddressId)
                            .to(Addresses::Table, Addresses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mto_service_item_final_address")
                            .from(MtoServiceItems::Table, MtoServiceItems::SitDestinationFinalAddressId)
                            .to(Addresses::Table, Addresses::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MtoServiceItems::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MtoServiceItems {
    Table,
    Id,
    MoveId,
    MtoShipmentId,
    ReServiceCode,
    Status,
    Reason,
    RejectionReason,
    ReferenceId,
    Description,
    SitPostalCode,
    SitEntryDate,
    SitDepartureDate,
    SitOriginHhgOriginalAddressId,
    SitOriginHhgActualAddressId,
    SitDestinationFinalAddressId,
    EstimatedWeight,
    ActualWeight,
    StandaloneCrate,
    ExternalCrate,
    PricingEstimate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Moves { Table, Id }

#[derive(DeriveIden)]
enum MtoShipments { Table, Id }

#[derive(DeriveIden)]
enum Addresses { Table, Id }
