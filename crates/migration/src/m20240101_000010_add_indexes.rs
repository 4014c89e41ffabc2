use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Only one live first-day SIT item per shipment and side. Racing creations of the same
/// first-day code serialize on this index; the loser sees a unique violation.
/// Rejected items are outside the index so a replacement can be submitted.
const FIRST_DAY_SIT_UNIQUE: &str = "CREATE UNIQUE INDEX IF NOT EXISTS uniq_service_item_first_day_sit \
     ON mto_service_items (mto_shipment_id, re_service_code) \
     WHERE re_service_code IN ('DOFSIT', 'DDFSIT') AND status <> 'REJECTED'";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Shipments: index on move_id
        manager
            .create_index(
                Index::create()
                    .name("idx_mto_shipment_move")
                    .table(MtoShipments::Table)
                    .col(MtoShipments::MoveId)
                    .to_owned(),
            )
            .await?;

        // Service items: lookups by (shipment, code family)
        manager
            .create_index(
                Index::create()
                    .name("idx_service_item_shipment_code")
                    .table(MtoServiceItems::Table)
                    .col(MtoServiceItems::MtoShipmentId)
                    .col(MtoServiceItems::ReServiceCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dimension_service_item")
                    .table(MtoServiceItemDimensions::Table)
                    .col(MtoServiceItemDimensions::MtoServiceItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customer_contact_service_item")
                    .table(MtoServiceItemCustomerContacts::Table)
                    .col(MtoServiceItemCustomerContacts::MtoServiceItemId)
                    .to_owned(),
            )
            .await?;

        // Partial unique index; the schema builder has no WHERE clause support here
        manager.get_connection().execute_unprepared(FIRST_DAY_SIT_UNIQUE).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS uniq_service_item_first_day_sit")
            .await?;
        manager.drop_index(Index::drop().name("idx_customer_contact_service_item").table(MtoServiceItemCustomerContacts::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_dimension_service_item").table(MtoServiceItemDimensions::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_service_item_shipment_code").table(MtoServiceItems::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_mto_shipment_move").table(MtoShipments::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum MtoShipments { Table, MoveId }

#[derive(DeriveIden)]
enum MtoServiceItems { Table, MtoShipmentId, ReServiceCode }

#[derive(DeriveIden)]
enum MtoServiceItemDimensions { Table, MtoServiceItemId }

#[derive(DeriveIden)]
enum MtoServiceItemCustomerContacts { Table, MtoServiceItemId }
