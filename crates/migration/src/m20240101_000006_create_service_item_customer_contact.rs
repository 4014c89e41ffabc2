//! Create `mto_service_item_customer_contacts` table (destination SIT contact attempts).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MtoServiceItemCustomerContacts::Table)
                    .if_not_exists()
                    .col(uuid(MtoServiceItemCustomerContacts::Id).primary_key())
                    .col(uuid(MtoServiceItemCustomerContacts::MtoServiceItemId).not_null())
                    .col(string_len(MtoServiceItemCustomerContacts::ContactType, 8).not_null())
                    .col(date(MtoServiceItemCustomerContacts::DateOfContact).not_null())
                    .col(string_len(MtoServiceItemCustomerContacts::TimeMilitary, 5).not_null())
                    .col(date(MtoServiceItemCustomerContacts::FirstAvailableDeliveryDate).not_null())
                    .col(timestamp_with_time_zone(MtoServiceItemCustomerContacts::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_contact_service_item")
                            .from(MtoServiceItemCustomerContacts::Table, MtoServiceItemCustomerContacts::MtoServiceItemId)
                            .to(MtoServiceItems::Table, MtoServiceItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MtoServiceItemCustomerContacts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MtoServiceItemCustomerContacts {
    Table,
    Id,
    MtoServiceItemId,
    ContactType,
    DateOfContact,
    TimeMilitary,
    FirstAvailableDeliveryDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MtoServiceItems { Table, Id }
