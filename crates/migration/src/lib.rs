//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_move;
mod m20240101_000002_create_address;
mod m20240101_000003_create_mto_shipment;
mod m20240101_000004_create_mto_service_item;
mod m20240101_000005_create_service_item_dimension;
mod m20240101_000006_create_service_item_customer_contact;
mod m20240101_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_move::Migration),
            Box::new(m20240101_000002_create_address::Migration),
            Box::new(m20240101_000003_create_mto_shipment::Migration),
            Box::new(m20240101_000004_create_mto_service_item::Migration),
            Box::new(m20240101_000005_create_service_item_dimension::Migration),
            Box::new(m20240101_000006_create_service_item_customer_contact::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000010_add_indexes::Migration),
        ]
    }
}
