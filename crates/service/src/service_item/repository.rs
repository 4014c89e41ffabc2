use async_trait::async_trait;
use common::units::Cents;
use uuid::Uuid;

use super::domain::{Address, AddressInput, ServiceItem, Shipment};
use super::lifecycle::CodeFamily;
use crate::errors::ServiceError;

/// Shipment persistence needed by the creation flow.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// The shipment with its move status and addresses, or `NotFound`.
    async fn fetch(&self, id: Uuid) -> Result<Shipment, ServiceError>;
    async fn update_pickup_address(&self, shipment_id: Uuid, address: &Address) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait ServiceItemRepository: Send + Sync {
    /// Every item of the family on the shipment, rejected ones included, oldest first.
    async fn find_by_shipment_and_code_family(&self, shipment_id: Uuid, family: CodeFamily) -> Result<Vec<ServiceItem>, ServiceError>;
    /// Insert all items or none of them.
    async fn create(&self, items: Vec<ServiceItem>) -> Result<Vec<ServiceItem>, ServiceError>;
    async fn set_pricing_estimate(&self, service_item_id: Uuid, estimate: Cents) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Idempotent by normalized content: the same address never gets a second row.
    async fn find_or_create(&self, address: &AddressInput) -> Result<Address, ServiceError>;
}

/// Everything the creator talks to, usually one store bound to one transaction.
pub trait ServiceItemStore: ShipmentRepository + ServiceItemRepository + AddressRepository {}

impl<T> ServiceItemStore for T where T: ShipmentRepository + ServiceItemRepository + AddressRepository {}

/// Simple in-memory store for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::hash_map::Entry;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    #[derive(Debug, thiserror::Error)]
    #[error("injected storage failure")]
    pub struct InjectedFailure;

    #[derive(Default)]
    pub struct InMemoryStore {
        shipments: Mutex<HashMap<Uuid, Shipment>>,
        items: Mutex<Vec<ServiceItem>>,
        addresses: Mutex<HashMap<String, Address>>, // key: fingerprint
        fail_writes: AtomicBool,
    }

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl InMemoryStore {
        pub fn insert_shipment(&self, shipment: Shipment) {
            lock(&self.shipments).insert(shipment.id, shipment);
        }

        /// Seed an existing item, e.g. a previously approved first-day SIT.
        pub fn insert_service_item(&self, item: ServiceItem) {
            lock(&self.items).push(item);
        }

        /// Seed an address row as if created earlier.
        pub fn insert_address(&self, address: Address) {
            lock(&self.addresses).insert(address.value.fingerprint(), address);
        }

        pub fn shipment(&self, id: Uuid) -> Option<Shipment> {
            lock(&self.shipments).get(&id).cloned()
        }

        pub fn service_items(&self, shipment_id: Uuid) -> Vec<ServiceItem> {
            lock(&self.items).iter().filter(|i| i.mto_shipment_id == shipment_id).cloned().collect()
        }

        pub fn address_count(&self) -> usize {
            lock(&self.addresses).len()
        }

        /// Make every subsequent write fail with a query error.
        pub fn fail_writes(&self, on: bool) {
            self.fail_writes.store(on, Ordering::SeqCst);
        }

        fn check_writable(&self, entity: &str) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::query(entity, InjectedFailure));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ShipmentRepository for InMemoryStore {
        async fn fetch(&self, id: Uuid) -> Result<Shipment, ServiceError> {
            self.shipment(id).ok_or_else(|| ServiceError::not_found(&format!("mto_shipment {id}")))
        }

        async fn update_pickup_address(&self, shipment_id: Uuid, address: &Address) -> Result<(), ServiceError> {
            self.check_writable("mto_shipment")?;
            let mut shipments = lock(&self.shipments);
            let shipment = shipments
                .get_mut(&shipment_id)
                .ok_or_else(|| ServiceError::not_found(&format!("mto_shipment {shipment_id}")))?;
            shipment.pickup_address = Some(address.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl ServiceItemRepository for InMemoryStore {
        async fn find_by_shipment_and_code_family(&self, shipment_id: Uuid, family: CodeFamily) -> Result<Vec<ServiceItem>, ServiceError> {
            let items = lock(&self.items);
            Ok(items
                .iter()
                .filter(|i| i.mto_shipment_id == shipment_id && family.contains(i.re_service_code()))
                .cloned()
                .collect())
        }

        async fn create(&self, new_items: Vec<ServiceItem>) -> Result<Vec<ServiceItem>, ServiceError> {
            self.check_writable("mto_service_item")?;
            let mut items = lock(&self.items);
            // Same rule as the partial unique index on first-day SIT codes.
            for new in new_items.iter().filter(|i| i.re_service_code().is_first_day_sit()) {
                let taken = items.iter().any(|i| {
                    i.mto_shipment_id == new.mto_shipment_id && i.re_service_code() == new.re_service_code() && !i.is_rejected()
                });
                if taken {
                    return Err(ServiceError::Conflict(format!(
                        "mto_service_item violates a uniqueness rule: {} already exists for shipment {}",
                        new.re_service_code(),
                        new.mto_shipment_id
                    )));
                }
            }
            items.extend(new_items.iter().cloned());
            Ok(new_items)
        }

        async fn set_pricing_estimate(&self, service_item_id: Uuid, estimate: Cents) -> Result<(), ServiceError> {
            self.check_writable("mto_service_item")?;
            let mut items = lock(&self.items);
            let item = items
                .iter_mut()
                .find(|i| i.id == service_item_id)
                .ok_or_else(|| ServiceError::not_found(&format!("mto_service_item {service_item_id}")))?;
            item.pricing_estimate = Some(estimate);
            Ok(())
        }
    }

    #[async_trait]
    impl AddressRepository for InMemoryStore {
        async fn find_or_create(&self, address: &AddressInput) -> Result<Address, ServiceError> {
            let mut addresses = lock(&self.addresses);
            match addresses.entry(address.fingerprint()) {
                Entry::Occupied(existing) => Ok(existing.get().clone()),
                Entry::Vacant(slot) => {
                    self.check_writable("address")?;
                    let created = Address { id: Uuid::new_v4(), value: address.normalized() };
                    Ok(slot.insert(created).clone())
                }
            }
        }
    }
}
