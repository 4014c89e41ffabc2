use tracing::info;
use uuid::Uuid;

use super::domain::{Address, AddressInput, OriginSit, Shipment};
use super::lifecycle::companion_code;
use super::repository::{AddressRepository, ShipmentRepository};
use crate::errors::ServiceError;

/// Outcome of resolving a first-day origin SIT's actual address against the shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct Propagation {
    pub actual: Address,
    /// Pickup address of the shipment before this request.
    pub original: Option<Address>,
    pub pickup_changed: bool,
}

impl Propagation {
    /// Stamp both addresses on the first-day item.
    pub fn apply_to(&self, item: &mut OriginSit) {
        item.sit_hhg_actual_origin = Some(self.actual.clone());
        item.sit_hhg_original_origin = self.original.clone();
    }

    /// The companion item created when the pickup moved, sharing dates, reason and addresses.
    pub fn companion(&self, first_day: &OriginSit) -> Option<OriginSit> {
        if !self.pickup_changed {
            return None;
        }
        companion_code(first_day.re_service_code).map(|re_service_code| OriginSit { re_service_code, ..first_day.clone() })
    }
}

pub struct AddressPropagator<'a, R: ?Sized> {
    repo: &'a R,
}

impl<'a, R: AddressRepository + ShipmentRepository + ?Sized> AddressPropagator<'a, R> {
    pub fn new(repo: &'a R) -> Self { Self { repo } }

    /// Find or create the actual address row. Nothing is written when it equals the current pickup.
    pub async fn resolve(&self, shipment: &Shipment, actual: &AddressInput) -> Result<Propagation, ServiceError> {
        if let Some(current) = shipment.pickup_address.as_ref().filter(|p| p.value.same_as(actual)) {
            return Ok(Propagation { actual: current.clone(), original: Some(current.clone()), pickup_changed: false });
        }
        let actual = self.repo.find_or_create(actual).await?;
        Ok(Propagation { actual, original: shipment.pickup_address.clone(), pickup_changed: true })
    }

    /// Point the shipment's pickup at the actual address when it changed.
    pub async fn apply(&self, shipment_id: Uuid, propagation: &Propagation) -> Result<(), ServiceError> {
        if !propagation.pickup_changed {
            return Ok(());
        }
        self.repo.update_pickup_address(shipment_id, &propagation.actual).await?;
        info!(
            shipment_id = %shipment_id,
            address_id = %propagation.actual.id,
            previous_address_id = ?propagation.original.as_ref().map(|a| a.id),
            "shipment_pickup_address_updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_item::domain::{MoveStatus, ReServiceCode, ShipmentStatus, ShipmentType};
    use crate::service_item::repository::mock::InMemoryStore;

    fn input(street: &str) -> AddressInput {
        AddressInput {
            street_address_1: street.into(),
            street_address_2: None,
            city: "Fairfax".into(),
            state: "VA".into(),
            postal_code: "22030".into(),
        }
    }

    fn shipment_with_pickup(store: &InMemoryStore, street: &str) -> Shipment {
        let pickup = Address { id: Uuid::new_v4(), value: input(street) };
        store.insert_address(pickup.clone());
        let s = Shipment {
            id: Uuid::new_v4(),
            move_id: Uuid::new_v4(),
            move_status: MoveStatus::Approved,
            shipment_type: ShipmentType::Hhg,
            status: ShipmentStatus::Approved,
            pickup_address: Some(pickup),
            destination_address: None,
            prime_estimated_weight: None,
            requested_pickup_date: None,
        };
        store.insert_shipment(s.clone());
        s
    }

    #[tokio::test]
    async fn same_address_changes_nothing() {
        let store = InMemoryStore::default();
        let s = shipment_with_pickup(&store, "1 Main St");
        let propagator = AddressPropagator::new(&store);
        let p = propagator.resolve(&s, &input(" 1  main st ")).await.unwrap();
        assert!(!p.pickup_changed);
        assert_eq!(Some(p.actual.clone()), s.pickup_address);
        assert_eq!(store.address_count(), 1);
        propagator.apply(s.id, &p).await.unwrap();
        assert_eq!(store.shipment(s.id).unwrap().pickup_address, s.pickup_address);
    }

    #[tokio::test]
    async fn new_address_moves_pickup_and_keeps_original() {
        let store = InMemoryStore::default();
        let s = shipment_with_pickup(&store, "1 Main St");
        let propagator = AddressPropagator::new(&store);
        let p = propagator.resolve(&s, &input("7 Elm St")).await.unwrap();
        assert!(p.pickup_changed);
        assert_eq!(p.original, s.pickup_address);
        assert_eq!(store.address_count(), 2);

        propagator.apply(s.id, &p).await.unwrap();
        assert_eq!(store.shipment(s.id).unwrap().pickup_address, Some(p.actual.clone()));

        let first = OriginSit {
            re_service_code: ReServiceCode::DOFSIT,
            reason: "r".into(),
            sit_postal_code: Some("22030".into()),
            sit_entry_date: None,
            sit_departure_date: None,
            sit_hhg_actual_origin: Some(p.actual.clone()),
            sit_hhg_original_origin: p.original.clone(),
        };
        let companion = p.companion(&first).unwrap();
        assert_eq!(companion.re_service_code, ReServiceCode::DOPSIT);
        assert_eq!(companion.sit_hhg_actual_origin, first.sit_hhg_actual_origin);
    }
}
