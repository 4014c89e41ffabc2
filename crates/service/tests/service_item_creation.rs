//! End-to-end creation scenarios against the in-memory store.

use std::sync::Arc;

use chrono::NaiveDate;
use common::units::{Cents, Pound};
use service::service_item::domain::*;
use service::service_item::features::CreatableCodes;
use service::service_item::pricing::mock::{FailingPricer, FixedDistance, PerMilePricer};
use service::service_item::repository::mock::InMemoryStore;
use service::service_item::ServiceItemCreator;
use service::ServiceError;
use uuid::Uuid;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn address(street: &str, zip: &str) -> AddressInput {
    AddressInput {
        street_address_1: street.into(),
        street_address_2: None,
        city: "Beverly Hills".into(),
        state: "CA".into(),
        postal_code: zip.into(),
    }
}

fn seed_shipment(store: &InMemoryStore, shipment_type: ShipmentType, move_status: MoveStatus) -> Shipment {
    let pickup = Address { id: Uuid::new_v4(), value: address("1 Pickup Ln", "90210") };
    let destination = Address { id: Uuid::new_v4(), value: address("2 Dest Ave", "78701") };
    store.insert_address(pickup.clone());
    store.insert_address(destination.clone());
    let shipment = Shipment {
        id: Uuid::new_v4(),
        move_id: Uuid::new_v4(),
        move_status,
        shipment_type,
        status: ShipmentStatus::Approved,
        pickup_address: Some(pickup),
        destination_address: Some(destination),
        prime_estimated_weight: None,
        requested_pickup_date: None,
    };
    store.insert_shipment(shipment.clone());
    shipment
}

fn setup() -> (Arc<InMemoryStore>, Shipment, ServiceItemCreator<InMemoryStore, CreatableCodes>) {
    let store = Arc::new(InMemoryStore::default());
    let shipment = seed_shipment(&store, ShipmentType::Hhg, MoveStatus::Approved);
    let creator = ServiceItemCreator::new(store.clone(), CreatableCodes::all());
    (store, shipment, creator)
}

fn dofsit(actual: AddressInput) -> ServiceItemDefinition {
    ServiceItemDefinition::OriginSit(OriginSitDefinition {
        re_service_code: Some(ReServiceCode::DOFSIT),
        reason: Some("lorem ipsum".into()),
        sit_postal_code: Some("00000".into()),
        sit_entry_date: Some(date(1)),
        sit_departure_date: None,
        sit_hhg_actual_origin: Some(actual),
    })
}

fn ddfsit() -> DestinationSitDefinition {
    DestinationSitDefinition {
        re_service_code: Some(ReServiceCode::DDFSIT),
        reason: Some("customer unavailable".into()),
        sit_entry_date: Some(date(10)),
        ..Default::default()
    }
}

#[tokio::test]
async fn dofsit_with_new_address_creates_companion_dopsit() {
    let (_store, shipment, creator) = setup();
    let items = creator
        .create_service_item(shipment.id, dofsit(address("177 Q st", "90210")))
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    let codes: Vec<_> = items.iter().map(|i| i.re_service_code()).collect();
    assert_eq!(codes, vec![ReServiceCode::DOFSIT, ReServiceCode::DOPSIT]);
    assert!(items.iter().all(|i| i.status == ServiceItemStatus::Submitted));
    assert!(items.iter().all(|i| i.details.sit_entry_date() == Some(date(1))));
    let origin = items[1].details.as_origin_sit().unwrap();
    assert_eq!(origin.reason, "lorem ipsum");
}

#[tokio::test]
async fn dofsit_round_trips_original_and_actual_addresses() {
    let (store, shipment, creator) = setup();
    let before = store.shipment(shipment.id).unwrap().pickup_address.unwrap();
    let actual = address("177 Q st", "90210");

    let items = creator.create_service_item(shipment.id, dofsit(actual.clone())).await.unwrap();

    let first = items[0].details.as_origin_sit().unwrap();
    assert_eq!(first.sit_hhg_original_origin.as_ref(), Some(&before));
    let after = store.shipment(shipment.id).unwrap().pickup_address.unwrap();
    assert!(after.value.same_as(&actual));
    assert_eq!(first.sit_hhg_actual_origin.as_ref(), Some(&after));
}

#[tokio::test]
async fn dofsit_at_current_pickup_creates_single_item() {
    let (store, shipment, creator) = setup();
    let pickup = shipment.pickup_address.clone().unwrap();
    let items = creator.create_service_item(shipment.id, dofsit(pickup.value.clone())).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(store.shipment(shipment.id).unwrap().pickup_address, Some(pickup));
    assert_eq!(store.address_count(), 2);
}

#[tokio::test]
async fn identical_actual_addresses_share_one_row() {
    let store = Arc::new(InMemoryStore::default());
    let first = seed_shipment(&store, ShipmentType::Hhg, MoveStatus::Approved);
    let second = seed_shipment(&store, ShipmentType::Hhg, MoveStatus::Approved);
    let creator = ServiceItemCreator::new(store.clone(), CreatableCodes::all());
    let before = store.address_count();

    let a = creator.create_service_item(first.id, dofsit(address("177 Q st", "90210"))).await.unwrap();
    let b = creator.create_service_item(second.id, dofsit(address("177  q st ", "90210"))).await.unwrap();

    assert_eq!(store.address_count(), before + 1);
    let actual = |items: &[ServiceItem]| items[0].details.as_origin_sit().unwrap().sit_hhg_actual_origin.clone().unwrap().id;
    assert_eq!(actual(&a), actual(&b));
}

#[tokio::test]
async fn doasit_without_first_day_is_not_found() {
    let (store, shipment, creator) = setup();
    let def = ServiceItemDefinition::OriginSit(OriginSitDefinition {
        re_service_code: Some(ReServiceCode::DOASIT),
        reason: Some("more days".into()),
        ..Default::default()
    });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
    assert!(store.service_items(shipment.id).is_empty());
}

#[tokio::test]
async fn doasit_after_dofsit_inherits_episode_fields() {
    let (_store, shipment, creator) = setup();
    creator.create_service_item(shipment.id, dofsit(address("177 Q st", "90210"))).await.unwrap();

    let def = ServiceItemDefinition::OriginSit(OriginSitDefinition {
        re_service_code: Some(ReServiceCode::DOASIT),
        reason: Some("more days".into()),
        ..Default::default()
    });
    let items = creator.create_service_item(shipment.id, def).await.unwrap();
    assert_eq!(items.len(), 1);
    let extra = items[0].details.as_origin_sit().unwrap();
    assert_eq!(extra.sit_entry_date, Some(date(1)));
    assert_eq!(extra.sit_postal_code.as_deref(), Some("00000"));
    assert!(extra.sit_hhg_actual_origin.is_some());
}

#[tokio::test]
async fn doasit_with_different_actual_address_is_invalid() {
    let (_store, shipment, creator) = setup();
    creator.create_service_item(shipment.id, dofsit(address("177 Q st", "90210"))).await.unwrap();

    let def = ServiceItemDefinition::OriginSit(OriginSitDefinition {
        re_service_code: Some(ReServiceCode::DOASIT),
        reason: Some("more days".into()),
        sit_hhg_actual_origin: Some(address("5 Other Rd", "90210")),
        ..Default::default()
    });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert_eq!(err.field_errors()[0].field, "sitHHGActualOrigin");
}

#[tokio::test]
async fn second_dofsit_is_conflict() {
    let (_store, shipment, creator) = setup();
    creator.create_service_item(shipment.id, dofsit(address("177 Q st", "90210"))).await.unwrap();
    let err = creator
        .create_service_item(shipment.id, dofsit(address("177 Q st", "90210")))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn ddfsit_without_reason_is_invalid() {
    let (_store, shipment, creator) = setup();
    let def = ServiceItemDefinition::DestinationSit(DestinationSitDefinition { reason: None, ..ddfsit() });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(err.field_errors().iter().any(|e| e.field == "reason"));
}

#[tokio::test]
async fn ddfsit_partial_contact_references_missing_date() {
    let (_store, shipment, creator) = setup();
    let def = ServiceItemDefinition::DestinationSit(DestinationSitDefinition {
        time_military_1: Some("0400Z".into()),
        ..ddfsit()
    });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert!(err.field_errors().iter().any(|e| e.field == "dateOfContact1"));
}

#[tokio::test]
async fn ddfsit_takes_destination_as_final_address() {
    let (_store, shipment, creator) = setup();
    let def = ServiceItemDefinition::DestinationSit(DestinationSitDefinition {
        date_of_contact_1: Some(date(2)),
        time_military_1: Some("1330Z".into()),
        first_available_delivery_date_1: Some(date(3)),
        ..ddfsit()
    });
    let items = creator.create_service_item(shipment.id, def).await.unwrap();
    let dest = items[0].details.as_destination_sit().unwrap();
    assert_eq!(dest.sit_destination_final_address, shipment.destination_address);
    assert_eq!(dest.customer_contacts.len(), 1);

    let extra = ServiceItemDefinition::DestinationSit(DestinationSitDefinition {
        re_service_code: Some(ReServiceCode::DDASIT),
        ..Default::default()
    });
    let items = creator.create_service_item(shipment.id, extra).await.unwrap();
    let dest = items[0].details.as_destination_sit().unwrap();
    assert_eq!(dest.sit_entry_date, Some(date(10)));
    assert_eq!(dest.reason.as_deref(), Some("customer unavailable"));
}

#[tokio::test]
async fn ppm_shipment_is_rejected_with_shipment_id() {
    let store = Arc::new(InMemoryStore::default());
    let shipment = seed_shipment(&store, ShipmentType::Ppm, MoveStatus::Approved);
    let creator = ServiceItemCreator::new(store, CreatableCodes::all());
    let err = creator
        .create_service_item(shipment.id, dofsit(address("177 Q st", "90210")))
        .await
        .unwrap_err();
    let errors = err.field_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains(&shipment.id.to_string()));
}

#[tokio::test]
async fn unknown_shipment_is_not_found() {
    let (_store, _shipment, creator) = setup();
    let def = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::MS) });
    let err = creator.create_service_item(Uuid::new_v4(), def).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.code(), 1003);
}

#[tokio::test]
async fn unapproved_move_is_conflict() {
    let store = Arc::new(InMemoryStore::default());
    let shipment = seed_shipment(&store, ShipmentType::Hhg, MoveStatus::Submitted);
    let creator = ServiceItemCreator::new(store, CreatableCodes::all());
    let def = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::MS) });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn code_outside_configuration_is_invalid() {
    let store = Arc::new(InMemoryStore::default());
    let shipment = seed_shipment(&store, ShipmentType::Hhg, MoveStatus::ApprovalsRequested);
    let creator = ServiceItemCreator::new(store, CreatableCodes::only([ReServiceCode::DOFSIT]));
    let def = ServiceItemDefinition::InternationalCrating(CratingDefinition {
        re_service_code: Some(ReServiceCode::ICRT),
        description: Some("statue".into()),
        item: Some(Dimension::from_inches(10, 10, 10)),
        crate_dims: Some(Dimension::from_inches(12, 12, 12)),
        ..Default::default()
    });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert_eq!(err.field_errors()[0].field, "reServiceCode");
}

#[tokio::test]
async fn direct_dopsit_request_is_invalid() {
    let (_store, shipment, creator) = setup();
    let def = ServiceItemDefinition::OriginSit(OriginSitDefinition {
        re_service_code: Some(ReServiceCode::DOPSIT),
        reason: Some("pickup".into()),
        ..Default::default()
    });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert_eq!(err.field_errors()[0].field, "reServiceCode");
}

#[tokio::test]
async fn crate_smaller_than_item_is_invalid() {
    let (store, shipment, creator) = setup();
    let def = ServiceItemDefinition::DomesticCrating(CratingDefinition {
        re_service_code: Some(ReServiceCode::DCRT),
        description: Some("grandfather clock".into()),
        item: Some(Dimension::from_inches(10, 80, 10)),
        crate_dims: Some(Dimension::from_inches(12, 70, 9)),
        ..Default::default()
    });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["crate.width", "crate.height"]);
    assert!(store.service_items(shipment.id).is_empty());
}

#[tokio::test]
async fn storage_failure_surfaces_as_query_error() {
    let (store, shipment, creator) = setup();
    store.fail_writes(true);
    let def = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::MS) });
    let err = creator.create_service_item(shipment.id, def).await.unwrap_err();
    assert!(matches!(err, ServiceError::Query { .. }));
    assert_eq!(err.to_string(), "query error while accessing mto_service_item");
}

#[tokio::test]
async fn priced_codes_get_estimates_when_shipment_has_inputs() {
    let store = Arc::new(InMemoryStore::default());
    let mut shipment = seed_shipment(&store, ShipmentType::Hhg, MoveStatus::Approved);
    shipment.prime_estimated_weight = Some(Pound(4_000));
    shipment.requested_pickup_date = Some(date(1));
    store.insert_shipment(shipment.clone());

    let pricer = PerMilePricer { distance: FixedDistance(250), cents_per_mile: 120 };
    let creator = ServiceItemCreator::new(store.clone(), CreatableCodes::all()).with_pricer(Arc::new(pricer));

    let dlh = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::DLH) });
    let items = creator.create_service_item(shipment.id, dlh).await.unwrap();
    assert_eq!(items[0].pricing_estimate, Some(Cents(30_000)));
    assert_eq!(store.service_items(shipment.id)[0].pricing_estimate, Some(Cents(30_000)));

    let ms = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::MS) });
    let items = creator.create_service_item(shipment.id, ms).await.unwrap();
    assert_eq!(items[0].pricing_estimate, None);
}

#[tokio::test]
async fn pricing_failure_is_reported() {
    let store = Arc::new(InMemoryStore::default());
    let mut shipment = seed_shipment(&store, ShipmentType::Hhg, MoveStatus::Approved);
    shipment.prime_estimated_weight = Some(Pound(4_000));
    shipment.requested_pickup_date = Some(date(1));
    store.insert_shipment(shipment.clone());
    let creator = ServiceItemCreator::new(store, CreatableCodes::all()).with_pricer(Arc::new(FailingPricer));

    let dop = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::DOP) });
    let err = creator.create_service_item(shipment.id, dop).await.unwrap_err();
    assert!(matches!(err, ServiceError::Pricing { code: ReServiceCode::DOP, .. }));
    assert_eq!(err.code(), 1300);
}

#[tokio::test]
async fn shipment_without_pricing_inputs_is_not_priced() {
    let (_store, shipment, _) = setup();
    let store = Arc::new(InMemoryStore::default());
    store.insert_shipment(shipment.clone());
    let creator = ServiceItemCreator::new(store, CreatableCodes::all()).with_pricer(Arc::new(FailingPricer));
    let dlh = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::DLH) });
    let items = creator.create_service_item(shipment.id, dlh).await.unwrap();
    assert_eq!(items[0].pricing_estimate, None);
}
