use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use common::units::{Cents, Pound, ThousandthInches};
use models::{address, mto_service_item, mto_shipment, service_item_customer_contact, service_item_dimension};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use thiserror::Error;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::service_item::creator::{CreatorConfig, ServiceItemCreator};
use crate::service_item::domain::{
    Address, AddressInput, Basic, Crating, CustomerContact, DestinationSit, Dimension, DimensionType, OriginSit,
    ReServiceCode, ServiceItem, ServiceItemDefinition, ServiceItemDetails, Shipment, Shuttle, SitSide,
};
use crate::service_item::lifecycle::CodeFamily;
use crate::service_item::repository::{AddressRepository, ServiceItemRepository, ShipmentRepository};

/// Stored data that does not fit the domain model.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct IntegrityError(String);

/// Repositories over any SeaORM connection, usually one transaction per request.
pub struct SeaOrmServiceItemStore<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SeaOrmServiceItemStore<'a, C> {
    pub fn new(db: &'a C) -> Self { Self { db } }

    async fn load_addresses(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, Address>, ServiceError> {
        let rows = address::find_by_ids(self.db, ids)
            .await
            .map_err(|e| ServiceError::from_model("address", e))?;
        Ok(rows.into_iter().map(|a| (a.id, address_to_domain(a))).collect())
    }
}

fn parse<T>(entity: &str, value: &str) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| ServiceError::query(entity, e))
}

fn address_to_domain(a: address::Model) -> Address {
    Address {
        id: a.id,
        value: AddressInput {
            street_address_1: a.street_address_1,
            street_address_2: a.street_address_2,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
        },
    }
}

fn row_to_domain(
    row: mto_service_item::Model,
    addresses: &HashMap<Uuid, Address>,
    dimensions: &[service_item_dimension::Model],
    contacts: &[service_item_customer_contact::Model],
) -> Result<ServiceItem, ServiceError> {
    let code: ReServiceCode = parse("mto_service_item", &row.re_service_code)?;
    let address = |id: Option<Uuid>| id.and_then(|id| addresses.get(&id).cloned());

    let details = match code.sit_side() {
        Some(SitSide::Origin) => ServiceItemDetails::OriginSit(OriginSit {
            re_service_code: code,
            reason: row.reason.clone().unwrap_or_default(),
            sit_postal_code: row.sit_postal_code.clone(),
            sit_entry_date: row.sit_entry_date,
            sit_departure_date: row.sit_departure_date,
            sit_hhg_actual_origin: address(row.sit_origin_hhg_actual_address_id),
            sit_hhg_original_origin: address(row.sit_origin_hhg_original_address_id),
        }),
        Some(SitSide::Destination) => ServiceItemDetails::DestinationSit(DestinationSit {
            re_service_code: code,
            reason: row.reason.clone(),
            sit_entry_date: row.sit_entry_date,
            sit_departure_date: row.sit_departure_date,
            sit_destination_final_address: address(row.sit_destination_final_address_id),
            customer_contacts: contacts
                .iter()
                .filter(|c| c.mto_service_item_id == row.id)
                .map(|c| {
                    Ok(CustomerContact {
                        contact_type: parse("mto_service_item_customer_contact", &c.contact_type)?,
                        date_of_contact: c.date_of_contact,
                        time_military: c.time_military.clone(),
                        first_available_delivery_date: c.first_available_delivery_date,
                    })
                })
                .collect::<Result<Vec<_>, ServiceError>>()?,
        }),
        None if code.is_crating() => {
            let dimension = |kind: DimensionType| {
                dimensions
                    .iter()
                    .find(|d| d.mto_service_item_id == row.id && d.dimension_type == kind.to_string())
                    .map(|d| Dimension {
                        length: ThousandthInches(d.length_thousandth_inches),
                        width: ThousandthInches(d.width_thousandth_inches),
                        height: ThousandthInches(d.height_thousandth_inches),
                    })
                    .ok_or_else(|| {
                        ServiceError::query(
                            "mto_service_item_dimension",
                            IntegrityError(format!("{kind} dimension missing for service item {}", row.id)),
                        )
                    })
            };
            ServiceItemDetails::Crating(Crating {
                re_service_code: code,
                description: row.description.clone().unwrap_or_default(),
                item: dimension(DimensionType::Item)?,
                crate_dims: dimension(DimensionType::Crate)?,
                standalone_crate: row.standalone_crate,
                external_crate: row.external_crate,
            })
        }
        None if code.is_shuttle() => ServiceItemDetails::Shuttle(Shuttle {
            re_service_code: code,
            reason: row.reason.clone().unwrap_or_default(),
            estimated_weight: row.estimated_weight.map(Pound),
            actual_weight: row.actual_weight.map(Pound),
        }),
        None => ServiceItemDetails::Basic(Basic { re_service_code: code }),
    };

    Ok(ServiceItem {
        id: row.id,
        move_id: row.move_id,
        mto_shipment_id: row.mto_shipment_id,
        status: parse("mto_service_item", &row.status)?,
        rejection_reason: row.rejection_reason,
        reference_id: row.reference_id,
        pricing_estimate: row.pricing_estimate.map(Cents),
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
        details,
    })
}

/// Flatten a domain item into its row plus child dimension and contact values.
fn domain_to_rows(item: &ServiceItem) -> (mto_service_item::Model, Vec<(DimensionType, Dimension)>, Vec<CustomerContact>) {
    let mut row = mto_service_item::Model {
        id: item.id,
        move_id: item.move_id,
        mto_shipment_id: item.mto_shipment_id,
        re_service_code: item.re_service_code().to_string(),
        status: item.status.to_string(),
        reason: None,
        rejection_reason: item.rejection_reason.clone(),
        reference_id: item.reference_id.clone(),
        description: None,
        sit_postal_code: None,
        sit_entry_date: None,
        sit_departure_date: None,
        sit_origin_hhg_original_address_id: None,
        sit_origin_hhg_actual_address_id: None,
        sit_destination_final_address_id: None,
        estimated_weight: None,
        actual_weight: None,
        standalone_crate: None,
        external_crate: None,
        pricing_estimate: item.pricing_estimate.map(|c| c.0),
        created_at: item.created_at.into(),
        updated_at: item.updated_at.into(),
    };
    let mut dimensions = Vec::new();
    let mut contacts = Vec::new();

    match &item.details {
        ServiceItemDetails::OriginSit(d) => {
            row.reason = Some(d.reason.clone());
            row.sit_postal_code = d.sit_postal_code.clone();
            row.sit_entry_date = d.sit_entry_date;
            row.sit_departure_date = d.sit_departure_date;
            row.sit_origin_hhg_actual_address_id = d.sit_hhg_actual_origin.as_ref().map(|a| a.id);
            row.sit_origin_hhg_original_address_id = d.sit_hhg_original_origin.as_ref().map(|a| a.id);
        }
        ServiceItemDetails::DestinationSit(d) => {
            row.reason = d.reason.clone();
            row.sit_entry_date = d.sit_entry_date;
            row.sit_departure_date = d.sit_departure_date;
            row.sit_destination_final_address_id = d.sit_destination_final_address.as_ref().map(|a| a.id);
            contacts.extend(d.customer_contacts.iter().cloned());
        }
        ServiceItemDetails::Crating(d) => {
            row.description = Some(d.description.clone());
            row.standalone_crate = d.standalone_crate;
            row.external_crate = d.external_crate;
            dimensions.push((DimensionType::Item, d.item));
            dimensions.push((DimensionType::Crate, d.crate_dims));
        }
        ServiceItemDetails::Shuttle(d) => {
            row.reason = Some(d.reason.clone());
            row.estimated_weight = d.estimated_weight.map(|w| w.0);
            row.actual_weight = d.actual_weight.map(|w| w.0);
        }
        ServiceItemDetails::Basic(_) => {}
    }
    (row, dimensions, contacts)
}

#[async_trait::async_trait]
impl<'a, C: ConnectionTrait + Send + Sync> ShipmentRepository for SeaOrmServiceItemStore<'a, C> {
    async fn fetch(&self, id: Uuid) -> Result<Shipment, ServiceError> {
        let (row, move_row) = mto_shipment::find_with_move(self.db, id)
            .await
            .map_err(|e| ServiceError::from_model("mto_shipment", e))?
            .ok_or_else(|| ServiceError::not_found(&format!("mto_shipment {id}")))?;
        let move_row = move_row.ok_or_else(|| ServiceError::not_found(&format!("move for mto_shipment {id}")))?;

        let ids = [row.pickup_address_id, row.destination_address_id].into_iter().flatten().collect();
        let addresses = self.load_addresses(ids).await?;
        let address = |id: Option<Uuid>| id.and_then(|id| addresses.get(&id).cloned());

        Ok(Shipment {
            id: row.id,
            move_id: row.move_id,
            move_status: parse("moves", &move_row.status)?,
            shipment_type: parse("mto_shipment", &row.shipment_type)?,
            status: parse("mto_shipment", &row.status)?,
            pickup_address: address(row.pickup_address_id),
            destination_address: address(row.destination_address_id),
            prime_estimated_weight: row.prime_estimated_weight.map(Pound),
            requested_pickup_date: row.requested_pickup_date,
        })
    }

    async fn update_pickup_address(&self, shipment_id: Uuid, address: &Address) -> Result<(), ServiceError> {
        mto_shipment::set_pickup_address(self.db, shipment_id, address.id)
            .await
            .map_err(|e| ServiceError::from_model("mto_shipment", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<'a, C: ConnectionTrait + Send + Sync> ServiceItemRepository for SeaOrmServiceItemStore<'a, C> {
    async fn find_by_shipment_and_code_family(&self, shipment_id: Uuid, family: CodeFamily) -> Result<Vec<ServiceItem>, ServiceError> {
        let codes: Vec<String> = family.codes().iter().map(|c| c.to_string()).collect();
        let code_refs: Vec<&str> = codes.iter().map(String::as_str).collect();
        let rows = mto_service_item::find_by_shipment_and_codes(self.db, shipment_id, &code_refs)
            .await
            .map_err(|e| ServiceError::from_model("mto_service_item", e))?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let dimensions = service_item_dimension::find_by_service_items(self.db, ids.clone())
            .await
            .map_err(|e| ServiceError::from_model("mto_service_item_dimension", e))?;
        let contacts = service_item_customer_contact::find_by_service_items(self.db, ids)
            .await
            .map_err(|e| ServiceError::from_model("mto_service_item_customer_contact", e))?;
        let address_ids = rows
            .iter()
            .flat_map(|r| {
                [r.sit_origin_hhg_original_address_id, r.sit_origin_hhg_actual_address_id, r.sit_destination_final_address_id]
            })
            .flatten()
            .collect();
        let addresses = self.load_addresses(address_ids).await?;

        rows.into_iter()
            .map(|row| row_to_domain(row, &addresses, &dimensions, &contacts))
            .collect()
    }

    async fn create(&self, items: Vec<ServiceItem>) -> Result<Vec<ServiceItem>, ServiceError> {
        for item in &items {
            let (row, dimensions, contacts) = domain_to_rows(item);
            mto_service_item::insert(self.db, row)
                .await
                .map_err(|e| ServiceError::from_model("mto_service_item", e))?;
            for (kind, d) in dimensions {
                service_item_dimension::create(self.db, item.id, &kind.to_string(), d.length.0, d.width.0, d.height.0)
                    .await
                    .map_err(|e| ServiceError::from_model("mto_service_item_dimension", e))?;
            }
            for c in contacts {
                service_item_customer_contact::create(
                    self.db,
                    item.id,
                    &c.contact_type.to_string(),
                    c.date_of_contact,
                    &c.time_military,
                    c.first_available_delivery_date,
                )
                .await
                .map_err(|e| ServiceError::from_model("mto_service_item_customer_contact", e))?;
            }
        }
        Ok(items)
    }

    async fn set_pricing_estimate(&self, service_item_id: Uuid, estimate: Cents) -> Result<(), ServiceError> {
        mto_service_item::set_pricing_estimate(self.db, service_item_id, estimate.0)
            .await
            .map_err(|e| ServiceError::from_model("mto_service_item", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<'a, C: ConnectionTrait + Send + Sync> AddressRepository for SeaOrmServiceItemStore<'a, C> {
    async fn find_or_create(&self, input: &AddressInput) -> Result<Address, ServiceError> {
        let normalized = input.normalized();
        let fingerprint = normalized.fingerprint();
        let stored = address::find_or_insert(
            self.db,
            address::NewAddress {
                street_address_1: &normalized.street_address_1,
                street_address_2: normalized.street_address_2.as_deref(),
                city: &normalized.city,
                state: &normalized.state,
                postal_code: &normalized.postal_code,
                fingerprint: &fingerprint,
            },
        )
        .await
        .map_err(|e| ServiceError::from_model("address", e))?;
        Ok(address_to_domain(stored))
    }
}

/// Run one creation inside its own transaction: commit on success, roll back on any error.
#[instrument(skip(db, config, definition), fields(shipment_id = %shipment_id))]
pub async fn create_service_item_in_transaction(
    db: &DatabaseConnection,
    config: &CreatorConfig,
    shipment_id: Uuid,
    definition: ServiceItemDefinition,
) -> Result<Vec<ServiceItem>, ServiceError> {
    let txn = db.begin().await.map_err(|e| ServiceError::query("transaction", e))?;
    let result = {
        let store = Arc::new(SeaOrmServiceItemStore::new(&txn));
        let mut creator = ServiceItemCreator::new(store, config.features.clone());
        if let Some(pricer) = &config.pricer {
            creator = creator.with_pricer(pricer.clone());
        }
        creator.create_service_item(shipment_id, definition).await
    };

    match result {
        Ok(items) => {
            txn.commit()
                .await
                .map_err(|e| ServiceError::from_model("transaction", e.into()))?;
            Ok(items)
        }
        Err(err) => {
            if let Err(e) = txn.rollback().await {
                warn!(error = %e, "rollback_failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_item::domain::{BasicDefinition, CratingDefinition, OriginSitDefinition, ServiceItemStatus};
    use crate::service_item::pricing::mock::FailingPricer;
    use crate::test_support::get_db;
    use chrono::NaiveDate;
    use models::{move_task_order, mto_shipment::NewShipment};
    use sea_orm::EntityTrait;

    struct Seeded {
        shipment_id: Uuid,
        pickup_id: Uuid,
    }

    async fn seed(db: &DatabaseConnection, shipment_type: &str, move_status: &str, priced: bool) -> anyhow::Result<Seeded> {
        let locator = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        let mv = move_task_order::create(db, &locator, move_status).await?;
        let street = format!("{} Main St", Uuid::new_v4().as_u128() % 10_000);
        let pickup = AddressInput {
            street_address_1: street,
            street_address_2: None,
            city: "Fairfax".into(),
            state: "VA".into(),
            postal_code: "22030".into(),
        };
        let store = SeaOrmServiceItemStore::new(db);
        let pickup = store.find_or_create(&pickup).await?;
        let shipment = mto_shipment::create(db, NewShipment {
            move_id: mv.id,
            shipment_type,
            status: "APPROVED",
            pickup_address_id: Some(pickup.id),
            prime_estimated_weight: priced.then_some(4_000),
            requested_pickup_date: if priced { NaiveDate::from_ymd_opt(2024, 3, 1) } else { None },
            ..Default::default()
        })
        .await?;
        Ok(Seeded { shipment_id: shipment.id, pickup_id: pickup.id })
    }

    fn unique_address() -> AddressInput {
        AddressInput {
            street_address_1: format!("{} Storage Way", Uuid::new_v4()),
            street_address_2: None,
            city: "Beverly Hills".into(),
            state: "CA".into(),
            postal_code: "90210".into(),
        }
    }

    fn dofsit(actual: AddressInput) -> ServiceItemDefinition {
        ServiceItemDefinition::OriginSit(OriginSitDefinition {
            re_service_code: Some(ReServiceCode::DOFSIT),
            reason: Some("lorem ipsum".into()),
            sit_postal_code: Some("00000".into()),
            sit_entry_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            sit_departure_date: None,
            sit_hhg_actual_origin: Some(actual),
        })
    }

    #[tokio::test]
    async fn dofsit_commits_items_and_moves_pickup() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let seeded = seed(&db, "HHG", "APPROVED", false).await?;
        let actual = unique_address();

        let items = create_service_item_in_transaction(&db, &CreatorConfig::default(), seeded.shipment_id, dofsit(actual.clone())).await?;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.status == ServiceItemStatus::Submitted));

        let store = SeaOrmServiceItemStore::new(&db);
        let shipment = store.fetch(seeded.shipment_id).await?;
        let pickup = shipment.pickup_address.expect("pickup");
        assert!(pickup.value.same_as(&actual));

        let persisted = store.find_by_shipment_and_code_family(seeded.shipment_id, CodeFamily::OriginSit).await?;
        assert_eq!(persisted.len(), 2);
        let first = persisted
            .iter()
            .find(|i| i.re_service_code() == ReServiceCode::DOFSIT)
            .and_then(|i| i.details.as_origin_sit().cloned())
            .expect("DOFSIT persisted");
        assert_eq!(first.sit_hhg_original_origin.map(|a| a.id), Some(seeded.pickup_id));
        assert_eq!(first.sit_hhg_actual_origin.map(|a| a.id), Some(pickup.id));

        // second first-day item on the same shipment
        let err = create_service_item_in_transaction(&db, &CreatorConfig::default(), seeded.shipment_id, dofsit(unique_address()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)), "got {err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_find_or_create_reuses_one_address() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let input = unique_address();

        let txn1 = db.begin().await?;
        let first = SeaOrmServiceItemStore::new(&txn1).find_or_create(&input).await?;

        // second transaction blocks on the fingerprint index until the first commits
        let db2 = db.clone();
        let input2 = input.clone();
        let second = tokio::spawn(async move {
            let txn2 = db2.begin().await?;
            let found = SeaOrmServiceItemStore::new(&txn2).find_or_create(&input2).await?;
            txn2.commit().await?;
            anyhow::Ok(found)
        });
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        txn1.commit().await?;

        let second = second.await??;
        assert_eq!(second.id, first.id);
        let rows = address::find_by_ids(&db, vec![first.id]).await?;
        assert_eq!(rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn crating_round_trips_dimensions() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let seeded = seed(&db, "HHG", "APPROVED", false).await?;
        let crating = ServiceItemDefinition::DomesticCrating(CratingDefinition {
            re_service_code: Some(ReServiceCode::DCRT),
            description: Some("clock".into()),
            item: Some(Dimension::from_inches(10, 10, 10)),
            crate_dims: Some(Dimension::from_inches(12, 12, 12)),
            ..Default::default()
        });
        let items = create_service_item_in_transaction(&db, &CreatorConfig::default(), seeded.shipment_id, crating).await?;
        assert_eq!(items.len(), 1);
        assert!(mto_service_item::Entity::find_by_id(items[0].id).one(&db).await?.is_some());
        let dims = service_item_dimension::find_by_service_items(&db, vec![items[0].id]).await?;
        assert_eq!(dims.len(), 2);

        let err = create_service_item_in_transaction(
            &db,
            &CreatorConfig::default(),
            Uuid::new_v4(),
            ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::MS) }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn pricing_failure_rolls_back_created_rows() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let seeded = seed(&db, "HHG", "APPROVED", true).await?;
        let config = CreatorConfig::default().with_pricer(Arc::new(FailingPricer));
        let err = create_service_item_in_transaction(
            &db,
            &config,
            seeded.shipment_id,
            ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::DLH) }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Pricing { code: ReServiceCode::DLH, .. }));
        let rows = mto_service_item::find_by_shipment_and_codes(&db, seeded.shipment_id, &["DLH"]).await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn ppm_shipment_is_rejected_before_writes() -> anyhow::Result<()> {
        let Some(db) = get_db().await else { return Ok(()) };
        let seeded = seed(&db, "PPM", "APPROVED", false).await?;
        let err = create_service_item_in_transaction(&db, &CreatorConfig::default(), seeded.shipment_id, dofsit(unique_address()))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "mtoShipmentID");
        let items = mto_service_item::find_by_shipment_and_codes(&db, seeded.shipment_id, &["DOFSIT", "DOPSIT"]).await?;
        assert!(items.is_empty());
        Ok(())
    }
}
