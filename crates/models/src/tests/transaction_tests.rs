use anyhow::Result;
use chrono::Utc;
use sea_orm::{EntityTrait, TransactionTrait};
use uuid::Uuid;

use super::{setup_test_db, unique_locator};
use crate::address::{self, NewAddress};
use crate::errors::ModelError;
use crate::mto_shipment::{self, NewShipment};
use crate::{move_task_order, mto_service_item};

fn first_day(move_id: Uuid, shipment_id: Uuid, status: &str) -> mto_service_item::Model {
    let now = Utc::now().into();
    mto_service_item::Model {
        id: Uuid::new_v4(),
        move_id,
        mto_shipment_id: shipment_id,
        re_service_code: "DOFSIT".to_string(),
        status: status.to_string(),
        reason: Some("storage".into()),
        rejection_reason: None,
        reference_id: None,
        description: None,
        sit_postal_code: Some("22030".into()),
        sit_entry_date: None,
        sit_departure_date: None,
        sit_origin_hhg_original_address_id: None,
        sit_origin_hhg_actual_address_id: None,
        sit_destination_final_address_id: None,
        estimated_weight: None,
        actual_weight: None,
        standalone_crate: None,
        external_crate: None,
        pricing_estimate: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_duplicate_fingerprint_is_conflict() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let txn = db.begin().await?;

    let fp = format!("dup|{}", Uuid::new_v4());
    let new = NewAddress {
        street_address_1: "1 Main St",
        street_address_2: None,
        city: "Fairfax",
        state: "VA",
        postal_code: "22030",
        fingerprint: &fp,
    };
    address::create(&txn, new.clone()).await?;
    let second = address::create(&txn, new).await;
    assert!(matches!(second, Err(ModelError::Conflict(_))), "got {:?}", second);

    txn.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn test_find_or_insert_reuses_existing_fingerprint() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let txn = db.begin().await?;

    let fp = format!("reuse|{}", Uuid::new_v4());
    let new = NewAddress {
        street_address_1: "1 Main St",
        street_address_2: None,
        city: "Fairfax",
        state: "VA",
        postal_code: "22030",
        fingerprint: &fp,
    };
    let first = address::find_or_insert(&txn, new.clone()).await?;
    let second = address::find_or_insert(&txn, new).await?;
    assert_eq!(first.id, second.id);
    // the transaction is still usable after the second call
    assert!(address::find_by_fingerprint(&txn, &fp).await?.is_some());

    txn.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn test_second_first_day_sit_is_conflict() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let txn = db.begin().await?;

    let mv = move_task_order::create(&txn, &unique_locator(), "APPROVED").await?;
    let shipment = mto_shipment::create(&txn, NewShipment {
        move_id: mv.id,
        shipment_type: "HHG",
        status: "APPROVED",
        ..Default::default()
    }).await?;
    mto_service_item::insert(&txn, first_day(mv.id, shipment.id, "SUBMITTED")).await?;
    let second = mto_service_item::insert(&txn, first_day(mv.id, shipment.id, "SUBMITTED")).await;
    assert!(matches!(second, Err(ModelError::Conflict(_))), "got {:?}", second);

    txn.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn test_rollback_discards_rows() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let txn = db.begin().await?;
    let mv = move_task_order::create(&txn, &unique_locator(), "APPROVED").await?;
    txn.rollback().await?;

    assert!(move_task_order::Entity::find_by_id(mv.id).one(&db).await?.is_none());
    Ok(())
}
