use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::mto_shipment;

/// One wide row per service item. Which optional columns are populated depends on
/// `re_service_code`; the service layer maps rows onto its typed variants.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mto_service_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub move_id: Uuid,
    pub mto_shipment_id: Uuid,
    pub re_service_code: String,
    pub status: String,
    pub reason: Option<String>,
    pub rejection_reason: Option<String>,
    pub reference_id: Option<String>,
    pub description: Option<String>,
    pub sit_postal_code: Option<String>,
    pub sit_entry_date: Option<Date>,
    pub sit_departure_date: Option<Date>,
    pub sit_origin_hhg_original_address_id: Option<Uuid>,
    pub sit_origin_hhg_actual_address_id: Option<Uuid>,
    pub sit_destination_final_address_id: Option<Uuid>,
    pub estimated_weight: Option<i32>,
    pub actual_weight: Option<i32>,
    pub standalone_crate: Option<bool>,
    pub external_crate: Option<bool>,
    pub pricing_estimate: Option<i64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Shipment }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Shipment => Entity::belongs_to(mto_shipment::Entity)
                .from(Column::MtoShipmentId)
                .to(mto_shipment::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUSES: [&str; 3] = ["SUBMITTED", "APPROVED", "REJECTED"];

/// Insert a fully populated row. The caller owns id and timestamps.
pub async fn insert<C: ConnectionTrait>(db: &C, row: Model) -> Result<Model, ModelError> {
    if !STATUSES.contains(&row.status.as_str()) {
        return Err(ModelError::Validation(format!("invalid service item status {:?}", row.status)));
    }
    if row.reason.as_deref().is_some_and(|r| r.trim().is_empty()) {
        return Err(ModelError::Validation("reason must be nil or not blank".into()));
    }
    if row.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
        return Err(ModelError::Validation("description must be nil or not blank".into()));
    }
    let am = ActiveModel {
        id: Set(row.id),
        move_id: Set(row.move_id),
        mto_shipment_id: Set(row.mto_shipment_id),
        re_service_code: Set(row.re_service_code),
        status: Set(row.status),
        reason: Set(row.reason),
        rejection_reason: Set(row.rejection_reason),
        reference_id: Set(row.reference_id),
        description: Set(row.description),
        sit_postal_code: Set(row.sit_postal_code),
        sit_entry_date: Set(row.sit_entry_date),
        sit_departure_date: Set(row.sit_departure_date),
        sit_origin_hhg_original_address_id: Set(row.sit_origin_hhg_original_address_id),
        sit_origin_hhg_actual_address_id: Set(row.sit_origin_hhg_actual_address_id),
        sit_destination_final_address_id: Set(row.sit_destination_final_address_id),
        estimated_weight: Set(row.estimated_weight),
        actual_weight: Set(row.actual_weight),
        standalone_crate: Set(row.standalone_crate),
        external_crate: Set(row.external_crate),
        pricing_estimate: Set(row.pricing_estimate),
        created_at: Set(row.created_at),
        updated_at: Set(row.updated_at),
    };
    Ok(am.insert(db).await?)
}

/// Items on a shipment whose code is one of `codes`, oldest first.
pub async fn find_by_shipment_and_codes<C: ConnectionTrait>(db: &C, shipment_id: Uuid, codes: &[&str]) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::MtoShipmentId.eq(shipment_id))
        .filter(Column::ReServiceCode.is_in(codes.iter().copied()))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn set_pricing_estimate<C: ConnectionTrait>(db: &C, id: Uuid, cents: i64) -> Result<Model, ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::Validation("mto_service_item not found".into()))?
        .into();
    found.pricing_estimate = Set(Some(cents));
    found.updated_at = Set(Utc::now().into());
    Ok(found.update(db).await?)
}
