use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::move_task_order;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mto_shipments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub move_id: Uuid,
    pub shipment_type: String,
    pub status: String,
    pub pickup_address_id: Option<Uuid>,
    pub destination_address_id: Option<Uuid>,
    pub prime_estimated_weight: Option<i32>,
    pub requested_pickup_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Move }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Move => Entity::belongs_to(move_task_order::Entity)
                .from(Column::MoveId)
                .to(move_task_order::Column::Id)
                .into(),
        }
    }
}

impl Related<move_task_order::Entity> for Entity {
    fn to() -> RelationDef { Relation::Move.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new shipment row.
#[derive(Clone, Debug, Default)]
pub struct NewShipment<'a> {
    pub move_id: Uuid,
    pub shipment_type: &'a str,
    pub status: &'a str,
    pub pickup_address_id: Option<Uuid>,
    pub destination_address_id: Option<Uuid>,
    pub prime_estimated_weight: Option<i32>,
    pub requested_pickup_date: Option<Date>,
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewShipment<'_>) -> Result<Model, ModelError> {
    if new.shipment_type.trim().is_empty() { return Err(ModelError::Validation("shipment type required".into())); }
    if let Some(w) = new.prime_estimated_weight {
        if w <= 0 { return Err(ModelError::Validation("prime estimated weight must be positive".into())); }
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        move_id: Set(new.move_id),
        shipment_type: Set(new.shipment_type.to_string()),
        status: Set(new.status.to_string()),
        pickup_address_id: Set(new.pickup_address_id),
        destination_address_id: Set(new.destination_address_id),
        prime_estimated_weight: Set(new.prime_estimated_weight),
        requested_pickup_date: Set(new.requested_pickup_date),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

/// Load a shipment together with its owning move.
pub async fn find_with_move<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<(Model, Option<move_task_order::Model>)>, ModelError> {
    Ok(Entity::find_by_id(id).find_also_related(move_task_order::Entity).one(db).await?)
}

pub async fn set_pickup_address<C: ConnectionTrait>(db: &C, id: Uuid, address_id: Uuid) -> Result<Model, ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ModelError::Validation("mto_shipment not found".into()))?
        .into();
    found.pickup_address_id = Set(Some(address_id));
    found.updated_at = Set(Utc::now().into());
    Ok(found.update(db).await?)
}
