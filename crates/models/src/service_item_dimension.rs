use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::mto_service_item;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mto_service_item_dimensions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub mto_service_item_id: Uuid,
    pub dimension_type: String,
    pub length_thousandth_inches: i32,
    pub width_thousandth_inches: i32,
    pub height_thousandth_inches: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ServiceItem }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceItem => Entity::belongs_to(mto_service_item::Entity)
                .from(Column::MtoServiceItemId)
                .to(mto_service_item::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    service_item_id: Uuid,
    dimension_type: &str,
    length: i32,
    width: i32,
    height: i32,
) -> Result<Model, ModelError> {
    if dimension_type != "ITEM" && dimension_type != "CRATE" {
        return Err(ModelError::Validation(format!("invalid dimension type {dimension_type:?}")));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        mto_service_item_id: Set(service_item_id),
        dimension_type: Set(dimension_type.to_string()),
        length_thousandth_inches: Set(length),
        width_thousandth_inches: Set(width),
        height_thousandth_inches: Set(height),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_service_items<C: ConnectionTrait>(db: &C, ids: Vec<Uuid>) -> Result<Vec<Model>, ModelError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Entity::find().filter(Column::MtoServiceItemId.is_in(ids)).all(db).await?)
}
