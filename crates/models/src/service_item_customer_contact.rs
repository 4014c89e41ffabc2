use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::mto_service_item;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mto_service_item_customer_contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub mto_service_item_id: Uuid,
    pub contact_type: String,
    pub date_of_contact: Date,
    pub time_military: String,
    pub first_available_delivery_date: Date,
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
    contact_type: &str,
    date_of_contact: Date,
    time_military: &str,
    first_available_delivery_date: Date,
) -> Result<Model, ModelError> {
    if contact_type != "FIRST" && contact_type != "SECOND" {
        return Err(ModelError::Validation(format!("invalid customer contact type {contact_type:?}")));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        mto_service_item_id: Set(service_item_id),
        contact_type: Set(contact_type.to_string()),
        date_of_contact: Set(date_of_contact),
        time_military: Set(time_military.to_string()),
        first_available_delivery_date: Set(first_available_delivery_date),
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
