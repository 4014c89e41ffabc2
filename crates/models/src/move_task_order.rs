use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moves")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub locator: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUSES: [&str; 5] = ["DRAFT", "SUBMITTED", "APPROVED", "CANCELED", "APPROVALS REQUESTED"];

pub async fn create<C: ConnectionTrait>(db: &C, locator: &str, status: &str) -> Result<Model, ModelError> {
    if locator.trim().is_empty() { return Err(ModelError::Validation("locator required".into())); }
    if !STATUSES.contains(&status) { return Err(ModelError::Validation(format!("invalid move status {status:?}"))); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        locator: Set(locator.to_string()),
        status: Set(status.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}
