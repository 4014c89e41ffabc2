use sea_orm::{entity::prelude::*, sea_query::OnConflict, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Address rows are never updated; `fingerprint` is the normalized content and is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub street_address_1: String,
    pub street_address_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[sea_orm(unique)]
    pub fingerprint: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a new address row.
#[derive(Clone, Debug)]
pub struct NewAddress<'a> {
    pub street_address_1: &'a str,
    pub street_address_2: Option<&'a str>,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    pub fingerprint: &'a str,
}

pub fn validate_postal_code(p: &str) -> Result<(), ModelError> {
    let digits = p.chars().filter(|c| c.is_ascii_digit()).count();
    if digits != 5 && digits != 9 {
        return Err(ModelError::Validation(format!("postal code {p:?} must have 5 or 9 digits")));
    }
    Ok(())
}

pub async fn find_by_fingerprint<C: ConnectionTrait>(db: &C, fingerprint: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Fingerprint.eq(fingerprint)).one(db).await?)
}

pub async fn find_by_ids<C: ConnectionTrait>(db: &C, ids: Vec<Uuid>) -> Result<Vec<Model>, ModelError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Entity::find().filter(Column::Id.is_in(ids)).all(db).await?)
}

fn new_active_model(new: &NewAddress<'_>) -> Result<ActiveModel, ModelError> {
    if new.street_address_1.trim().is_empty() { return Err(ModelError::Validation("street address required".into())); }
    if new.city.trim().is_empty() { return Err(ModelError::Validation("city required".into())); }
    validate_postal_code(new.postal_code)?;
    Ok(ActiveModel {
        id: Set(Uuid::new_v4()),
        street_address_1: Set(new.street_address_1.to_string()),
        street_address_2: Set(new.street_address_2.map(str::to_string)),
        city: Set(new.city.to_string()),
        state: Set(new.state.to_string()),
        postal_code: Set(new.postal_code.to_string()),
        fingerprint: Set(new.fingerprint.to_string()),
        created_at: Set(Utc::now().into()),
    })
}

/// Strict insert; a second row with the same fingerprint is a `Conflict`.
pub async fn create<C: ConnectionTrait>(db: &C, new: NewAddress<'_>) -> Result<Model, ModelError> {
    Ok(new_active_model(&new)?.insert(db).await?)
}

/// Insert unless a row with the same fingerprint exists, then return the stored row.
///
/// A concurrent insert of the same fingerprint waits on the unique index and then
/// does nothing, so the surrounding transaction stays usable.
pub async fn find_or_insert<C: ConnectionTrait>(db: &C, new: NewAddress<'_>) -> Result<Model, ModelError> {
    if let Some(found) = find_by_fingerprint(db, new.fingerprint).await? {
        return Ok(found);
    }
    Entity::insert(new_active_model(&new)?)
        .on_conflict(OnConflict::column(Column::Fingerprint).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    find_by_fingerprint(db, new.fingerprint)
        .await?
        .ok_or_else(|| ModelError::Validation(format!("address {:?} vanished after insert", new.fingerprint)))
}
