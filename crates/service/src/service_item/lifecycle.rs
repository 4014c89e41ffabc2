//! SIT episode rules: which items must already exist before a SIT code can be
//! created, and what a new item inherits from them.
//!
//! The episode is never held in memory. It is re-derived on every request from
//! the persisted items of the shipment, so it survives restarts and is shared by
//! every process writing to the same database.

use strum::Display;
use tracing::{debug, warn};
use uuid::Uuid;

use super::domain::{ReServiceCode, ServiceItem, ServiceItemDetails, Shipment, SitSide};
use super::repository::ServiceItemRepository;
use super::validation::ValidatedDefinition;
use crate::errors::ServiceError;

/// The SIT codes of one side of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CodeFamily {
    OriginSit,
    DestinationSit,
}

const ORIGIN_SIT_CODES: [ReServiceCode; 4] =
    [ReServiceCode::DOFSIT, ReServiceCode::DOASIT, ReServiceCode::DOPSIT, ReServiceCode::DOSFSC];
const DESTINATION_SIT_CODES: [ReServiceCode; 4] =
    [ReServiceCode::DDFSIT, ReServiceCode::DDASIT, ReServiceCode::DDDSIT, ReServiceCode::DDSFSC];

impl CodeFamily {
    pub fn of(code: ReServiceCode) -> Option<Self> {
        code.sit_side().map(|side| match side {
            SitSide::Origin => Self::OriginSit,
            SitSide::Destination => Self::DestinationSit,
        })
    }

    pub fn codes(self) -> &'static [ReServiceCode] {
        match self {
            Self::OriginSit => &ORIGIN_SIT_CODES,
            Self::DestinationSit => &DESTINATION_SIT_CODES,
        }
    }

    pub fn contains(self, code: ReServiceCode) -> bool {
        self.codes().contains(&code)
    }

    pub fn first_day(self) -> ReServiceCode {
        match self {
            Self::OriginSit => ReServiceCode::DOFSIT,
            Self::DestinationSit => ReServiceCode::DDFSIT,
        }
    }

    pub fn pickup_or_delivery(self) -> ReServiceCode {
        match self {
            Self::OriginSit => ReServiceCode::DOPSIT,
            Self::DestinationSit => ReServiceCode::DDDSIT,
        }
    }
}

/// Where a shipment's SIT episode stands on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SitEpisodeState {
    None,
    FirstDay,
    AdditionalDays,
    PickupOrDeliveryOccurred,
    Departed,
}

impl SitEpisodeState {
    /// Derive the state from persisted items of one family. Rejected items are ignored.
    pub fn from_items(family: CodeFamily, items: &[ServiceItem]) -> Self {
        let live: Vec<&ServiceItem> = items
            .iter()
            .filter(|i| !i.is_rejected() && family.contains(i.re_service_code()))
            .collect();
        let has = |code: ReServiceCode| live.iter().any(|i| i.re_service_code() == code);

        if live.iter().any(|i| i.details.sit_departure_date().is_some()) {
            Self::Departed
        } else if has(family.pickup_or_delivery()) {
            Self::PickupOrDeliveryOccurred
        } else if live.iter().any(|i| i.re_service_code().is_additional_day_sit()) {
            Self::AdditionalDays
        } else if has(family.first_day()) {
            Self::FirstDay
        } else {
            Self::None
        }
    }
}

/// The item spawned alongside a first-day SIT item when its actual address moves the pickup.
pub fn companion_code(code: ReServiceCode) -> Option<ReServiceCode> {
    match code {
        ReServiceCode::DOFSIT => Some(ReServiceCode::DOPSIT),
        _ => None,
    }
}

pub struct SitLifecycleResolver<'a, R: ?Sized> {
    repo: &'a R,
}

impl<'a, R: ServiceItemRepository + ?Sized> SitLifecycleResolver<'a, R> {
    pub fn new(repo: &'a R) -> Self { Self { repo } }

    /// The live item an additional-day item hangs off: the first-day item, or
    /// failing that the pickup/delivery item created with it.
    pub async fn predecessor(&self, shipment_id: Uuid, family: CodeFamily) -> Result<Option<ServiceItem>, ServiceError> {
        let items = self.repo.find_by_shipment_and_code_family(shipment_id, family).await?;
        let live = |code: ReServiceCode| items.iter().find(|i| !i.is_rejected() && i.re_service_code() == code).cloned();
        Ok(live(family.first_day()).or_else(|| live(family.pickup_or_delivery())))
    }

    pub async fn has_approved_predecessor(&self, shipment_id: Uuid, family: CodeFamily) -> Result<bool, ServiceError> {
        Ok(self.predecessor(shipment_id, family).await?.is_some())
    }

    /// Apply ordering rules to a validated definition and fill in what it inherits.
    pub async fn resolve(&self, shipment: &Shipment, mut validated: ValidatedDefinition) -> Result<ValidatedDefinition, ServiceError> {
        let code = validated.re_service_code();
        if !code.is_manually_creatable() {
            return Err(ServiceError::invalid(
                "reServiceCode",
                format!("{code} cannot be created directly; it is produced by its SIT episode"),
            ));
        }
        let Some(family) = CodeFamily::of(code) else {
            return Ok(validated);
        };

        if code.is_first_day_sit() {
            let items = self.repo.find_by_shipment_and_code_family(shipment.id, family).await?;
            let state = SitEpisodeState::from_items(family, &items);
            debug!(shipment_id = %shipment.id, family = %family, state = %state, "sit_episode_state");
            if items.iter().any(|i| !i.is_rejected() && i.re_service_code() == code) {
                return Err(ServiceError::Conflict(format!("{code} already exists for shipment {}", shipment.id)));
            }
            if let ServiceItemDetails::DestinationSit(dest) = &mut validated.details {
                dest.sit_destination_final_address = shipment.destination_address.clone();
            }
            return Ok(validated);
        }

        if code.is_additional_day_sit() {
            let Some(predecessor) = self.predecessor(shipment.id, family).await? else {
                warn!(shipment_id = %shipment.id, requested = %code, missing = %family.first_day(), "sit_prerequisite_missing");
                return Err(ServiceError::NotFound(format!(
                    "{} for shipment {} must exist before {code} can be created",
                    family.first_day(),
                    shipment.id
                )));
            };
            inherit(&mut validated, &predecessor)?;
        }
        Ok(validated)
    }
}

fn inherit(validated: &mut ValidatedDefinition, predecessor: &ServiceItem) -> Result<(), ServiceError> {
    match (&mut validated.details, &predecessor.details) {
        (ServiceItemDetails::OriginSit(item), ServiceItemDetails::OriginSit(first)) => {
            if let (Some(requested), Some(recorded)) = (&validated.actual_origin, &first.sit_hhg_actual_origin) {
                if !requested.same_as(&recorded.value) {
                    return Err(ServiceError::invalid(
                        "sitHHGActualOrigin",
                        format!("sitHHGActualOrigin must match the actual origin of {}", first.re_service_code),
                    ));
                }
            }
            item.sit_entry_date = first.sit_entry_date;
            item.sit_departure_date = first.sit_departure_date.or(item.sit_departure_date);
            item.sit_postal_code = first.sit_postal_code.clone();
            item.sit_hhg_actual_origin = first.sit_hhg_actual_origin.clone();
            item.sit_hhg_original_origin = first.sit_hhg_original_origin.clone();
            validated.actual_origin = None;
        }
        (ServiceItemDetails::DestinationSit(item), ServiceItemDetails::DestinationSit(first)) => {
            item.sit_entry_date = first.sit_entry_date;
            item.sit_departure_date = first.sit_departure_date.or(item.sit_departure_date);
            item.reason = item.reason.take().or_else(|| first.reason.clone());
            item.sit_destination_final_address = first.sit_destination_final_address.clone();
        }
        _ => {}
    }

    match (validated.details.sit_entry_date(), validated.details.sit_departure_date()) {
        (Some(entry), Some(departure)) if departure < entry => Err(ServiceError::invalid(
            "sitDepartureDate",
            format!("sitDepartureDate {departure} cannot be before sitEntryDate {entry}"),
        )),
        _ => Ok(()),
    }
}
