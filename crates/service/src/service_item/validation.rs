//! Per-code field contracts for inbound service-item definitions.
//!
//! Validation never stops at the first problem: every violated rule becomes a
//! [`FieldError`] and the whole list is returned so a caller can show them at once.

use chrono::NaiveDate;
use common::units::Pound;

use super::domain::{
    AddressInput, Basic, BasicDefinition, Crating, CratingDefinition, CustomerContact, CustomerContactType,
    DestinationSit, DestinationSitDefinition, Dimension, OriginSit, OriginSitDefinition, ReServiceCode,
    ServiceItemDefinition, ServiceItemDetails, Shuttle, ShuttleDefinition, SitSide,
};
use super::geometry;
use crate::errors::FieldError;

pub const REASON_REQUIRED: &str = "reason is required in body.";

/// A definition that passed its field contract. Addresses are still raw input.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDefinition {
    pub details: ServiceItemDetails,
    pub actual_origin: Option<AddressInput>,
}

impl ValidatedDefinition {
    pub fn re_service_code(&self) -> ReServiceCode {
        self.details.re_service_code()
    }
}

/// Check `definition` against the contract of its code.
///
/// # Examples
/// ```
/// use service::service_item::domain::{ServiceItemDefinition, DestinationSitDefinition, ReServiceCode};
/// use service::service_item::validation::validate;
/// let def = ServiceItemDefinition::DestinationSit(DestinationSitDefinition {
///     re_service_code: Some(ReServiceCode::DDFSIT),
///     time_military_1: Some("0400Z".into()),
///     ..Default::default()
/// });
/// let errors = validate(&def).unwrap_err();
/// assert!(errors.iter().any(|e| e.field == "reason"));
/// assert!(errors.iter().any(|e| e.field == "dateOfContact1"));
/// ```
pub fn validate(definition: &ServiceItemDefinition) -> Result<ValidatedDefinition, Vec<FieldError>> {
    match definition {
        ServiceItemDefinition::OriginSit(d) => validate_origin_sit(d),
        ServiceItemDefinition::DestinationSit(d) => validate_destination_sit(d),
        ServiceItemDefinition::Shuttle(d) => validate_shuttle(d),
        ServiceItemDefinition::DomesticCrating(d) => validate_crating(d, false),
        ServiceItemDefinition::InternationalCrating(d) => validate_crating(d, true),
        ServiceItemDefinition::Basic(d) => validate_basic(d),
    }
}

fn finish(details: Option<ServiceItemDetails>, actual_origin: Option<AddressInput>, errors: Vec<FieldError>) -> Result<ValidatedDefinition, Vec<FieldError>> {
    match details {
        Some(details) if errors.is_empty() => Ok(ValidatedDefinition { details, actual_origin }),
        _ => Err(errors),
    }
}

fn code_in_family(
    code: Option<ReServiceCode>,
    belongs: impl Fn(ReServiceCode) -> bool,
    family: &str,
) -> Result<ReServiceCode, FieldError> {
    match code {
        None => Err(FieldError::new("reServiceCode", "reServiceCode is required")),
        Some(c) if belongs(c) => Ok(c),
        Some(c) => Err(FieldError::new("reServiceCode", format!("{c} is not a {family} code"))),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn required<T: Clone>(field: &str, value: &Option<T>) -> Result<T, FieldError> {
    value.clone().ok_or_else(|| FieldError::new(field, format!("{field} is required")))
}

fn check_departure(entry: Option<NaiveDate>, departure: Option<NaiveDate>) -> Option<FieldError> {
    match (entry, departure) {
        (Some(entry), Some(departure)) if departure < entry => Some(FieldError::new(
            "sitDepartureDate",
            format!("sitDepartureDate {departure} cannot be before sitEntryDate {entry}"),
        )),
        _ => None,
    }
}

fn is_postal_code(value: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match value.split_once('-') {
        None => value.len() == 5 && all_digits(value),
        Some((zip, plus4)) => zip.len() == 5 && all_digits(zip) && plus4.len() == 4 && all_digits(plus4),
    }
}

fn check_address(prefix: &str, address: &AddressInput) -> Vec<FieldError> {
    let a = address.normalized();
    let mut errors = Vec::new();
    for (name, value) in [("streetAddress1", &a.street_address_1), ("city", &a.city), ("state", &a.state)] {
        if value.is_empty() {
            errors.push(FieldError::new(format!("{prefix}.{name}"), format!("{name} is required")));
        }
    }
    if !is_postal_code(&a.postal_code) {
        errors.push(FieldError::new(format!("{prefix}.postalCode"), "postalCode must be a 5 digit or ZIP+4 code"));
    }
    errors
}

/// `HHMMZ`, hours 00-23, minutes 00-59.
pub fn check_time_military(field: &str, value: &str) -> Option<String> {
    if value.len() != 5 || !value.is_ascii() {
        return Some(format!("{field} must be in format HHMMZ"));
    }
    let hours = match value[0..2].parse::<u8>() {
        Ok(h) => h,
        Err(_) => return Some(format!("{field} must have a valid number for hours")),
    };
    if hours > 23 {
        return Some(format!("{field} hours must be between 00 and 23"));
    }
    let minutes = match value[2..4].parse::<u8>() {
        Ok(m) => m,
        Err(_) => return Some(format!("{field} must have a valid number for minutes")),
    };
    if minutes > 59 {
        return Some(format!("{field} minutes must be between 00 and 59"));
    }
    if !value.ends_with('Z') {
        return Some(format!("{field} must end with 'Z'"));
    }
    None
}

/// A contact slot is all three values or none of them.
fn check_contact(
    slot: u8,
    date_of_contact: Option<NaiveDate>,
    time_military: &Option<String>,
    first_available_delivery_date: Option<NaiveDate>,
) -> Result<Option<CustomerContact>, Vec<FieldError>> {
    let date_field = format!("dateOfContact{slot}");
    let time_field = format!("timeMilitary{slot}");
    let fadd_field = format!("firstAvailableDeliveryDate{slot}");
    let time_military = non_blank(time_military);

    match (date_of_contact, time_military, first_available_delivery_date) {
        (None, None, None) => Ok(None),
        (Some(date_of_contact), Some(time_military), Some(first_available_delivery_date)) => {
            if let Some(message) = check_time_military(&time_field, &time_military) {
                return Err(vec![FieldError::new(time_field, message)]);
            }
            let contact_type = if slot == 1 { CustomerContactType::First } else { CustomerContactType::Second };
            Ok(Some(CustomerContact { contact_type, date_of_contact, time_military, first_available_delivery_date }))
        }
        (date, time, fadd) => {
            let message = format!("{date_field}, {time_field}, and {fadd_field} must be provided together");
            let missing = [
                (date.is_none(), &date_field),
                (time.is_none(), &time_field),
                (fadd.is_none(), &fadd_field),
            ];
            Err(missing
                .into_iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, field)| FieldError::new(field.as_str(), message.as_str()))
                .collect())
        }
    }
}

fn validate_origin_sit(d: &OriginSitDefinition) -> Result<ValidatedDefinition, Vec<FieldError>> {
    let mut errors = Vec::new();
    let code = code_in_family(d.re_service_code, |c| c.sit_side() == Some(SitSide::Origin), "origin SIT")
        .map_err(|e| errors.push(e))
        .ok();

    let needs_reason = code.is_some_and(|c| c.is_first_day_sit() || c.is_additional_day_sit());
    let reason = non_blank(&d.reason);
    if needs_reason && reason.is_none() {
        errors.push(FieldError::new("reason", REASON_REQUIRED));
    }

    if code == Some(ReServiceCode::DOFSIT) {
        if let Err(e) = required("sitEntryDate", &d.sit_entry_date) {
            errors.push(e);
        }
        match non_blank(&d.sit_postal_code) {
            None => errors.push(FieldError::new("sitPostalCode", "sitPostalCode is required")),
            Some(p) if !is_postal_code(&p) => {
                errors.push(FieldError::new("sitPostalCode", "sitPostalCode must be a 5 digit or ZIP+4 code"))
            }
            Some(_) => {}
        }
        match &d.sit_hhg_actual_origin {
            None => errors.push(FieldError::new("sitHHGActualOrigin", "sitHHGActualOrigin is required for DOFSIT")),
            Some(address) => errors.extend(check_address("sitHHGActualOrigin", address)),
        }
    } else if let Some(address) = &d.sit_hhg_actual_origin {
        errors.extend(check_address("sitHHGActualOrigin", address));
    }
    errors.extend(check_departure(d.sit_entry_date, d.sit_departure_date));

    let details = code.map(|re_service_code| {
        ServiceItemDetails::OriginSit(OriginSit {
            re_service_code,
            reason: reason.unwrap_or_default(),
            sit_postal_code: non_blank(&d.sit_postal_code),
            sit_entry_date: d.sit_entry_date,
            sit_departure_date: d.sit_departure_date,
            sit_hhg_actual_origin: None,
            sit_hhg_original_origin: None,
        })
    });
    finish(details, d.sit_hhg_actual_origin.as_ref().map(AddressInput::normalized), errors)
}

fn validate_destination_sit(d: &DestinationSitDefinition) -> Result<ValidatedDefinition, Vec<FieldError>> {
    let mut errors = Vec::new();
    let code = code_in_family(d.re_service_code, |c| c.sit_side() == Some(SitSide::Destination), "destination SIT")
        .map_err(|e| errors.push(e))
        .ok();

    let reason = non_blank(&d.reason);
    if code == Some(ReServiceCode::DDFSIT) {
        if reason.is_none() {
            errors.push(FieldError::new("reason", REASON_REQUIRED));
        }
        if let Err(e) = required("sitEntryDate", &d.sit_entry_date) {
            errors.push(e);
        }
    }

    let mut customer_contacts = Vec::new();
    let slots = [
        (1, d.date_of_contact_1, &d.time_military_1, d.first_available_delivery_date_1),
        (2, d.date_of_contact_2, &d.time_military_2, d.first_available_delivery_date_2),
    ];
    for (slot, date, time, fadd) in slots {
        match check_contact(slot, date, time, fadd) {
            Ok(Some(contact)) => {
                if let Some(entry) = d.sit_entry_date {
                    if entry < contact.first_available_delivery_date {
                        errors.push(FieldError::new(
                            "sitEntryDate",
                            format!(
                                "sitEntryDate {entry} cannot be before firstAvailableDeliveryDate{slot} {}",
                                contact.first_available_delivery_date
                            ),
                        ));
                    }
                }
                customer_contacts.push(contact);
            }
            Ok(None) => {}
            Err(slot_errors) => errors.extend(slot_errors),
        }
    }
    errors.extend(check_departure(d.sit_entry_date, d.sit_departure_date));

    let details = code.map(|re_service_code| {
        ServiceItemDetails::DestinationSit(DestinationSit {
            re_service_code,
            reason,
            sit_entry_date: d.sit_entry_date,
            sit_departure_date: d.sit_departure_date,
            sit_destination_final_address: None,
            customer_contacts,
        })
    });
    finish(details, None, errors)
}

fn check_weight(field: &str, weight: Option<Pound>) -> Option<FieldError> {
    weight
        .filter(|w| w.0 <= 0)
        .map(|w| FieldError::new(field, format!("{field} must be greater than zero, got {w}")))
}

fn validate_shuttle(d: &ShuttleDefinition) -> Result<ValidatedDefinition, Vec<FieldError>> {
    let mut errors = Vec::new();
    let code = code_in_family(d.re_service_code, ReServiceCode::is_shuttle, "shuttle")
        .map_err(|e| errors.push(e))
        .ok();
    let reason = non_blank(&d.reason);
    if reason.is_none() {
        errors.push(FieldError::new("reason", REASON_REQUIRED));
    }
    errors.extend(check_weight("estimatedWeight", d.estimated_weight));
    errors.extend(check_weight("actualWeight", d.actual_weight));

    let details = code.map(|re_service_code| {
        ServiceItemDetails::Shuttle(Shuttle {
            re_service_code,
            reason: reason.unwrap_or_default(),
            estimated_weight: d.estimated_weight,
            actual_weight: d.actual_weight,
        })
    });
    finish(details, None, errors)
}

fn check_dimension(field: &str, dim: &Dimension) -> Vec<FieldError> {
    [("length", dim.length), ("width", dim.width), ("height", dim.height)]
        .into_iter()
        .filter(|(_, v)| !v.is_positive())
        .map(|(axis, _)| FieldError::new(format!("{field}.{axis}"), format!("{field} {axis} must be greater than zero")))
        .collect()
}

fn validate_crating(d: &CratingDefinition, international: bool) -> Result<ValidatedDefinition, Vec<FieldError>> {
    let mut errors = Vec::new();
    let code = if international {
        code_in_family(d.re_service_code, ReServiceCode::is_international_crating, "international crating")
    } else {
        code_in_family(d.re_service_code, |c| c.is_crating() && !c.is_international_crating(), "domestic crating")
    }
    .map_err(|e| errors.push(e))
    .ok();

    let description = non_blank(&d.description);
    if description.is_none() {
        errors.push(FieldError::new("description", "description is required"));
    }
    let item = required("item", &d.item).map_err(|e| errors.push(e)).ok();
    let crate_dims = required("crate", &d.crate_dims).map_err(|e| errors.push(e)).ok();

    if let (Some(item), Some(crate_dims)) = (item, crate_dims) {
        let item_errors = check_dimension("item", &item);
        let crate_errors = check_dimension("crate", &crate_dims);
        if item_errors.is_empty() && crate_errors.is_empty() {
            if let Err(e) = geometry::fits(&item, &crate_dims) {
                errors.extend(
                    e.shortfalls
                        .iter()
                        .map(|s| FieldError::new(format!("crate.{}", s.axis), s.to_string())),
                );
            }
        }
        errors.extend(item_errors);
        errors.extend(crate_errors);
    }

    if !international && d.external_crate.is_some() {
        errors.push(FieldError::new("externalCrate", "externalCrate is only valid for international crating"));
    }
    let (standalone_crate, external_crate) = if international {
        (Some(d.standalone_crate.unwrap_or(false)), Some(d.external_crate.unwrap_or(false)))
    } else {
        (d.standalone_crate, None)
    };

    let details = match (code, item, crate_dims) {
        (Some(re_service_code), Some(item), Some(crate_dims)) => Some(ServiceItemDetails::Crating(Crating {
            re_service_code,
            description: description.unwrap_or_default(),
            item,
            crate_dims,
            standalone_crate,
            external_crate,
        })),
        _ => None,
    };
    finish(details, None, errors)
}

fn validate_basic(d: &BasicDefinition) -> Result<ValidatedDefinition, Vec<FieldError>> {
    let code = code_in_family(d.re_service_code, |c| !c.has_dedicated_variant(), "basic service item")
        .map_err(|e| vec![e])?;
    finish(Some(ServiceItemDetails::Basic(Basic { re_service_code: code })), None, Vec::new())
}
