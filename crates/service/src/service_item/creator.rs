use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::address::AddressPropagator;
use super::domain::{ServiceItem, ServiceItemDefinition, ServiceItemDetails, Shipment, ShipmentType};
use super::features::{CreatableCodes, FeatureConfiguration};
use super::lifecycle::SitLifecycleResolver;
use super::pricing::{is_priced, Pricer};
use super::repository::ServiceItemStore;
use super::validation;
use crate::errors::ServiceError;

/// Everything a creator needs besides its store; cheap to clone per request.
#[derive(Clone)]
pub struct CreatorConfig {
    pub features: CreatableCodes,
    pub pricer: Option<Arc<dyn Pricer>>,
}

impl CreatorConfig {
    pub fn from_config(cfg: &configs::ServiceItemsConfig) -> anyhow::Result<Self> {
        Ok(Self { features: CreatableCodes::from_config(cfg)?, pricer: None })
    }

    pub fn with_pricer(mut self, pricer: Arc<dyn Pricer>) -> Self {
        self.pricer = Some(pricer);
        self
    }
}

impl Default for CreatorConfig {
    fn default() -> Self {
        Self { features: CreatableCodes::all(), pricer: None }
    }
}

/// Creates service items for a shipment, independent of transport and storage.
pub struct ServiceItemCreator<R: ?Sized, F> {
    repo: Arc<R>,
    features: F,
    pricer: Option<Arc<dyn Pricer>>,
}

impl<R: ServiceItemStore + ?Sized, F: FeatureConfiguration> ServiceItemCreator<R, F> {
    pub fn new(repo: Arc<R>, features: F) -> Self { Self { repo, features, pricer: None } }

    pub fn with_pricer(mut self, pricer: Arc<dyn Pricer>) -> Self {
        self.pricer = Some(pricer);
        self
    }

    /// Validate and persist a service item, returning every item created.
    ///
    /// A `DOFSIT` whose actual address differs from the shipment's pickup also
    /// creates a `DOPSIT` and moves the shipment's pickup to the actual address,
    /// so callers always get a list back.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::service_item::{ServiceItemCreator, features::CreatableCodes, repository::mock::InMemoryStore};
    /// use service::service_item::domain::*;
    /// let store = Arc::new(InMemoryStore::default());
    /// let shipment = Shipment {
    ///     id: uuid::Uuid::new_v4(), move_id: uuid::Uuid::new_v4(), move_status: MoveStatus::Approved,
    ///     shipment_type: ShipmentType::Hhg, status: ShipmentStatus::Approved, pickup_address: None,
    ///     destination_address: None, prime_estimated_weight: None, requested_pickup_date: None,
    /// };
    /// store.insert_shipment(shipment.clone());
    /// let creator = ServiceItemCreator::new(store, CreatableCodes::all());
    /// let def = ServiceItemDefinition::Basic(BasicDefinition { re_service_code: Some(ReServiceCode::MS) });
    /// let items = tokio_test::block_on(creator.create_service_item(shipment.id, def)).unwrap();
    /// assert_eq!(items.len(), 1);
    /// assert_eq!(items[0].status, ServiceItemStatus::Submitted);
    /// ```
    #[instrument(skip(self, definition), fields(shipment_id = %shipment_id, re_service_code = ?definition.re_service_code()))]
    pub async fn create_service_item(&self, shipment_id: Uuid, definition: ServiceItemDefinition) -> Result<Vec<ServiceItem>, ServiceError> {
        info!(shipment_id = %shipment_id, re_service_code = ?definition.re_service_code(), "service_item_requested");
        let shipment = self.repo.fetch(shipment_id).await?;

        if shipment.shipment_type == ShipmentType::Ppm {
            return Err(ServiceError::invalid(
                "mtoShipmentID",
                format!("{shipment_id}: service items cannot be created for PPM shipments"),
            ));
        }
        if !shipment.move_status.accepts_service_items() {
            return Err(ServiceError::Conflict(format!(
                "move {} is {}; service items can only be created for approved moves",
                shipment.move_id, shipment.move_status
            )));
        }
        if let Some(code) = definition.re_service_code() {
            if !self.features.is_creatable(code) {
                return Err(ServiceError::invalid("reServiceCode", format!("{code} is not currently creatable")));
            }
        }

        let validated = validation::validate(&definition).map_err(|errors| {
            warn!(shipment_id = %shipment_id, error_count = errors.len(), "service_item_rejected");
            ServiceError::InvalidInput(errors)
        })?;
        let mut validated = SitLifecycleResolver::new(self.repo.as_ref()).resolve(&shipment, validated).await?;

        let propagator = AddressPropagator::new(self.repo.as_ref());
        let mut propagation = None;
        let mut companion = None;
        if let (ServiceItemDetails::OriginSit(first_day), Some(actual)) = (&mut validated.details, validated.actual_origin.as_ref()) {
            if first_day.re_service_code.is_first_day_sit() {
                let p = propagator.resolve(&shipment, actual).await?;
                p.apply_to(first_day);
                companion = p.companion(first_day).map(ServiceItemDetails::OriginSit);
                propagation = Some(p);
            }
        }

        let now = Utc::now();
        let items: Vec<ServiceItem> = std::iter::once(validated.details)
            .chain(companion)
            .map(|details| ServiceItem::submitted(&shipment, details, now))
            .collect();
        let mut created = self.repo.create(items).await?;

        if let Some(p) = &propagation {
            propagator.apply(shipment.id, p).await?;
        }
        self.price(&shipment, &mut created).await?;

        let codes: Vec<String> = created.iter().map(|i| i.re_service_code().to_string()).collect();
        info!(shipment_id = %shipment.id, count = created.len(), codes = ?codes, "service_items_created");
        Ok(created)
    }

    async fn price(&self, shipment: &Shipment, items: &mut [ServiceItem]) -> Result<(), ServiceError> {
        let Some(pricer) = &self.pricer else {
            return Ok(());
        };
        if shipment.prime_estimated_weight.is_none() || shipment.requested_pickup_date.is_none() {
            debug!(shipment_id = %shipment.id, "pricing_skipped_missing_inputs");
            return Ok(());
        }
        for item in items.iter_mut().filter(|i| is_priced(i.re_service_code())) {
            let code = item.re_service_code();
            let estimate = pricer
                .price(code, shipment)
                .await
                .map_err(|source| ServiceError::Pricing { code, source })?;
            self.repo.set_pricing_estimate(item.id, estimate).await?;
            item.pricing_estimate = Some(estimate);
            debug!(service_item_id = %item.id, code = %code, estimate = %estimate, "pricing_estimate_set");
        }
        Ok(())
    }
}
