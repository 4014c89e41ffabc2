//! Hooks for the optional pricing step that runs after items are created.

use async_trait::async_trait;
use common::units::Cents;
use thiserror::Error;

use super::domain::{ReServiceCode, Shipment};

/// Codes that get an estimate at creation time.
pub const PRICED_CODES: [ReServiceCode; 5] =
    [ReServiceCode::DOP, ReServiceCode::DDP, ReServiceCode::DPK, ReServiceCode::DUPK, ReServiceCode::DLH];

pub fn is_priced(code: ReServiceCode) -> bool {
    PRICED_CODES.contains(&code)
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("distance lookup failed: {0}")]
    Distance(String),
    #[error("shipment is missing {0}")]
    MissingInput(&'static str),
    #[error("calculation failed: {0}")]
    Calculation(String),
}

/// Per-code cost estimate for a shipment.
#[async_trait]
pub trait Pricer: Send + Sync {
    async fn price(&self, code: ReServiceCode, shipment: &Shipment) -> Result<Cents, PricingError>;
}

/// Mileage between two postal codes, used by pricers.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn distance(&self, origin_zip: &str, destination_zip: &str) -> Result<u32, PricingError>;
}

/// Deterministic pricers for tests and doc examples
pub mod mock {
    use super::*;

    pub struct FixedDistance(pub u32);

    #[async_trait]
    impl DistanceProvider for FixedDistance {
        async fn distance(&self, _origin_zip: &str, _destination_zip: &str) -> Result<u32, PricingError> {
            Ok(self.0)
        }
    }

    /// `miles * cents_per_mile`, failing when either postal code is unknown.
    pub struct PerMilePricer<D: DistanceProvider> {
        pub distance: D,
        pub cents_per_mile: i64,
    }

    #[async_trait]
    impl<D: DistanceProvider> Pricer for PerMilePricer<D> {
        async fn price(&self, _code: ReServiceCode, shipment: &Shipment) -> Result<Cents, PricingError> {
            let origin = shipment.pickup_address.as_ref().ok_or(PricingError::MissingInput("pickup address"))?;
            let destination = shipment
                .destination_address
                .as_ref()
                .ok_or(PricingError::MissingInput("destination address"))?;
            let miles = self.distance.distance(&origin.value.postal_code, &destination.value.postal_code).await?;
            Ok(Cents(i64::from(miles) * self.cents_per_mile))
        }
    }

    pub struct FailingPricer;

    #[async_trait]
    impl Pricer for FailingPricer {
        async fn price(&self, _code: ReServiceCode, _shipment: &Shipment) -> Result<Cents, PricingError> {
            Err(PricingError::Distance("mileage service unavailable".into()))
        }
    }
}
