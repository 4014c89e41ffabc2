//! Service-item creation engine: field contracts, crate geometry, SIT ordering
//! rules and address propagation, composed by [`ServiceItemCreator`].

pub mod address;
pub mod creator;
pub mod domain;
pub mod features;
pub mod geometry;
pub mod lifecycle;
pub mod pricing;
pub mod repo;
pub mod repository;
pub mod validation;

pub use creator::{CreatorConfig, ServiceItemCreator};
pub use repo::seaorm::create_service_item_in_transaction;
