//! Service layer hosting the service-item creation engine on top of models.
//! - Separates business rules from data access through repository traits.
//! - Ships an in-memory store for tests and a SeaORM store for production.

pub mod errors;
pub mod service_item;
#[cfg(test)]
pub mod test_support;

pub use errors::{FieldError, ServiceError};
pub use service_item::ServiceItemCreator;
