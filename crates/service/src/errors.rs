use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::service_item::domain::ReServiceCode;
use crate::service_item::pricing::PricingError;

/// One violated rule: the offending field path and a human readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Business errors surfaced by the service-item engine.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {}", summarize(.0))]
    InvalidInput(Vec<FieldError>),
    #[error("conflict: {0}")]
    Conflict(String),
    /// The cause is kept for logs and never rendered to callers.
    #[error("query error while accessing {entity}")]
    Query {
        entity: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("pricing failed for {code}")]
    Pricing {
        code: ReServiceCode,
        #[source]
        source: PricingError,
    },
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput(vec![FieldError::new(field, message)])
    }

    /// Wrap a persistence failure, logging the underlying cause.
    pub fn query<E>(entity: &str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        error!(entity = entity, error = %err, "query_failed");
        Self::Query { entity: entity.to_string(), source: Box::new(err) }
    }

    /// Map a model-layer failure; unique violations become conflicts.
    /// The database detail is logged and kept out of the message.
    pub fn from_model(entity: &str, err: models::errors::ModelError) -> Self {
        match err {
            models::errors::ModelError::Conflict(detail) => {
                warn!(entity = entity, detail = %detail, "unique_violation");
                Self::Conflict(format!("{} violates a uniqueness rule", entity))
            }
            other => Self::query(entity, other),
        }
    }

    /// Field errors carried by an `InvalidInput`, empty for every other kind.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::InvalidInput(errors) => errors,
            _ => &[],
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::InvalidInput(_) => 1001,
            ServiceError::Conflict(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Query { .. } => 1200,
            ServiceError::Pricing { .. } => 1300,
        }
    }
}
