use std::collections::HashSet;

use anyhow::{anyhow, Result};
use configs::ServiceItemsConfig;
use strum::IntoEnumIterator;

use super::domain::ReServiceCode;

/// Source of the codes that may currently be created.
pub trait FeatureConfiguration: Send + Sync {
    fn allowed_codes(&self) -> HashSet<ReServiceCode>;

    fn is_creatable(&self, code: ReServiceCode) -> bool {
        self.allowed_codes().contains(&code)
    }
}

/// Fixed set of creatable codes, built once and handed to the creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatableCodes {
    codes: HashSet<ReServiceCode>,
}

impl CreatableCodes {
    pub fn all() -> Self {
        Self { codes: ReServiceCode::iter().collect() }
    }

    pub fn only(codes: impl IntoIterator<Item = ReServiceCode>) -> Self {
        Self { codes: codes.into_iter().collect() }
    }

    /// `None` in config means everything; unknown code names are an error.
    pub fn from_config(cfg: &ServiceItemsConfig) -> Result<Self> {
        let Some(names) = &cfg.creatable_codes else {
            return Ok(Self::all());
        };
        let codes = names
            .iter()
            .map(|name| {
                name.trim()
                    .parse::<ReServiceCode>()
                    .map_err(|_| anyhow!("service_items.creatable_codes: unknown service code {name:?}"))
            })
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self { codes })
    }
}

impl FeatureConfiguration for CreatableCodes {
    fn allowed_codes(&self) -> HashSet<ReServiceCode> {
        self.codes.clone()
    }

    fn is_creatable(&self, code: ReServiceCode) -> bool {
        self.codes.contains(&code)
    }
}
