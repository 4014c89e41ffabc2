//! Fixed-precision measurement units.
//!
//! Values are stored as integers in their smallest unit so that comparisons and
//! persistence never go through floating point.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length in thousandths of an inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThousandthInches(pub i32);

impl ThousandthInches {
    pub fn from_inches(inches: i32) -> Self { Self(inches * 1000) }

    pub fn is_positive(self) -> bool { self.0 > 0 }
}

impl fmt::Display for ThousandthInches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}in", self.0 / 1000, (self.0 % 1000).abs())
    }
}

/// Weight in pounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pound(pub i32);

impl fmt::Display for Pound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}lbs", self.0)
    }
}

/// Money in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}
