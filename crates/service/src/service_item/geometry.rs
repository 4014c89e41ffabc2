//! Crate/item fit check for crating service items.

use std::fmt;

use common::units::ThousandthInches;
use strum::Display;
use thiserror::Error;

use super::domain::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    Length,
    Width,
    Height,
}

/// One axis on which the crate is smaller than the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisShortfall {
    pub axis: Axis,
    pub item: ThousandthInches,
    pub crate_value: ThousandthInches,
}

impl fmt::Display for AxisShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "crate {} ({}) must be at least the item {} ({})",
            self.axis, self.crate_value, self.axis, self.item
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("item does not fit in crate on {} axis(es)", .shortfalls.len())]
pub struct GeometryError {
    pub shortfalls: Vec<AxisShortfall>,
}

/// Whether `item` fits inside `crate_dims`, comparing axis by axis.
///
/// No rotation is tried: length is compared with length, width with width and
/// height with height. Every failing axis is reported.
///
/// # Examples
/// ```
/// use service::service_item::domain::Dimension;
/// use service::service_item::geometry::fits;
/// let item = Dimension::from_inches(10, 10, 10);
/// assert!(fits(&item, &Dimension::from_inches(12, 10, 11)).is_ok());
/// let err = fits(&item, &Dimension::from_inches(9, 12, 9)).unwrap_err();
/// assert_eq!(err.shortfalls.len(), 2);
/// ```
pub fn fits(item: &Dimension, crate_dims: &Dimension) -> Result<(), GeometryError> {
    let shortfalls: Vec<AxisShortfall> = [
        (Axis::Length, item.length, crate_dims.length),
        (Axis::Width, item.width, crate_dims.width),
        (Axis::Height, item.height, crate_dims.height),
    ]
    .into_iter()
    .filter(|(_, item, crate_value)| crate_value < item)
    .map(|(axis, item, crate_value)| AxisShortfall { axis, item, crate_value })
    .collect();

    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(GeometryError { shortfalls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dim(l: i32, w: i32, h: i32) -> Dimension {
        Dimension { length: ThousandthInches(l), width: ThousandthInches(w), height: ThousandthInches(h) }
    }

    #[test]
    fn equal_dimensions_fit() {
        assert!(fits(&dim(5000, 4000, 3000), &dim(5000, 4000, 3000)).is_ok());
    }

    #[test]
    fn rotation_is_not_attempted() {
        // Would fit if turned on its side.
        let err = fits(&dim(10_000, 2_000, 2_000), &dim(2_000, 10_000, 2_000)).unwrap_err();
        assert_eq!(err.shortfalls.len(), 1);
        assert_eq!(err.shortfalls[0].axis, Axis::Length);
        assert_eq!(
            err.shortfalls[0].to_string(),
            "crate length (2.000in) must be at least the item length (10.000in)"
        );
    }

    proptest! {
        #[test]
        fn fits_iff_every_axis_is_large_enough(
            il in 1..100_000i32, iw in 1..100_000i32, ih in 1..100_000i32,
            cl in 1..100_000i32, cw in 1..100_000i32, ch in 1..100_000i32,
        ) {
            let expected = cl >= il && cw >= iw && ch >= ih;
            let result = fits(&dim(il, iw, ih), &dim(cl, cw, ch));
            prop_assert_eq!(result.is_ok(), expected);
            if let Err(e) = result {
                let failing = [cl < il, cw < iw, ch < ih].iter().filter(|b| **b).count();
                prop_assert_eq!(e.shortfalls.len(), failing);
            }
        }
    }
}
