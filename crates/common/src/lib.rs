//! Shared building blocks for the move-services workspace.

pub mod units;
pub mod utils;

pub use utils::logging;
