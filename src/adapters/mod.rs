// Adapters layer: concrete readers and writers for external systems.

pub mod aggregator;
pub mod json;
pub mod ynab;
