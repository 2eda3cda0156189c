pub mod meter;
pub mod types;

pub use meter::CostMeter;
pub use types::{Cost, ModelPricing, TokenUsage, default_pricing, lookup_pricing};
