pub mod id;
pub mod thresholds;
pub mod types;
