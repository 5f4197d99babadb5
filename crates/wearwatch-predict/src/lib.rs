pub mod catalog;
pub mod cost;
pub mod forecast;
pub mod history;
pub mod predictors;
pub mod wear;

pub use cost::CostEstimator;
pub use forecast::TrendForecaster;
pub use history::MetricHistory;
pub use wear::WearTracker;
