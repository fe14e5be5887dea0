pub mod forecast;
pub mod optimizer;
pub mod risk;

pub use forecast::ForecastModel;
pub use optimizer::{optimize, PlanningError};
pub use risk::{assess, categorize, RiskThresholds};
