pub mod reports;
pub mod runner;
pub mod strategy;
pub mod validation;

pub use runner::{PlaythroughPlan, PlaythroughRecord, PlaythroughTester, ScenarioResult};
pub use strategy::Strategy;
pub use validation::{FileReport, validate_files};
