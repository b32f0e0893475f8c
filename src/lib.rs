//! `TripScout` - smart trip planning
//!
//! This library scores destination candidates against a traveler's
//! interests, lays them out as a day-by-day itinerary, estimates trip costs
//! and compares driving with flying.

pub mod cli;
pub mod config;
pub mod data_source;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod notify;
pub mod planning;
pub mod report;

// Re-export core types for public API
pub use config::TripScoutConfig;
pub use data_source::{DestinationDataSource, DestinationInfo, StaticDestinationSource};
pub use error::TripScoutError;
pub use models::{PlanRequest, TripPlan};
pub use planning::{PlanningEvent, PlanningStage, TripPlanner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripScoutError>;

/// Fresh seed for components that were not given one
pub(crate) fn entropy_seed() -> u64 {
    use rand::RngExt;
    rand::rng().random()
}
