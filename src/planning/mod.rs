//! Planning engines
//!
//! - Scorer: relevance scores for candidates, heuristic or oracle-guided
//! - Optimizer: day-by-day slot assignment
//! - Cost estimator and travel comparator: pure table-driven calculations
//! - Assembler: the end-to-end pipeline producing a [`crate::models::TripPlan`]

pub mod assembler;
pub mod cost_estimator;
pub mod optimizer;
pub mod scorer;
pub mod travel_comparator;

pub use assembler::{PlannerSettings, PlanningEvent, PlanningStage, TripPlanner, confidence_score};
pub use cost_estimator::{BaseRates, CostEstimator, PriceTable, StaticPriceTable, destination_key};
pub use optimizer::{DayTemplate, ItineraryOptimizer, OptimizerMode, ResetPolicy};
pub use scorer::{
    GuidedStrategy, HeuristicScorer, HeuristicStrategy, ScoringMode, ScoringOracle,
    ScoringOutcome, ScoringStrategy, ScoringWeights,
};
pub use travel_comparator::{
    FlightOnlyClassifier, FlightRoute, OverseasRegion, RoadRoute, StaticTravelTables,
    TravelComparator, TravelTables, driving_costs,
};
