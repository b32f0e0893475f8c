//! Data models for the TripScout planner
//!
//! This module contains the core domain models organized by concern:
//! - Candidate: activities, restaurants and events, scored or not
//! - Weather: destination weather snapshot
//! - Trip: request input, validated parameters, date ranges, budget tiers
//! - Itinerary: day plans and slot assignments
//! - Cost / Travel: cost breakdown and driving-vs-flying comparison
//! - Plan: the assembled trip plan

pub mod candidate;
pub mod cost;
pub mod itinerary;
pub mod plan;
pub mod travel;
pub mod trip;
pub mod weather;

// Re-export all public types for convenient access
pub use candidate::{CandidateItem, EventWindow, ItemCategory, ScoredItem};
pub use cost::{CostBreakdown, CostCategory};
pub use itinerary::{DayPlan, Itinerary, Slot, SlotAssignment};
pub use plan::{ConfidenceLevel, TripPlan};
pub use travel::{
    DrivingCosts, DrivingOption, FlyingOption, Recommendation, RecommendationReason,
    TravelComparison, TravelMode,
};
pub use trip::{BudgetTier, DateRange, PlanRequest, TripParameters};
pub use weather::{WeatherCondition, WeatherSnapshot};
