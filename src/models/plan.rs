//! Final trip plan, assembled once per planning run

use crate::models::candidate::ScoredItem;
use crate::models::cost::CostBreakdown;
use crate::models::itinerary::Itinerary;
use crate::models::travel::TravelComparison;
use crate::models::trip::{BudgetTier, DateRange};
use crate::models::weather::WeatherSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence at or above this is reported as "high"
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Advisory confidence level shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "🟢",
            ConfidenceLevel::Medium => "🟡",
            ConfidenceLevel::Low => "🔴",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::Low => write!(f, "Low"),
        }
    }
}

/// Complete result of a planning run. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub destination: String,
    pub dates: DateRange,
    pub interests: Vec<String>,
    pub weather: WeatherSnapshot,
    /// Sorted by descending score
    pub restaurants: Vec<ScoredItem>,
    /// Ordinary activities and festivals, sorted by descending score
    pub activities: Vec<ScoredItem>,
    /// Festivals on their own, also merged into `activities`
    pub festivals: Vec<ScoredItem>,
    pub itinerary: Itinerary,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub budget_tier: BudgetTier,
    pub travelers: u32,
    pub include_lodging: bool,
    pub costs: CostBreakdown,
    pub total_cost: f64,
    pub origin: Option<String>,
    pub travel: Option<TravelComparison>,
    /// Recovered problems encountered while planning
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl TripPlan {
    #[must_use]
    pub fn cost_per_person(&self) -> f64 {
        self.total_cost / f64::from(self.travelers.max(1))
    }

    #[must_use]
    pub fn is_high_confidence(&self) -> bool {
        self.confidence_level == ConfidenceLevel::High
    }

    /// Activities that are not festivals, best first
    pub fn regular_activities(&self) -> impl Iterator<Item = &ScoredItem> {
        self.activities.iter().filter(|a| !a.item.is_event())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_levels() {
        assert_eq!(
            ConfidenceLevel::from_score(0.7, HIGH_CONFIDENCE_THRESHOLD),
            ConfidenceLevel::High
        );
        assert_eq!(
            ConfidenceLevel::from_score(0.69, HIGH_CONFIDENCE_THRESHOLD),
            ConfidenceLevel::Medium
        );
        assert_eq!(
            ConfidenceLevel::from_score(0.2, HIGH_CONFIDENCE_THRESHOLD),
            ConfidenceLevel::Low
        );
    }
}
