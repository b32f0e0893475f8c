//! Driving versus flying comparison

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Flying,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Driving => write!(f, "driving"),
            TravelMode::Flying => write!(f, "flying"),
        }
    }
}

/// Why the preferred mode was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    SignificantlyCheaper,
    MuchFaster,
    GroupValue,
    Convenience,
    OnlyAvailableOption,
}

impl fmt::Display for RecommendationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RecommendationReason::SignificantlyCheaper => "significantly cheaper",
            RecommendationReason::MuchFaster => "much faster",
            RecommendationReason::GroupValue => "better value for larger groups",
            RecommendationReason::Convenience => "better convenience and time savings",
            RecommendationReason::OnlyAvailableOption => "only available option",
        };
        write!(f, "{text}")
    }
}

/// Round-trip driving cost components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrivingCosts {
    pub gas: f64,
    pub wear_and_tear: f64,
    pub tolls: f64,
    pub parking: f64,
    pub total_per_group: f64,
    pub total_per_person: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingOption {
    pub available: bool,
    /// Set when driving is not possible
    pub unavailable_reason: Option<String>,
    /// One-way distance
    pub distance_miles: f64,
    /// One-way driving time
    pub drive_time_hours: f64,
    /// Round trip
    pub total_time_hours: f64,
    pub costs: DrivingCosts,
    pub convenience_score: u8,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl DrivingOption {
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.costs.total_per_group
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyingOption {
    /// One-way time in the air
    pub flight_duration_hours: f64,
    /// Round trip including airport overhead on both legs
    pub total_time_hours: f64,
    /// Round-trip fare for one traveler
    pub cost_per_person: f64,
    pub total_cost: f64,
    pub convenience_score: u8,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub preferred: TravelMode,
    pub reason: RecommendationReason,
    pub cost_difference: f64,
    pub time_difference_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelComparison {
    pub origin: String,
    pub destination: String,
    pub travelers: u32,
    pub driving: DrivingOption,
    pub flying: FlyingOption,
    pub recommendation: Recommendation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_text() {
        assert_eq!(
            RecommendationReason::OnlyAvailableOption.to_string(),
            "only available option"
        );
        assert_eq!(
            RecommendationReason::GroupValue.to_string(),
            "better value for larger groups"
        );
        assert_eq!(TravelMode::Flying.to_string(), "flying");
    }
}
