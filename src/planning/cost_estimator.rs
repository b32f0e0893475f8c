//! Trip cost estimation
//!
//! Costs are per-person base rates for the chosen budget tier, scaled by a
//! destination cost-of-living multiplier, multiplied out over days (nights
//! for lodging) and party size. Miscellaneous spend is added on top as a
//! fixed share of everything else.

use crate::models::{BudgetTier, CostBreakdown, DateRange};
use crate::{Result, TripScoutError};
use std::collections::HashMap;
use tracing::debug;

/// Per-person rates for one budget tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseRates {
    /// Per day
    pub meals: f64,
    /// Per day
    pub activities: f64,
    /// Local transport per day
    pub transport: f64,
    pub lodging_per_night: f64,
}

impl BaseRates {
    #[must_use]
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            meals: self.meals * multiplier,
            activities: self.activities * multiplier,
            transport: self.transport * multiplier,
            lodging_per_night: self.lodging_per_night * multiplier,
        }
    }
}

/// Source of base rates and regional multipliers
pub trait PriceTable: Send + Sync {
    fn base_rates(&self, tier: BudgetTier) -> BaseRates;

    /// Cost-of-living multiplier for a destination key, if known
    fn regional_multiplier(&self, key: &str) -> Option<f64>;
}

/// Built-in pricing tables
#[derive(Debug, Clone)]
pub struct StaticPriceTable {
    multipliers: HashMap<&'static str, f64>,
}

const REGIONAL_MULTIPLIERS: &[(&str, f64)] = &[
    // High-cost
    ("paris", 1.4),
    ("london", 1.3),
    ("new york", 1.3),
    ("tokyo", 1.2),
    ("sydney", 1.2),
    ("zurich", 1.5),
    ("oslo", 1.4),
    ("copenhagen", 1.3),
    ("stockholm", 1.2),
    // Medium-cost
    ("rome", 1.0),
    ("madrid", 0.9),
    ("berlin", 0.9),
    ("amsterdam", 1.1),
    ("barcelona", 0.9),
    ("budapest", 0.6),
    ("lisbon", 0.8),
    ("athens", 0.7),
    // Lower-cost
    ("bangkok", 0.4),
    ("mexico city", 0.5),
    ("istanbul", 0.5),
    ("cairo", 0.4),
    ("delhi", 0.3),
    ("lima", 0.5),
    ("marrakech", 0.5),
    ("prague", 0.6),
];

impl Default for StaticPriceTable {
    fn default() -> Self {
        Self {
            multipliers: REGIONAL_MULTIPLIERS.iter().copied().collect(),
        }
    }
}

impl PriceTable for StaticPriceTable {
    fn base_rates(&self, tier: BudgetTier) -> BaseRates {
        match tier {
            BudgetTier::Low => BaseRates {
                meals: 25.0,
                activities: 15.0,
                transport: 10.0,
                lodging_per_night: 40.0,
            },
            BudgetTier::Mid => BaseRates {
                meals: 50.0,
                activities: 40.0,
                transport: 25.0,
                lodging_per_night: 100.0,
            },
            BudgetTier::Luxury => BaseRates {
                meals: 100.0,
                activities: 80.0,
                transport: 60.0,
                lodging_per_night: 250.0,
            },
        }
    }

    fn regional_multiplier(&self, key: &str) -> Option<f64> {
        self.multipliers.get(key).copied()
    }
}

/// Lookup key for a destination: lowercase, text before the first comma
#[must_use]
pub fn destination_key(destination: &str) -> String {
    destination
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Computes cost breakdowns; holds no state between calls
pub struct CostEstimator<P = StaticPriceTable> {
    prices: P,
}

impl Default for CostEstimator<StaticPriceTable> {
    fn default() -> Self {
        Self::new(StaticPriceTable::default())
    }
}

impl<P: PriceTable> CostEstimator<P> {
    pub fn new(prices: P) -> Self {
        Self { prices }
    }

    /// Multiplier for a destination; unknown destinations cost 1.0
    pub fn multiplier(&self, destination: &str) -> f64 {
        self.prices
            .regional_multiplier(&destination_key(destination))
            .unwrap_or(1.0)
    }

    /// Estimate from already validated inputs
    pub fn estimate(
        &self,
        destination: &str,
        dates: &DateRange,
        tier: BudgetTier,
        travelers: u32,
        include_lodging: bool,
    ) -> Result<CostBreakdown> {
        if travelers == 0 {
            return Err(TripScoutError::validation(
                "Number of travelers must be at least 1",
            ));
        }

        let multiplier = self.multiplier(destination);
        let rates = self.prices.base_rates(tier).scaled(multiplier);
        let days = f64::from(dates.days());
        let party = f64::from(travelers);

        let lodging = include_lodging
            .then(|| rates.lodging_per_night * f64::from(dates.nights()) * party);
        let breakdown = CostBreakdown::from_parts(
            rates.meals * days * party,
            rates.activities * days * party,
            rates.transport * days * party,
            lodging,
        );

        debug!(
            destination,
            multiplier,
            tier = %tier,
            total = breakdown.total(),
            "Estimated trip cost"
        );
        Ok(breakdown)
    }

    /// Estimate from raw caller strings, validating dates and tier first
    pub fn estimate_raw(
        &self,
        destination: &str,
        start_date: &str,
        end_date: &str,
        budget_tier: &str,
        travelers: u32,
        include_lodging: bool,
    ) -> Result<CostBreakdown> {
        let dates = DateRange::parse(start_date, end_date)?;
        let tier = budget_tier.parse::<BudgetTier>()?;
        self.estimate(destination, &dates, tier, travelers, include_lodging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[rstest]
    #[case("Paris, France", "paris")]
    #[case("  New York , NY", "new york")]
    #[case("Mexico City", "mexico city")]
    #[case("", "")]
    fn test_destination_key(#[case] raw: &str, #[case] key: &str) {
        assert_eq!(destination_key(raw), key);
    }

    #[rstest]
    #[case("Paris, France", 1.4)]
    #[case("PRAGUE", 0.6)]
    #[case("Reykjavik, Iceland", 1.0)]
    fn test_multiplier_lookup(#[case] destination: &str, #[case] expected: f64) {
        let estimator = CostEstimator::default();
        assert!(close(estimator.multiplier(destination), expected));
    }

    #[test]
    fn test_paris_mid_tier_with_lodging() {
        let estimator = CostEstimator::default();
        let breakdown = estimator
            .estimate_raw("Paris, France", "2025-09-01", "2025-09-05", "mid", 2, true)
            .unwrap();

        // 5 days, 4 nights, 2 travelers, multiplier 1.4
        assert!(close(breakdown.meals, 50.0 * 1.4 * 5.0 * 2.0));
        assert!(close(breakdown.activities, 40.0 * 1.4 * 5.0 * 2.0));
        assert!(close(breakdown.transport, 25.0 * 1.4 * 5.0 * 2.0));
        assert!(close(breakdown.lodging.unwrap(), 100.0 * 1.4 * 4.0 * 2.0));

        let others = breakdown.meals + breakdown.activities + breakdown.transport + 1120.0;
        assert!(close(breakdown.miscellaneous, others * 0.1));
        assert!(close(breakdown.total(), others * 1.1));
    }

    #[test]
    fn test_same_day_trip_has_no_lodging_nights() {
        let estimator = CostEstimator::default();
        let breakdown = estimator
            .estimate_raw("Rome", "2025-09-01", "2025-09-01", "low", 1, true)
            .unwrap();
        assert_eq!(breakdown.lodging, Some(0.0));
        assert!(close(breakdown.total(), (25.0 + 15.0 + 10.0) * 1.1));
    }

    #[test]
    fn test_lodging_absent_when_not_requested() {
        let estimator = CostEstimator::default();
        let breakdown = estimator
            .estimate_raw("Lisbon", "2025-09-01", "2025-09-03", "luxury", 3, false)
            .unwrap();
        assert!(breakdown.lodging.is_none());
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let estimator = CostEstimator::default();
        let first = estimator
            .estimate_raw("Tokyo", "2025-04-01", "2025-04-07", "mid", 4, true)
            .unwrap();
        let second = estimator
            .estimate_raw("Tokyo", "2025-04-01", "2025-04-07", "mid", 4, true)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_tier_is_rejected() {
        let estimator = CostEstimator::default();
        let err = estimator
            .estimate_raw("Paris", "2025-09-01", "2025-09-05", "premium", 2, true)
            .unwrap_err();
        assert!(matches!(err, TripScoutError::InvalidBudgetTier { .. }));
    }

    #[test]
    fn test_zero_travelers_rejected() {
        let estimator = CostEstimator::default();
        let err = estimator
            .estimate_raw("Paris", "2025-09-01", "2025-09-05", "mid", 0, true)
            .unwrap_err();
        assert!(matches!(err, TripScoutError::Validation { .. }));
    }

    struct FlatPrices;

    impl PriceTable for FlatPrices {
        fn base_rates(&self, _tier: BudgetTier) -> BaseRates {
            BaseRates {
                meals: 1.0,
                activities: 1.0,
                transport: 1.0,
                lodging_per_night: 1.0,
            }
        }

        fn regional_multiplier(&self, _key: &str) -> Option<f64> {
            None
        }
    }

    #[test]
    fn test_custom_price_table() {
        let estimator = CostEstimator::new(FlatPrices);
        let breakdown = estimator
            .estimate_raw("Anywhere", "2025-09-01", "2025-09-02", "mid", 1, true)
            .unwrap();
        assert!(close(breakdown.total(), (2.0 * 3.0 + 1.0) * 1.1));
    }
}
