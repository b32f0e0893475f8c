//! Relevance scoring for candidate items
//!
//! Every candidate starts from a base score and collects bonuses for
//! matching the traveler's interests, suiting the weather and being highly
//! rated. Scores are clamped to `1.0` and the result is sorted best first,
//! keeping input order between equal scores.
//!
//! Two strategies sit behind [`ScoringStrategy`]: the deterministic
//! [`HeuristicStrategy`] and the [`GuidedStrategy`], which consults an
//! external [`ScoringOracle`] and falls back to reduced scoring when the
//! oracle cannot be reached.

use crate::Result;
use crate::models::{CandidateItem, ScoredItem, WeatherSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Bonus weights applied by the heuristic scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub base: f64,
    /// Per interest found in a tag
    pub tag_match: f64,
    /// Per interest found in the item name
    pub name_match: f64,
    pub weather_match: f64,
    /// Rating of 4.5 and above
    pub top_rating: f64,
    /// Rating of 4.0 and above
    pub good_rating: f64,
    /// Added to time-bound events after scoring
    pub event_boost: f64,
    /// Per interest found in a tag, reduced mode only
    pub reduced_tag_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            tag_match: 0.15,
            name_match: 0.1,
            weather_match: 0.1,
            top_rating: 0.1,
            good_rating: 0.05,
            event_boost: 0.2,
            reduced_tag_match: 0.2,
        }
    }
}

/// Which heuristic terms are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Interests, name, weather and quality bonuses
    Full,
    /// Base score and interest-tag bonus only
    Reduced,
}

/// Deterministic heuristic scorer
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    weights: ScoringWeights,
}

impl HeuristicScorer {
    #[must_use]
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a single candidate, clamped to `0.0..=1.0`
    #[must_use]
    pub fn score_item(
        &self,
        item: &CandidateItem,
        interests: &[String],
        weather: &WeatherSnapshot,
        mode: ScoringMode,
    ) -> f64 {
        let w = &self.weights;
        let tags: Vec<String> = item.tags.iter().map(|t| t.to_lowercase()).collect();
        let name = item.name.to_lowercase();

        let mut score = w.base;
        for interest in interests.iter().map(|i| i.to_lowercase()) {
            let in_tags = tags.iter().any(|tag| tag.contains(&interest));
            match mode {
                ScoringMode::Full => {
                    if in_tags {
                        score += w.tag_match;
                    }
                    if name.contains(&interest) {
                        score += w.name_match;
                    }
                }
                ScoringMode::Reduced => {
                    if in_tags {
                        score += w.reduced_tag_match;
                    }
                }
            }
        }

        if mode == ScoringMode::Full {
            let condition = &weather.condition;
            let fair_outdoor = condition.is_fair() && item.is_outdoor();
            let poor_indoor = condition.is_poor() && item.is_indoor();
            if fair_outdoor || poor_indoor {
                score += w.weather_match;
            }

            if item.rating >= 4.5 {
                score += w.top_rating;
            } else if item.rating >= 4.0 {
                score += w.good_rating;
            }
        }

        score.min(1.0)
    }

    /// Score every item and sort by descending score; ties keep input order
    #[must_use]
    pub fn score(
        &self,
        items: &[CandidateItem],
        interests: &[String],
        weather: &WeatherSnapshot,
        mode: ScoringMode,
    ) -> Vec<ScoredItem> {
        let scored = items
            .iter()
            .map(|item| {
                let score = self.score_item(item, interests, weather, mode);
                ScoredItem::new(item.clone(), score)
            })
            .collect();
        sort_by_score(scored)
    }

    /// Push time-bound events toward the top after the initial clamp
    #[must_use]
    pub fn boost_events(&self, items: Vec<ScoredItem>) -> Vec<ScoredItem> {
        let boosted = items
            .into_iter()
            .map(|mut scored| {
                if scored.item.is_event() {
                    scored.score = (scored.score + self.weights.event_boost).min(1.0);
                }
                scored
            })
            .collect();
        sort_by_score(boosted)
    }
}

/// Stable descending sort
fn sort_by_score(mut items: Vec<ScoredItem>) -> Vec<ScoredItem> {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    items
}

/// Result of running a scoring strategy over one pool
#[derive(Debug, Clone, Default)]
pub struct ScoringOutcome {
    pub items: Vec<ScoredItem>,
    /// Whether the external oracle contributed to this result
    pub guided: bool,
    pub warnings: Vec<String>,
}

/// Interchangeable way of scoring a candidate pool. Never fails: strategies
/// degrade to heuristic scoring and report what went wrong as warnings.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(
        &self,
        items: &[CandidateItem],
        interests: &[String],
        weather: &WeatherSnapshot,
    ) -> ScoringOutcome;
}

/// Plain full heuristic scoring
#[derive(Debug, Clone, Default)]
pub struct HeuristicStrategy {
    scorer: HeuristicScorer,
}

impl HeuristicStrategy {
    #[must_use]
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            scorer: HeuristicScorer::new(weights),
        }
    }
}

#[async_trait]
impl ScoringStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn score(
        &self,
        items: &[CandidateItem],
        interests: &[String],
        weather: &WeatherSnapshot,
    ) -> ScoringOutcome {
        ScoringOutcome {
            items: self
                .scorer
                .score(items, interests, weather, ScoringMode::Full),
            guided: false,
            warnings: Vec::new(),
        }
    }
}

/// External source of scoring guidance, typically an LLM
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Free-text guidance on how well the items suit the traveler
    async fn guidance(
        &self,
        items: &[CandidateItem],
        interests: &[String],
        weather: &WeatherSnapshot,
    ) -> Result<String>;
}

/// Scoring that requires a reachable oracle for full scoring
pub struct GuidedStrategy<O> {
    oracle: O,
    scorer: HeuristicScorer,
    timeout: Duration,
}

impl<O: ScoringOracle> GuidedStrategy<O> {
    pub fn new(oracle: O, weights: ScoringWeights, timeout: Duration) -> Self {
        Self {
            oracle,
            scorer: HeuristicScorer::new(weights),
            timeout,
        }
    }
}

#[async_trait]
impl<O: ScoringOracle> ScoringStrategy for GuidedStrategy<O> {
    fn name(&self) -> &'static str {
        "guided"
    }

    #[instrument(skip_all, fields(items = items.len()))]
    async fn score(
        &self,
        items: &[CandidateItem],
        interests: &[String],
        weather: &WeatherSnapshot,
    ) -> ScoringOutcome {
        if items.is_empty() {
            return ScoringOutcome::default();
        }

        let failure = match tokio::time::timeout(
            self.timeout,
            self.oracle.guidance(items, interests, weather),
        )
        .await
        {
            Ok(Ok(guidance)) => {
                debug!(chars = guidance.len(), "Received scoring guidance");
                return ScoringOutcome {
                    items: self
                        .scorer
                        .score(items, interests, weather, ScoringMode::Full),
                    guided: true,
                    warnings: Vec::new(),
                };
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "Data source unavailable: scoring oracle timed out after {}s",
                self.timeout.as_secs()
            ),
        };

        warn!("Scoring oracle failed, using reduced scoring: {}", failure);
        ScoringOutcome {
            items: self
                .scorer
                .score(items, interests, weather, ScoringMode::Reduced),
            guided: false,
            warnings: vec![format!("{failure} (used reduced scoring)")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TripScoutError;
    use crate::models::{ItemCategory, WeatherCondition};
    use rstest::rstest;

    fn sunny() -> WeatherSnapshot {
        WeatherSnapshot::new(WeatherCondition::Sunny).with_temperature("22°C")
    }

    fn rainy() -> WeatherSnapshot {
        WeatherSnapshot::new(WeatherCondition::Rainy).with_forecast("Showers")
    }

    fn interests(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn activity(name: &str, rating: f64, tags: &[&str]) -> CandidateItem {
        CandidateItem::new(name, ItemCategory::Activity, "Tour", rating)
            .with_tags(tags.iter().copied())
    }

    #[test]
    fn test_full_score_terms() {
        let scorer = HeuristicScorer::default();
        let tour = activity("Food Walking Tour", 4.6, &["food", "outdoor", "walking"]);

        // base 0.5 + tag 0.15 + name 0.1 + weather 0.1 + rating 0.1 = 0.95
        let score = scorer.score_item(&tour, &interests(&["food"]), &sunny(), ScoringMode::Full);
        assert!((score - 0.95).abs() < 1e-9);
    }

    #[rstest]
    #[case(WeatherCondition::Rainy, 0.6)]
    #[case(WeatherCondition::Cloudy, 0.6)]
    #[case(WeatherCondition::Sunny, 0.5)]
    #[case(WeatherCondition::Clear, 0.5)]
    fn test_indoor_bonus_in_poor_weather(
        #[case] condition: WeatherCondition,
        #[case] expected: f64,
    ) {
        let scorer = HeuristicScorer::default();
        let museum = activity("City Museum", 3.0, &["history", "indoor"]);
        let weather = WeatherSnapshot::new(condition);
        let score = scorer.score_item(&museum, &[], &weather, ScoringMode::Full);
        assert!((score - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(4.7, 0.6)]
    #[case(4.5, 0.6)]
    #[case(4.2, 0.55)]
    #[case(3.9, 0.5)]
    fn test_quality_bonus(#[case] rating: f64, #[case] expected: f64) {
        let scorer = HeuristicScorer::default();
        let item = activity("Plain", rating, &[]);
        let score = scorer.score_item(&item, &[], &WeatherSnapshot::default(), ScoringMode::Full);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_interest_match_is_case_insensitive_substring() {
        let scorer = HeuristicScorer::default();
        let item = activity("Gallery", 3.0, &["Fine Art"]);
        let score = scorer.score_item(
            &item,
            &interests(&["ART"]),
            &WeatherSnapshot::default(),
            ScoringMode::Full,
        );
        assert!((score - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_clamped() {
        let scorer = HeuristicScorer::default();
        let item = activity("Food Art Music", 5.0, &["food", "art", "music", "outdoor"]);
        let score = scorer.score_item(
            &item,
            &interests(&["food", "art", "music"]),
            &sunny(),
            ScoringMode::Full,
        );
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_reduced_mode_ignores_weather_and_rating() {
        let scorer = HeuristicScorer::default();
        let tour = activity("Food Walking Tour", 4.6, &["food", "outdoor"]);
        let score =
            scorer.score_item(&tour, &interests(&["food"]), &sunny(), ScoringMode::Reduced);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let scorer = HeuristicScorer::default();
        let items = vec![
            activity("First", 3.0, &[]),
            activity("Best", 3.0, &["food"]),
            activity("Second", 3.0, &[]),
        ];
        let scored = scorer.score(
            &items,
            &interests(&["food"]),
            &WeatherSnapshot::default(),
            ScoringMode::Full,
        );
        let names: Vec<&str> = scored.iter().map(ScoredItem::name).collect();
        assert_eq!(names, vec!["Best", "First", "Second"]);
        assert_eq!(scored.len(), items.len());
    }

    #[test]
    fn test_scores_never_drop_below_base() {
        let scorer = HeuristicScorer::default();
        let items = vec![activity("A", 0.0, &[]), activity("B", 1.0, &["x"])];
        for scored in scorer.score(&items, &interests(&["nothing"]), &rainy(), ScoringMode::Full) {
            assert!(scored.score >= 0.5 && scored.score <= 1.0);
        }
    }

    #[test]
    fn test_event_boost_reorders() {
        let scorer = HeuristicScorer::default();
        let festival = CandidateItem::new("Night Market", ItemCategory::Event, "Night Market", 3.0);
        let scored = vec![
            ScoredItem::new(activity("Museum", 3.0, &[]), 0.6),
            ScoredItem::new(festival, 0.5),
        ];
        let boosted = scorer.boost_events(scored);
        assert_eq!(boosted[0].name(), "Night Market");
        assert!((boosted[0].score - 0.7).abs() < 1e-9);
        assert!((boosted[1].score - 0.6).abs() < 1e-9);
    }

    struct FixedOracle(bool);

    #[async_trait]
    impl ScoringOracle for FixedOracle {
        async fn guidance(
            &self,
            _items: &[CandidateItem],
            _interests: &[String],
            _weather: &WeatherSnapshot,
        ) -> Result<String> {
            if self.0 {
                Ok("prioritise food".to_string())
            } else {
                Err(TripScoutError::data_source("connection refused"))
            }
        }
    }

    struct StalledOracle;

    #[async_trait]
    impl ScoringOracle for StalledOracle {
        async fn guidance(
            &self,
            _items: &[CandidateItem],
            _interests: &[String],
            _weather: &WeatherSnapshot,
        ) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_guided_strategy_success() {
        let strategy = GuidedStrategy::new(
            FixedOracle(true),
            ScoringWeights::default(),
            Duration::from_secs(5),
        );
        let items = vec![activity("Food Walking Tour", 4.6, &["food", "outdoor"])];
        let outcome = strategy.score(&items, &interests(&["food"]), &sunny()).await;
        assert!(outcome.guided);
        assert!(outcome.warnings.is_empty());
        assert!((outcome.items[0].score - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_guided_strategy_falls_back_on_error() {
        let strategy = GuidedStrategy::new(
            FixedOracle(false),
            ScoringWeights::default(),
            Duration::from_secs(5),
        );
        let items = vec![activity("Food Walking Tour", 4.6, &["food", "outdoor"])];
        let outcome = strategy.score(&items, &interests(&["food"]), &sunny()).await;
        assert!(!outcome.guided);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("connection refused"));
        assert!((outcome.items[0].score - 0.7).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guided_strategy_times_out() {
        let strategy =
            GuidedStrategy::new(StalledOracle, ScoringWeights::default(), Duration::from_secs(2));
        let items = vec![activity("Museum", 4.0, &["indoor"])];
        let outcome = strategy.score(&items, &[], &sunny()).await;
        assert!(!outcome.guided);
        assert!(outcome.warnings[0].contains("timed out"));
    }

    #[tokio::test]
    async fn test_heuristic_strategy_is_unguided() {
        let strategy = HeuristicStrategy::default();
        let items = vec![activity("Museum", 4.0, &["indoor"])];
        let outcome = strategy.score(&items, &[], &sunny()).await;
        assert!(!outcome.guided);
        assert_eq!(outcome.items.len(), 1);
    }
}
