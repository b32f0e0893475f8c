//! Trip plan assembly
//!
//! [`TripPlanner`] runs the whole pipeline for one request: fetch destination
//! data, score the candidate pools, build the itinerary, estimate costs,
//! compare travel modes and compute confidence. Each stage is announced on an
//! optional progress channel and the run can be cancelled between stages.
//!
//! Data source and scoring failures never abort a run. They fall back to the
//! static tables or reduced scoring and surface as warnings on the plan.

use crate::config::TripScoutConfig;
use crate::data_source::{
    DestinationDataSource, DestinationInfo, LlmDestinationSource, StaticDestinationSource,
};
use crate::llm::{LlmClient, LlmScoringOracle};
use crate::models::{ConfidenceLevel, PlanRequest, ScoredItem, TripParameters, TripPlan};
use crate::planning::{
    CostEstimator, DayTemplate, GuidedStrategy, HeuristicScorer, HeuristicStrategy,
    ItineraryOptimizer, OptimizerMode, ResetPolicy, ScoringStrategy, ScoringWeights,
    TravelComparator,
};
use crate::{Result, TripScoutError};
use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningStage {
    Start,
    FetchDestinationInfo,
    ScoreRestaurants,
    ScoreActivities,
    /// Only when festivals were found
    ScoreFestivals,
    BuildItinerary,
    ComputeCosts,
    /// Only when an origin was given
    CompareTravel,
    ComputeConfidence,
    Assemble,
    Done,
}

impl PlanningStage {
    /// Progress line shown to the user
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            PlanningStage::Start => "🧭 Starting trip planning...",
            PlanningStage::FetchDestinationInfo => "🔍 Gathering destination information...",
            PlanningStage::ScoreRestaurants => "🍽️ Scoring restaurants...",
            PlanningStage::ScoreActivities => "🎯 Scoring activities...",
            PlanningStage::ScoreFestivals => "🎉 Scoring festivals and events...",
            PlanningStage::BuildItinerary => "🗓️ Building your itinerary...",
            PlanningStage::ComputeCosts => "💰 Estimating costs...",
            PlanningStage::CompareTravel => "🚗 Comparing driving and flying...",
            PlanningStage::ComputeConfidence => "📊 Computing confidence...",
            PlanningStage::Assemble => "📦 Assembling your plan...",
            PlanningStage::Done => "✅ Trip plan ready!",
        }
    }
}

impl fmt::Display for PlanningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanningStage::Start => "start",
            PlanningStage::FetchDestinationInfo => "fetch destination info",
            PlanningStage::ScoreRestaurants => "score restaurants",
            PlanningStage::ScoreActivities => "score activities",
            PlanningStage::ScoreFestivals => "score festivals",
            PlanningStage::BuildItinerary => "build itinerary",
            PlanningStage::ComputeCosts => "compute costs",
            PlanningStage::CompareTravel => "compare travel",
            PlanningStage::ComputeConfidence => "compute confidence",
            PlanningStage::Assemble => "assemble",
            PlanningStage::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Progress notification streamed while planning
#[derive(Debug, Clone, PartialEq)]
pub enum PlanningEvent {
    Stage(PlanningStage),
    /// Recovered problem; planning continues
    Warning(String),
    /// Fatal problem; this is the last event of the run
    Failed(String),
    Completed { confidence: f64, days: usize },
}

/// Tunables for the pipeline
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub reset_policy: ResetPolicy,
    /// Fixed seed for the optimizer; `None` draws fresh entropy per run
    pub seed: Option<u64>,
    pub template: DayTemplate,
    pub fetch_timeout: Duration,
    pub confidence_threshold: f64,
    /// Added to the confidence score when the diversified optimizer ran
    pub confidence_boost: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            reset_policy: ResetPolicy::Reshuffle,
            seed: None,
            template: DayTemplate::default(),
            fetch_timeout: Duration::from_secs(30),
            confidence_threshold: crate::models::plan::HIGH_CONFIDENCE_THRESHOLD,
            confidence_boost: 0.05,
        }
    }
}

/// Streams events, tracks warnings and checks for cancellation
struct Progress {
    events: Option<mpsc::Sender<PlanningEvent>>,
    cancel: Option<watch::Receiver<bool>>,
    warnings: Vec<String>,
}

impl Progress {
    async fn emit(&self, event: PlanningEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver does not stop planning
            let _ = tx.send(event).await;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    async fn stage(&mut self, stage: PlanningStage) -> Result<()> {
        if self.is_cancelled() {
            info!(%stage, "Planning cancelled");
            return Err(TripScoutError::cancelled(stage.to_string()));
        }
        debug!(%stage, "Entering stage");
        self.emit(PlanningEvent::Stage(stage)).await;
        Ok(())
    }

    async fn warn(&mut self, message: String) {
        warn!("{message}");
        self.emit(PlanningEvent::Warning(message.clone())).await;
        self.warnings.push(message);
    }
}

/// Runs the planning pipeline. Holds no per-request state, so one planner
/// can serve concurrent requests.
pub struct TripPlanner {
    source: Box<dyn DestinationDataSource>,
    fallback: StaticDestinationSource,
    scoring: Box<dyn ScoringStrategy>,
    weights: ScoringWeights,
    estimator: CostEstimator,
    comparator: TravelComparator,
    settings: PlannerSettings,
}

impl Default for TripPlanner {
    fn default() -> Self {
        Self::new(StaticDestinationSource::default())
    }
}

impl TripPlanner {
    /// Planner with heuristic scoring and default settings
    pub fn new<S: DestinationDataSource + 'static>(source: S) -> Self {
        Self {
            source: Box::new(source),
            fallback: StaticDestinationSource::default(),
            scoring: Box::new(HeuristicStrategy::default()),
            weights: ScoringWeights::default(),
            estimator: CostEstimator::default(),
            comparator: TravelComparator::default(),
            settings: PlannerSettings::default(),
        }
    }

    /// Build a planner from configuration; LLM-backed collaborators are used
    /// only when `llm.enabled` is set.
    pub fn from_config(config: &TripScoutConfig) -> Result<Self> {
        let planner_config = &config.planner;
        let weights = ScoringWeights::from(&config.scoring);
        let fallback =
            StaticDestinationSource::new(planner_config.festival_probability, planner_config.seed);

        let template = if planner_config.extended_day {
            DayTemplate::extended()
        } else {
            DayTemplate::default()
        };
        let settings = PlannerSettings {
            reset_policy: planner_config.reset_policy()?,
            seed: planner_config.seed,
            template,
            fetch_timeout: planner_config.data_source_timeout(),
            confidence_threshold: planner_config.confidence_threshold,
            confidence_boost: planner_config.confidence_boost,
        };

        let planner = if config.llm.enabled {
            let client = LlmClient::from_config(&config.llm)?;
            info!(model = client.model(), "Using LLM destination data and guided scoring");
            Self::new(LlmDestinationSource::new(client.clone())).with_scoring(GuidedStrategy::new(
                LlmScoringOracle::new(client),
                weights,
                planner_config.scoring_timeout(),
            ))
        } else {
            Self::new(fallback.clone()).with_scoring(HeuristicStrategy::new(weights))
        };

        Ok(planner
            .with_fallback(fallback)
            .with_weights(weights)
            .with_settings(settings))
    }

    #[must_use]
    pub fn with_scoring<S: ScoringStrategy + 'static>(mut self, scoring: S) -> Self {
        self.scoring = Box::new(scoring);
        self
    }

    /// Static source used when the primary source fails
    #[must_use]
    pub fn with_fallback(mut self, fallback: StaticDestinationSource) -> Self {
        self.fallback = fallback;
        self
    }

    /// Weights for the festival boost; scoring strategies carry their own
    #[must_use]
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: PlannerSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Plan without progress reporting or cancellation
    pub async fn plan(&self, request: &PlanRequest) -> Result<TripPlan> {
        let mut progress = Progress {
            events: None,
            cancel: None,
            warnings: Vec::new(),
        };
        self.run(request, &mut progress).await
    }

    /// Plan while streaming [`PlanningEvent`]s. Setting `cancel` to `true`
    /// stops the run at the next stage boundary with
    /// [`TripScoutError::Cancelled`].
    pub async fn plan_with_progress(
        &self,
        request: &PlanRequest,
        events: mpsc::Sender<PlanningEvent>,
        cancel: watch::Receiver<bool>,
    ) -> Result<TripPlan> {
        let mut progress = Progress {
            events: Some(events),
            cancel: Some(cancel),
            warnings: Vec::new(),
        };
        self.run(request, &mut progress).await
    }

    async fn run(&self, request: &PlanRequest, progress: &mut Progress) -> Result<TripPlan> {
        match self.pipeline(request, progress).await {
            Ok(plan) => {
                progress
                    .emit(PlanningEvent::Completed {
                        confidence: plan.confidence,
                        days: plan.itinerary.len(),
                    })
                    .await;
                Ok(plan)
            }
            Err(e) => {
                warn!(error = %e, "Planning failed");
                progress.emit(PlanningEvent::Failed(e.user_message())).await;
                Err(e)
            }
        }
    }

    #[instrument(skip_all, fields(destination = %request.destination))]
    async fn pipeline(&self, request: &PlanRequest, progress: &mut Progress) -> Result<TripPlan> {
        progress.stage(PlanningStage::Start).await?;
        let params = request.validate()?;

        progress.stage(PlanningStage::FetchDestinationInfo).await?;
        let info = self.fetch_destination_info(&params, progress).await;
        if info.activities.is_empty() {
            progress
                .warn(TripScoutError::empty_pool("activities").to_string())
                .await;
        }
        if info.restaurants.is_empty() {
            progress
                .warn(TripScoutError::empty_pool("restaurants").to_string())
                .await;
        }

        progress.stage(PlanningStage::ScoreRestaurants).await?;
        progress.stage(PlanningStage::ScoreActivities).await?;
        let (restaurant_outcome, activity_outcome) = tokio::join!(
            self.scoring
                .score(&info.restaurants, &params.interests, &info.weather),
            self.scoring
                .score(&info.activities, &params.interests, &info.weather),
        );
        let guided = restaurant_outcome.guided || activity_outcome.guided;
        for warning in restaurant_outcome
            .warnings
            .into_iter()
            .chain(activity_outcome.warnings)
        {
            progress.warn(warning).await;
        }
        let restaurants = restaurant_outcome.items;
        let mut activities = activity_outcome.items;

        let mut festivals = Vec::new();
        if !info.festivals.is_empty() {
            progress.stage(PlanningStage::ScoreFestivals).await?;
            let outcome = self
                .scoring
                .score(&info.festivals, &params.interests, &info.weather)
                .await;
            for warning in outcome.warnings {
                progress.warn(warning).await;
            }
            festivals = HeuristicScorer::new(self.weights).boost_events(outcome.items);
            activities = merge_by_score(activities, festivals.clone());
        }

        progress.stage(PlanningStage::BuildItinerary).await?;
        let mode = if guided {
            OptimizerMode::Diversified
        } else {
            OptimizerMode::Standard
        };
        let itinerary = ItineraryOptimizer::new(self.settings.reset_policy, self.settings.seed)
            .with_template(self.settings.template.clone())
            .with_mode(mode)
            .with_outdoor_preference(!info.weather.condition.is_poor())
            .optimize(&activities, &restaurants, &params.dates);

        progress.stage(PlanningStage::ComputeCosts).await?;
        let costs = self.estimator.estimate(
            &params.destination,
            &params.dates,
            params.budget_tier,
            params.travelers,
            params.include_lodging,
        )?;

        let travel = match &params.origin {
            Some(origin) => {
                progress.stage(PlanningStage::CompareTravel).await?;
                Some(
                    self.comparator
                        .compare(origin, &params.destination, params.travelers)?,
                )
            }
            None => None,
        };

        progress.stage(PlanningStage::ComputeConfidence).await?;
        let confidence = confidence_score(
            &restaurants,
            &activities,
            mode,
            self.settings.confidence_boost,
        );
        let confidence_level =
            ConfidenceLevel::from_score(confidence, self.settings.confidence_threshold);

        progress.stage(PlanningStage::Assemble).await?;
        let TripParameters {
            destination,
            dates,
            interests,
            budget_tier,
            travelers,
            include_lodging,
            origin,
        } = params;
        let total_cost = costs.total();
        let plan = TripPlan {
            destination,
            dates,
            interests,
            weather: info.weather,
            restaurants,
            activities,
            festivals,
            itinerary,
            confidence,
            confidence_level,
            budget_tier,
            travelers,
            include_lodging,
            costs,
            total_cost,
            origin,
            travel,
            warnings: std::mem::take(&mut progress.warnings),
            generated_at: Utc::now(),
        };

        progress.stage(PlanningStage::Done).await?;
        info!(
            days = plan.itinerary.len(),
            confidence = plan.confidence,
            total_cost = plan.total_cost,
            warnings = plan.warnings.len(),
            "Trip plan assembled"
        );
        Ok(plan)
    }

    /// Fetch from the primary source, falling back to static data on error
    /// or timeout
    async fn fetch_destination_info(
        &self,
        params: &TripParameters,
        progress: &mut Progress,
    ) -> DestinationInfo {
        let fetch = self
            .source
            .fetch(&params.destination, &params.interests, &params.dates);

        let failure = match tokio::time::timeout(self.settings.fetch_timeout, fetch).await {
            Ok(Ok(info)) => {
                debug!(source = self.source.name(), "Destination info fetched");
                return info;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => TripScoutError::data_source(format!(
                "{} source timed out after {}s",
                self.source.name(),
                self.settings.fetch_timeout.as_secs()
            ))
            .to_string(),
        };

        progress
            .warn(format!("{failure} (used fallback data)"))
            .await;
        self.fallback
            .destination_info(&params.destination, &params.dates)
    }
}

/// Merge two pools and re-sort best first; ties keep `base` items ahead
fn merge_by_score(base: Vec<ScoredItem>, extra: Vec<ScoredItem>) -> Vec<ScoredItem> {
    let mut merged = base;
    merged.extend(extra);
    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged
}

/// Average score over every scored item, boosted in diversified mode.
/// Empty pools give `0.0`.
#[must_use]
pub fn confidence_score(
    restaurants: &[ScoredItem],
    activities: &[ScoredItem],
    mode: OptimizerMode,
    boost: f64,
) -> f64 {
    let count = restaurants.len() + activities.len();
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = restaurants
        .iter()
        .chain(activities)
        .map(|item| item.score)
        .sum();
    let mut confidence = sum / count as f64;
    if mode == OptimizerMode::Diversified {
        confidence += boost;
    }
    confidence.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CandidateItem, ItemCategory, Slot, SlotAssignment, WeatherCondition, WeatherSnapshot,
    };
    use crate::planning::ScoringOracle;
    use async_trait::async_trait;
    use rstest::rstest;

    fn request() -> PlanRequest {
        PlanRequest {
            destination: "Paris, France".to_string(),
            start_date: "2025-09-01".to_string(),
            end_date: "2025-09-05".to_string(),
            interests: vec!["food".to_string(), "art".to_string()],
            budget_tier: "mid".to_string(),
            travelers: 2,
            include_lodging: true,
            origin: None,
        }
    }

    fn seeded_settings() -> PlannerSettings {
        PlannerSettings {
            seed: Some(11),
            ..PlannerSettings::default()
        }
    }

    fn planner() -> TripPlanner {
        TripPlanner::new(StaticDestinationSource::new(0.0, Some(11)))
            .with_settings(seeded_settings())
    }

    struct FailingSource;

    #[async_trait]
    impl DestinationDataSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(
            &self,
            _destination: &str,
            _interests: &[String],
            _dates: &crate::models::DateRange,
        ) -> Result<DestinationInfo> {
            Err(TripScoutError::data_source("search API returned 503"))
        }
    }

    struct StalledSource;

    #[async_trait]
    impl DestinationDataSource for StalledSource {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn fetch(
            &self,
            _destination: &str,
            _interests: &[String],
            _dates: &crate::models::DateRange,
        ) -> Result<DestinationInfo> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(TripScoutError::data_source("unreachable"))
        }
    }

    struct EmptySource;

    #[async_trait]
    impl DestinationDataSource for EmptySource {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn fetch(
            &self,
            _destination: &str,
            _interests: &[String],
            _dates: &crate::models::DateRange,
        ) -> Result<DestinationInfo> {
            Ok(DestinationInfo {
                weather: StaticDestinationSource::weather(),
                ..DestinationInfo::default()
            })
        }
    }

    /// Static listings under a fixed sky
    struct WeatherSource(WeatherCondition);

    #[async_trait]
    impl DestinationDataSource for WeatherSource {
        fn name(&self) -> &'static str {
            "weather"
        }

        async fn fetch(
            &self,
            _destination: &str,
            _interests: &[String],
            _dates: &crate::models::DateRange,
        ) -> Result<DestinationInfo> {
            Ok(DestinationInfo {
                weather: WeatherSnapshot::new(self.0.clone()),
                restaurants: StaticDestinationSource::restaurants(),
                activities: StaticDestinationSource::activities(),
                festivals: Vec::new(),
            })
        }
    }

    struct AgreeableOracle;

    #[async_trait]
    impl ScoringOracle for AgreeableOracle {
        async fn guidance(
            &self,
            _items: &[CandidateItem],
            _interests: &[String],
            _weather: &WeatherSnapshot,
        ) -> Result<String> {
            Ok("All good choices".to_string())
        }
    }

    #[tokio::test]
    async fn test_plan_covers_every_day() {
        let plan = planner().plan(&request()).await.unwrap();

        assert_eq!(plan.itinerary.len(), 5);
        assert_eq!(plan.restaurants.len(), 7);
        assert_eq!(plan.activities.len(), 12);
        assert!(plan.festivals.is_empty());
        assert!(plan.travel.is_none());
        assert!(plan.warnings.is_empty());
        assert!(plan.costs.lodging.is_some());
        assert!((plan.total_cost - plan.costs.total()).abs() < 1e-9);
        for day in plan.itinerary.iter() {
            assert!(day.get(Slot::Morning).is_some());
            assert!(day.get(Slot::Evening).is_some());
        }
    }

    #[tokio::test]
    async fn test_scores_are_sorted_and_bounded() {
        let plan = planner().plan(&request()).await.unwrap();
        for pool in [&plan.restaurants, &plan.activities] {
            assert!(pool.windows(2).all(|w| w[0].score >= w[1].score));
            assert!(pool.iter().all(|s| (0.0..=1.0).contains(&s.score)));
        }
        assert!((0.0..=1.0).contains(&plan.confidence));
    }

    #[rstest]
    #[case(WeatherCondition::Cloudy)]
    #[case(WeatherCondition::Rainy)]
    #[tokio::test]
    async fn test_poor_weather_favours_indoor(#[case] condition: WeatherCondition) {
        let planner = TripPlanner::new(WeatherSource(condition)).with_settings(seeded_settings());
        let plan = planner.plan(&request()).await.unwrap();

        let score_of = |name: &str| {
            plan.activities
                .iter()
                .find(|s| s.name() == name)
                .map(|s| s.score)
                .unwrap()
        };
        assert!((score_of("Art Gallery") - 0.95).abs() < 1e-9);
        assert!((score_of("City Museum") - 0.65).abs() < 1e-9);
        assert!((score_of("Food Walking Tour") - 0.85).abs() < 1e-9);
        assert_eq!(plan.activities[0].name(), "Art Gallery");

        let first_day = plan.itinerary.iter().next().unwrap();
        assert_eq!(
            first_day.get(Slot::Morning).map(SlotAssignment::title).as_deref(),
            Some("Art Gallery")
        );
    }

    #[tokio::test]
    async fn test_fair_weather_morning_goes_outdoor() {
        let planner = TripPlanner::new(WeatherSource(WeatherCondition::Sunny))
            .with_settings(seeded_settings());
        let plan = planner.plan(&request()).await.unwrap();

        let first_day = plan.itinerary.iter().next().unwrap();
        assert_eq!(
            first_day.get(Slot::Morning).map(SlotAssignment::title).as_deref(),
            Some("Food Walking Tour")
        );
    }

    #[tokio::test]
    async fn test_invalid_tier_aborts_before_planning() {
        let mut req = request();
        req.budget_tier = "premium".to_string();
        let err = planner().plan(&req).await.unwrap_err();
        assert!(matches!(err, TripScoutError::InvalidBudgetTier { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_failing_source_uses_fallback() {
        let planner = TripPlanner::new(FailingSource)
            .with_fallback(StaticDestinationSource::new(0.0, Some(1)))
            .with_settings(seeded_settings());
        let plan = planner.plan(&request()).await.unwrap();

        assert_eq!(plan.activities.len(), 12);
        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("503"));
        assert!(plan.warnings[0].contains("used fallback data"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_source_times_out_to_fallback() {
        let planner = TripPlanner::new(StalledSource)
            .with_fallback(StaticDestinationSource::new(0.0, Some(1)))
            .with_settings(PlannerSettings {
                fetch_timeout: Duration::from_secs(5),
                ..seeded_settings()
            });
        let plan = planner.plan(&request()).await.unwrap();

        assert_eq!(plan.restaurants.len(), 7);
        assert!(plan.warnings[0].contains("timed out"));
    }

    #[tokio::test]
    async fn test_empty_pools_are_recovered() {
        let planner = TripPlanner::new(EmptySource).with_settings(seeded_settings());
        let plan = planner.plan(&request()).await.unwrap();

        assert_eq!(plan.itinerary.len(), 5);
        assert_eq!(plan.confidence, 0.0);
        assert_eq!(plan.confidence_level, ConfidenceLevel::Low);
        assert!(plan.warnings.iter().any(|w| w.contains("activities")));
        assert!(plan.warnings.iter().any(|w| w.contains("restaurants")));
        assert!(plan.itinerary.iter().all(|day| day.slots.is_empty()));
    }

    #[tokio::test]
    async fn test_festivals_are_boosted_and_merged() {
        let planner = TripPlanner::new(StaticDestinationSource::new(1.0, Some(4)))
            .with_settings(seeded_settings());
        let mut req = request();
        req.end_date = "2025-09-20".to_string();
        let plan = planner.plan(&req).await.unwrap();

        assert!(!plan.festivals.is_empty());
        assert_eq!(plan.activities.len(), 12 + plan.festivals.len());
        for festival in &plan.festivals {
            assert!(plan.activities.iter().any(|a| a.name() == festival.name()));
            assert!(festival.score >= 0.5 + 0.2 - 1e-9 || festival.score == 1.0);
        }
        assert_eq!(plan.regular_activities().count(), 12);
    }

    #[tokio::test]
    async fn test_guided_scoring_boosts_confidence() {
        let weights = ScoringWeights::default();
        let heuristic = planner().plan(&request()).await.unwrap();
        let guided = planner()
            .with_scoring(GuidedStrategy::new(
                AgreeableOracle,
                weights,
                Duration::from_secs(5),
            ))
            .plan(&request())
            .await
            .unwrap();

        let expected = (heuristic.confidence + 0.05).min(1.0);
        assert!((guided.confidence - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_origin_adds_travel_comparison() {
        let mut req = request();
        req.destination = "St Thomas".to_string();
        req.origin = Some("Charleston".to_string());
        let plan = planner().plan(&req).await.unwrap();

        let travel = plan.travel.unwrap();
        assert!(!travel.driving.available);
        assert_eq!(travel.recommendation.preferred, crate::models::TravelMode::Flying);
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let (tx, mut rx) = mpsc::channel(64);
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let mut req = request();
        req.origin = Some("New York".to_string());
        planner().plan_with_progress(&req, tx, cancel_rx).await.unwrap();

        let mut stages = Vec::new();
        let mut completed = false;
        while let Some(event) = rx.recv().await {
            match event {
                PlanningEvent::Stage(stage) => stages.push(stage),
                PlanningEvent::Completed { days, .. } => {
                    assert_eq!(days, 5);
                    completed = true;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(completed);
        assert_eq!(
            stages,
            vec![
                PlanningStage::Start,
                PlanningStage::FetchDestinationInfo,
                PlanningStage::ScoreRestaurants,
                PlanningStage::ScoreActivities,
                PlanningStage::BuildItinerary,
                PlanningStage::ComputeCosts,
                PlanningStage::CompareTravel,
                PlanningStage::ComputeConfidence,
                PlanningStage::Assemble,
                PlanningStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_with_error() {
        let (tx, mut rx) = mpsc::channel(64);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        cancel_tx.send(true).unwrap();

        let err = planner()
            .plan_with_progress(&request(), tx, cancel_rx)
            .await
            .unwrap_err();
        assert!(matches!(err, TripScoutError::Cancelled { .. }));

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PlanningEvent::Failed(_)));
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_stop_planning() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let plan = planner().plan_with_progress(&request(), tx, cancel_rx).await;
        assert!(plan.is_ok());
    }

    #[test]
    fn test_confidence_score() {
        let item = |score| {
            ScoredItem::new(
                CandidateItem::new("x", ItemCategory::Activity, "Tour", 4.0),
                score,
            )
        };
        let restaurants = vec![item(0.6), item(0.8)];
        let activities = vec![item(1.0)];

        let standard = confidence_score(&restaurants, &activities, OptimizerMode::Standard, 0.05);
        assert!((standard - 0.8).abs() < 1e-9);
        let diversified =
            confidence_score(&restaurants, &activities, OptimizerMode::Diversified, 0.05);
        assert!((diversified - 0.85).abs() < 1e-9);
        assert_eq!(
            confidence_score(&[], &[item(0.99)], OptimizerMode::Diversified, 0.05),
            1.0
        );
        assert_eq!(confidence_score(&[], &[], OptimizerMode::Standard, 0.05), 0.0);
    }
}
