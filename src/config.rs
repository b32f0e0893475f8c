//! Configuration management for `TripScout`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripScoutError;
use crate::models::BudgetTier;
use crate::planning::{ResetPolicy, ScoringWeights};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for `TripScout`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripScoutConfig {
    /// Pipeline settings
    pub planner: PlannerConfig,
    /// Heuristic scoring weights
    pub scoring: ScoringConfig,
    /// LLM endpoint used for destination data and guided scoring
    pub llm: LlmConfig,
    /// Email and push delivery
    pub notifications: NotificationsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Planning pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Budget tier used when the caller gives none
    #[serde(default = "default_budget_tier")]
    pub default_budget_tier: String,
    #[serde(default = "default_travelers")]
    pub default_travelers: u32,
    /// Score at or above which a plan counts as high confidence
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Added to the confidence score when the diversified optimizer ran
    #[serde(default = "default_confidence_boost")]
    pub confidence_boost: f64,
    /// Pool reset policy (reshuffle or round_robin)
    #[serde(default = "default_reset_policy")]
    pub reset_policy: String,
    /// Fixed RNG seed for reproducible itineraries
    #[serde(default)]
    pub seed: Option<u64>,
    /// Destination data fetch timeout in seconds
    #[serde(default = "default_data_source_timeout")]
    pub data_source_timeout_seconds: u32,
    /// Scoring oracle timeout in seconds
    #[serde(default = "default_scoring_timeout")]
    pub scoring_timeout_seconds: u32,
    /// Chance that the static source generates festivals
    #[serde(default = "default_festival_probability")]
    pub festival_probability: f64,
    /// Use the five-slot day (adds lunch and late afternoon)
    #[serde(default)]
    pub extended_day: bool,
}

/// Heuristic scoring weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_base_score")]
    pub base: f64,
    #[serde(default = "default_tag_match")]
    pub tag_match: f64,
    #[serde(default = "default_name_match")]
    pub name_match: f64,
    #[serde(default = "default_weather_match")]
    pub weather_match: f64,
    /// Bonus for ratings of 4.5 and above
    #[serde(default = "default_top_rating")]
    pub top_rating: f64,
    /// Bonus for ratings of 4.0 and above
    #[serde(default = "default_good_rating")]
    pub good_rating: f64,
    #[serde(default = "default_event_boost")]
    pub event_boost: f64,
    /// Per-interest bonus when scoring falls back to the reduced heuristic
    #[serde(default = "default_reduced_tag_match")]
    pub reduced_tag_match: f64,
}

/// OpenAI-compatible LLM endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,
    pub api_key: Option<String>,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_llm_max_retries")]
    pub max_retries: u32,
}

/// Email and push notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_smtp_relay")]
    pub smtp_relay: String,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address; defaults to the SMTP username
    pub from_address: Option<String>,
    #[serde(default = "default_pushover_endpoint")]
    pub pushover_endpoint: String,
    pub pushover_user_key: Option<String>,
    pub pushover_api_token: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_budget_tier() -> String {
    "mid".to_string()
}

fn default_travelers() -> u32 {
    1
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_confidence_boost() -> f64 {
    0.05
}

fn default_reset_policy() -> String {
    "reshuffle".to_string()
}

fn default_data_source_timeout() -> u32 {
    30
}

fn default_scoring_timeout() -> u32 {
    20
}

fn default_festival_probability() -> f64 {
    0.4
}

fn default_base_score() -> f64 {
    0.5
}

fn default_tag_match() -> f64 {
    0.15
}

fn default_name_match() -> f64 {
    0.1
}

fn default_weather_match() -> f64 {
    0.1
}

fn default_top_rating() -> f64 {
    0.1
}

fn default_good_rating() -> f64 {
    0.05
}

fn default_event_boost() -> f64 {
    0.2
}

fn default_reduced_tag_match() -> f64 {
    0.2
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u32 {
    30
}

fn default_llm_max_retries() -> u32 {
    3
}

fn default_smtp_relay() -> String {
    "smtp.gmail.com".to_string()
}

fn default_pushover_endpoint() -> String {
    "https://api.pushover.net/1/messages.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_budget_tier: default_budget_tier(),
            default_travelers: default_travelers(),
            confidence_threshold: default_confidence_threshold(),
            confidence_boost: default_confidence_boost(),
            reset_policy: default_reset_policy(),
            seed: None,
            data_source_timeout_seconds: default_data_source_timeout(),
            scoring_timeout_seconds: default_scoring_timeout(),
            festival_probability: default_festival_probability(),
            extended_day: false,
        }
    }
}

impl PlannerConfig {
    /// Parsed reset policy; `validate` guarantees this succeeds after loading
    pub fn reset_policy(&self) -> crate::Result<ResetPolicy> {
        self.reset_policy.parse()
    }

    #[must_use]
    pub fn data_source_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.data_source_timeout_seconds))
    }

    #[must_use]
    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.scoring_timeout_seconds))
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: default_base_score(),
            tag_match: default_tag_match(),
            name_match: default_name_match(),
            weather_match: default_weather_match(),
            top_rating: default_top_rating(),
            good_rating: default_good_rating(),
            event_boost: default_event_boost(),
            reduced_tag_match: default_reduced_tag_match(),
        }
    }
}

impl ScoringConfig {
    fn named_weights(&self) -> [(&'static str, f64); 8] {
        [
            ("base", self.base),
            ("tag_match", self.tag_match),
            ("name_match", self.name_match),
            ("weather_match", self.weather_match),
            ("top_rating", self.top_rating),
            ("good_rating", self.good_rating),
            ("event_boost", self.event_boost),
            ("reduced_tag_match", self.reduced_tag_match),
        ]
    }
}

impl From<&ScoringConfig> for ScoringWeights {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            base: config.base,
            tag_match: config.tag_match,
            name_match: config.name_match,
            weather_match: config.weather_match,
            top_rating: config.top_rating,
            good_rating: config.good_rating,
            event_boost: config.event_boost,
            reduced_tag_match: config.reduced_tag_match,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
            max_retries: default_llm_max_retries(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            smtp_relay: default_smtp_relay(),
            smtp_username: None,
            smtp_password: None,
            from_address: None,
            pushover_endpoint: default_pushover_endpoint(),
            pushover_user_key: None,
            pushover_api_token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TripScoutConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPSCOUT_LLM__API_KEY -> llm.api_key
        builder = builder.add_source(
            Environment::with_prefix("TRIPSCOUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripScoutConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripscout").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.planner.default_budget_tier.is_empty() {
            self.planner.default_budget_tier = default_budget_tier();
        }
        if self.planner.default_travelers == 0 {
            self.planner.default_travelers = default_travelers();
        }
        if self.planner.reset_policy.is_empty() {
            self.planner.reset_policy = default_reset_policy();
        }
        if self.planner.data_source_timeout_seconds == 0 {
            self.planner.data_source_timeout_seconds = default_data_source_timeout();
        }
        if self.planner.scoring_timeout_seconds == 0 {
            self.planner.scoring_timeout_seconds = default_scoring_timeout();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.notifications.smtp_relay.is_empty() {
            self.notifications.smtp_relay = default_smtp_relay();
        }
        if self.notifications.pushover_endpoint.is_empty() {
            self.notifications.pushover_endpoint = default_pushover_endpoint();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if self.llm.enabled {
            match self.llm.api_key.as_deref().map(str::trim) {
                None | Some("") => {
                    return Err(TripScoutError::config(
                        "LLM is enabled but no API key is set. Set llm.api_key or TRIPSCOUT_LLM__API_KEY.",
                    )
                    .into());
                }
                Some(key) if key.len() < 8 => {
                    return Err(TripScoutError::config(
                        "LLM API key appears to be invalid (too short). Please check your API key.",
                    )
                    .into());
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let planner = &self.planner;
        if !(0.0..=1.0).contains(&planner.confidence_threshold) {
            return Err(
                TripScoutError::config("Confidence threshold must be between 0 and 1").into(),
            );
        }

        if !(0.0..=1.0).contains(&planner.confidence_boost) {
            return Err(TripScoutError::config("Confidence boost must be between 0 and 1").into());
        }

        if !(0.0..=1.0).contains(&planner.festival_probability) {
            return Err(
                TripScoutError::config("Festival probability must be between 0 and 1").into(),
            );
        }

        if planner.default_travelers > 50 {
            return Err(TripScoutError::config("Default travelers cannot exceed 50").into());
        }

        if planner.data_source_timeout_seconds > 300 || planner.scoring_timeout_seconds > 300 {
            return Err(TripScoutError::config("Planner timeouts cannot exceed 300 seconds").into());
        }

        if self.llm.timeout_seconds > 300 {
            return Err(TripScoutError::config("LLM API timeout cannot exceed 300 seconds").into());
        }

        if self.llm.max_retries > 10 {
            return Err(TripScoutError::config("LLM API max retries cannot exceed 10").into());
        }

        for (name, weight) in self.scoring.named_weights() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(TripScoutError::config(format!(
                    "Scoring weight '{name}' must be between 0 and 1, got {weight}"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        self.planner
            .default_budget_tier
            .parse::<BudgetTier>()
            .with_context(|| "Invalid planner.default_budget_tier")?;
        self.planner
            .reset_policy()
            .with_context(|| "Invalid planner.reset_policy")?;

        for (name, url) in [
            ("LLM API base URL", &self.llm.base_url),
            ("Pushover endpoint", &self.notifications.pushover_endpoint),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripScoutError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
