//! OpenAI-compatible chat completions client
//!
//! Used by the LLM-backed destination source and the scoring oracle.
//! Transient failures are retried with exponential backoff; every other
//! failure is reported as [`TripScoutError::DataSourceUnavailable`] so
//! callers can fall back to static data or reduced scoring.

use crate::config::LlmConfig;
use crate::models::{CandidateItem, WeatherSnapshot};
use crate::planning::ScoringOracle;
use crate::{Result, TripScoutError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client with retrying transport
#[derive(Clone)]
pub struct LlmClient {
    http: ClientWithMiddleware,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Build a client; fails when no API key is configured
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TripScoutError::config("LLM API key is not configured"))?
            .to_string();

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("tripscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TripScoutError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let http = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the reply text
    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
        };
        let body = serde_json::to_vec(&request).map_err(|e| {
            TripScoutError::data_source(format!("Failed to encode LLM request: {e}"))
        })?;

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, prompt_chars = prompt.len(), "Sending chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TripScoutError::data_source(format!("LLM request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TripScoutError::data_source(format!(
                "LLM API error {status}: {error_text}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| {
                TripScoutError::data_source(format!("Failed to parse LLM response: {e}"))
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| TripScoutError::data_source("LLM returned an empty reply"))?;

        info!(reply_chars = content.len(), "Received chat completion");
        Ok(content)
    }
}

/// Asks the LLM to rank candidates before heuristic scoring
pub struct LlmScoringOracle {
    client: LlmClient,
}

impl LlmScoringOracle {
    #[must_use]
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

const SCORING_SYSTEM_PROMPT: &str = "You are a travel planning assistant. \
    Given a traveler's interests, the weather and a list of candidate places, \
    briefly explain which candidates suit the traveler best and why.";

/// User prompt listing the candidates to be judged
pub(crate) fn scoring_prompt(
    items: &[CandidateItem],
    interests: &[String],
    weather: &WeatherSnapshot,
) -> String {
    let mut prompt = format!(
        "Interests: {}\nWeather: {} ({})\nCandidates:\n",
        interests.join(", "),
        weather.condition,
        weather.temperature
    );
    for item in items {
        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        prompt.push_str(&format!(
            "- {} [{}] rating {:.1}, tags: {}\n",
            item.name,
            item.kind,
            item.rating,
            tags.join(", ")
        ));
    }
    prompt
}

#[async_trait]
impl ScoringOracle for LlmScoringOracle {
    async fn guidance(
        &self,
        items: &[CandidateItem],
        interests: &[String],
        weather: &WeatherSnapshot,
    ) -> Result<String> {
        let prompt = scoring_prompt(items, interests, weather);
        self.client.complete(SCORING_SYSTEM_PROMPT, &prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCategory, WeatherCondition};

    fn llm_config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(str::to_string),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        let err = LlmClient::from_config(&llm_config(None)).unwrap_err();
        assert!(matches!(err, TripScoutError::Config { .. }));

        let err = LlmClient::from_config(&llm_config(Some("   "))).unwrap_err();
        assert!(matches!(err, TripScoutError::Config { .. }));
    }

    #[test]
    fn test_client_trims_base_url() {
        let mut config = llm_config(Some("sk-test-key"));
        config.base_url = "https://api.example.com/v1/".to_string();
        let client = LlmClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1");
        assert_eq!(client.model(), config.model);
    }

    #[test]
    fn test_scoring_prompt_lists_candidates() {
        let items = vec![
            CandidateItem::new("City Museum", ItemCategory::Activity, "Cultural", 4.4)
                .with_tags(["history", "indoor"]),
        ];
        let weather = WeatherSnapshot::new(WeatherCondition::Sunny).with_temperature("22°C");
        let prompt = scoring_prompt(&items, &["history".to_string()], &weather);

        assert!(prompt.contains("Interests: history"));
        assert!(prompt.contains("Weather: Sunny (22°C)"));
        assert!(prompt.contains("- City Museum [Cultural] rating 4.4, tags: history, indoor"));
    }
}
