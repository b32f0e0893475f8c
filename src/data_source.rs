//! Destination data sources
//!
//! A data source supplies the weather and the restaurant, activity and
//! festival candidates for a destination. [`StaticDestinationSource`] never
//! fails and is the fallback whenever a live source errors or times out.

use crate::llm::LlmClient;
use crate::models::{
    CandidateItem, DateRange, EventWindow, ItemCategory, WeatherCondition, WeatherSnapshot,
};
use crate::{Result, TripScoutError};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngExt, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Everything a data source knows about a destination
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationInfo {
    pub weather: WeatherSnapshot,
    pub restaurants: Vec<CandidateItem>,
    pub activities: Vec<CandidateItem>,
    /// Time-bound events inside the trip window
    pub festivals: Vec<CandidateItem>,
}

#[async_trait]
pub trait DestinationDataSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(
        &self,
        destination: &str,
        interests: &[String],
        dates: &DateRange,
    ) -> Result<DestinationInfo>;
}

struct FestivalTemplate {
    name: &'static str,
    kind: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    rating: f64,
    duration_days: u32,
    cost: f64,
}

const FESTIVAL_TEMPLATES: &[FestivalTemplate] = &[
    FestivalTemplate {
        name: "{destination} Food Festival",
        kind: "Food Festival",
        description: "Annual celebration of local cuisine",
        tags: &["food", "outdoor", "culture", "festival"],
        rating: 4.5,
        duration_days: 3,
        cost: 30.0,
    },
    FestivalTemplate {
        name: "Summer Music Festival",
        kind: "Music Festival",
        description: "Multi-day outdoor music event",
        tags: &["music", "outdoor", "entertainment", "festival"],
        rating: 4.6,
        duration_days: 2,
        cost: 85.0,
    },
    FestivalTemplate {
        name: "Art & Culture Week",
        kind: "Cultural Event",
        description: "Galleries, museums, and art installations",
        tags: &["art", "culture", "indoor", "outdoor", "festival"],
        rating: 4.3,
        duration_days: 7,
        cost: 20.0,
    },
    FestivalTemplate {
        name: "Historic Heritage Days",
        kind: "Heritage Festival",
        description: "Celebration of local history and traditions",
        tags: &["history", "culture", "outdoor", "festival"],
        rating: 4.2,
        duration_days: 2,
        cost: 10.0,
    },
    FestivalTemplate {
        name: "Night Market Festival",
        kind: "Night Market",
        description: "Evening street food and shopping market",
        tags: &["food", "shopping", "outdoor", "evening", "festival"],
        rating: 4.4,
        duration_days: 1,
        cost: 25.0,
    },
    FestivalTemplate {
        name: "Seasonal Flower Festival",
        kind: "Nature Festival",
        description: "Beautiful seasonal flower displays",
        tags: &["nature", "outdoor", "photography", "festival"],
        rating: 4.1,
        duration_days: 14,
        cost: 15.0,
    },
];

/// Built-in destination tables with simulated festivals
#[derive(Debug, Clone)]
pub struct StaticDestinationSource {
    festival_probability: f64,
    seed: Option<u64>,
}

impl Default for StaticDestinationSource {
    fn default() -> Self {
        Self::new(0.4, None)
    }
}

impl StaticDestinationSource {
    /// `seed` makes festival generation reproducible; `None` seeds every
    /// call from fresh entropy.
    #[must_use]
    pub fn new(festival_probability: f64, seed: Option<u64>) -> Self {
        Self {
            festival_probability: festival_probability.clamp(0.0, 1.0),
            seed,
        }
    }

    #[must_use]
    pub fn weather() -> WeatherSnapshot {
        WeatherSnapshot::new(WeatherCondition::Sunny)
            .with_temperature("22°C")
            .with_humidity("65%")
            .with_forecast("Partly cloudy with occasional sunshine")
    }

    #[must_use]
    pub fn restaurants() -> Vec<CandidateItem> {
        let restaurant = |name: &str, cuisine: &str, rating: f64, tags: &[&str], cost: f64| {
            CandidateItem::new(name, ItemCategory::Restaurant, cuisine, rating)
                .with_tags(tags.iter().copied())
                .with_cost(cost)
        };
        vec![
            restaurant("Local Bistro", "French", 4.5, &["food", "fine dining"], 65.0),
            restaurant("Street Food Market", "Various", 4.2, &["food", "casual", "outdoor"], 25.0),
            restaurant("Historic Tavern", "Traditional", 4.3, &["history", "food", "indoor"], 45.0),
            restaurant(
                "Rooftop Restaurant",
                "Contemporary",
                4.6,
                &["food", "fine dining", "outdoor", "views"],
                80.0,
            ),
            restaurant("Ethnic Fusion Cafe", "Fusion", 4.1, &["food", "casual", "culture"], 35.0),
            restaurant("Seafood Grill", "Seafood", 4.4, &["food", "fine dining", "fresh"], 70.0),
            restaurant("Local Pizza Joint", "Italian", 4.0, &["food", "casual", "family"], 20.0),
        ]
    }

    #[must_use]
    pub fn activities() -> Vec<CandidateItem> {
        let activity = |name: &str, kind: &str, rating: f64, tags: &[&str], cost: f64| {
            CandidateItem::new(name, ItemCategory::Activity, kind, rating)
                .with_tags(tags.iter().copied())
                .with_cost(cost)
        };
        vec![
            activity("City Museum", "Cultural", 4.4, &["history", "indoor", "culture"], 20.0),
            activity("Food Walking Tour", "Tour", 4.6, &["food", "outdoor", "walking"], 55.0),
            activity(
                "Concert Hall",
                "Entertainment",
                4.3,
                &["music", "indoor", "entertainment"],
                75.0,
            ),
            activity("Local Market", "Shopping", 4.1, &["food", "outdoor", "culture"], 0.0),
            activity("Art Gallery", "Cultural", 4.5, &["art", "indoor", "culture"], 15.0),
            activity("Scenic Park", "Nature", 4.2, &["nature", "outdoor", "walking"], 0.0),
            activity(
                "Historic Architecture Tour",
                "Tour",
                4.3,
                &["history", "outdoor", "culture"],
                30.0,
            ),
            activity("Cooking Class", "Experience", 4.7, &["food", "indoor", "hands-on"], 90.0),
            activity("Boat Tour", "Tour", 4.4, &["water", "outdoor", "scenic"], 45.0),
            activity("Local Brewery", "Entertainment", 4.2, &["drinks", "indoor", "social"], 25.0),
            activity("Shopping District", "Shopping", 3.9, &["shopping", "indoor", "variety"], 0.0),
            activity("Observatory", "Educational", 4.3, &["science", "indoor", "views"], 18.0),
        ]
    }

    /// Roll for festivals and place each one fully inside the trip
    pub fn festivals(&self, destination: &str, dates: &DateRange) -> Vec<CandidateItem> {
        let seed = self.seed.unwrap_or_else(crate::entropy_seed);
        let mut rng = StdRng::seed_from_u64(seed);
        generate_festivals(&mut rng, self.festival_probability, destination, dates)
    }

    /// Full fallback payload; never fails
    #[must_use]
    pub fn destination_info(&self, destination: &str, dates: &DateRange) -> DestinationInfo {
        DestinationInfo {
            weather: Self::weather(),
            restaurants: Self::restaurants(),
            activities: Self::activities(),
            festivals: self.festivals(destination, dates),
        }
    }
}

fn generate_festivals(
    rng: &mut StdRng,
    probability: f64,
    destination: &str,
    dates: &DateRange,
) -> Vec<CandidateItem> {
    if rng.random::<f64>() >= probability {
        return Vec::new();
    }

    let count = rng.random_range(1..=2usize);
    let mut picks: Vec<&FestivalTemplate> = FESTIVAL_TEMPLATES.iter().collect();
    picks.shuffle(rng);

    let city = destination.split(',').next().unwrap_or(destination).trim();
    let trip_days = dates.days();
    let mut festivals = Vec::new();

    for template in picks.into_iter().take(count) {
        if trip_days < template.duration_days {
            debug!(festival = template.name, "Festival does not fit the trip");
            continue;
        }
        let offset = rng.random_range(0..=trip_days - template.duration_days);
        let start = dates.start() + Duration::days(i64::from(offset));
        let end = start + Duration::days(i64::from(template.duration_days - 1));

        festivals.push(
            CandidateItem::new(
                template.name.replace("{destination}", city),
                ItemCategory::Event,
                template.kind,
                template.rating,
            )
            .with_tags(template.tags.iter().copied())
            .with_cost(template.cost)
            .with_description(template.description)
            .with_window(EventWindow::new(start, end)),
        );
    }
    festivals
}

#[async_trait]
impl DestinationDataSource for StaticDestinationSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(
        &self,
        destination: &str,
        _interests: &[String],
        dates: &DateRange,
    ) -> Result<DestinationInfo> {
        Ok(self.destination_info(destination, dates))
    }
}

/// Destination data generated by an LLM
pub struct LlmDestinationSource {
    client: LlmClient,
}

impl LlmDestinationSource {
    #[must_use]
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

const DESTINATION_SYSTEM_PROMPT: &str = "You are a travel research assistant. \
    Answer with a single JSON object and nothing else. The object has the keys \
    \"weather\" {condition, temperature, humidity, forecast}, \
    \"restaurants\" [{name, cuisine, rating, tags, estimated_cost, description}], \
    \"activities\" [{name, type, rating, tags, estimated_cost, description}] and \
    \"festivals\" [{name, type, rating, tags, estimated_cost, description, start_date, end_date}]. \
    Ratings are 0-5, dates are YYYY-MM-DD, tags are lowercase and include \
    \"indoor\" or \"outdoor\" where it applies.";

#[derive(Debug, Deserialize)]
struct DestinationPayload {
    #[serde(default)]
    weather: Option<WeatherPayload>,
    #[serde(default)]
    restaurants: Vec<PlacePayload>,
    #[serde(default)]
    activities: Vec<PlacePayload>,
    #[serde(default)]
    festivals: Vec<PlacePayload>,
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    condition: String,
    #[serde(default)]
    temperature: Option<String>,
    #[serde(default)]
    humidity: Option<String>,
    #[serde(default)]
    forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlacePayload {
    name: String,
    #[serde(default, alias = "type", alias = "cuisine")]
    kind: Option<String>,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    estimated_cost: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
}

impl PlacePayload {
    fn into_candidate(self, category: ItemCategory) -> CandidateItem {
        let window = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start <= end => Some(EventWindow::new(start, end)),
            _ => None,
        };
        let mut item = CandidateItem::new(
            self.name,
            category,
            self.kind.unwrap_or_else(|| "General".to_string()),
            self.rating,
        )
        .with_tags(self.tags.into_iter().map(|t| t.to_lowercase()))
        .with_cost(self.estimated_cost);
        if let Some(description) = self.description {
            item = item.with_description(description);
        }
        if let Some(window) = window {
            item = item.with_window(window);
        }
        item
    }
}

/// Pull the JSON object out of a reply that may be wrapped in prose or fences
fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn parse_destination_reply(reply: &str, dates: &DateRange) -> Result<DestinationInfo> {
    let json = extract_json(reply)
        .ok_or_else(|| TripScoutError::data_source("LLM reply contained no JSON object"))?;
    let payload: DestinationPayload = serde_json::from_str(json)
        .map_err(|e| TripScoutError::data_source(format!("Malformed destination JSON: {e}")))?;

    let weather = payload
        .weather
        .map(|w| {
            let mut snapshot = WeatherSnapshot::new(WeatherCondition::parse(&w.condition));
            if let Some(temperature) = w.temperature {
                snapshot = snapshot.with_temperature(temperature);
            }
            if let Some(humidity) = w.humidity {
                snapshot = snapshot.with_humidity(humidity);
            }
            if let Some(forecast) = w.forecast {
                snapshot = snapshot.with_forecast(forecast);
            }
            snapshot
        })
        .unwrap_or_default();

    let festivals: Vec<CandidateItem> = payload
        .festivals
        .into_iter()
        .map(|f| f.into_candidate(ItemCategory::Event))
        .filter(|f| {
            f.window
                .is_some_and(|w| w.start <= dates.end() && w.end >= dates.start())
        })
        .collect();

    Ok(DestinationInfo {
        weather,
        restaurants: payload
            .restaurants
            .into_iter()
            .map(|r| r.into_candidate(ItemCategory::Restaurant))
            .collect(),
        activities: payload
            .activities
            .into_iter()
            .map(|a| a.into_candidate(ItemCategory::Activity))
            .collect(),
        festivals,
    })
}

#[async_trait]
impl DestinationDataSource for LlmDestinationSource {
    fn name(&self) -> &'static str {
        "llm"
    }

    #[instrument(skip(self, interests, dates))]
    async fn fetch(
        &self,
        destination: &str,
        interests: &[String],
        dates: &DateRange,
    ) -> Result<DestinationInfo> {
        let prompt = format!(
            "Destination: {destination}\nDates: {} to {}\nInterests: {}\n\
             List the typical weather, 7 restaurants, 12 activities and any festivals \
             running during these dates.",
            dates.start(),
            dates.end(),
            interests.join(", ")
        );
        let reply = self.client.complete(DESTINATION_SYSTEM_PROMPT, &prompt).await?;
        let info = parse_destination_reply(&reply, dates)?;
        info!(
            restaurants = info.restaurants.len(),
            activities = info.activities.len(),
            festivals = info.festivals.len(),
            "Fetched destination info from LLM"
        );
        Ok(info)
    }
}
