//! Weather snapshot used for scoring and slot preferences

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse weather condition reported by a destination data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Clear,
    Cloudy,
    Rainy,
    Other(String),
}

impl WeatherCondition {
    /// Parse a free-form condition string, case-insensitive. Descriptions
    /// like "Light rain" or "Partly cloudy" are classified by keyword; wet
    /// weather wins over cloud, and cloud over sun.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let has_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

        if has_any(&["rain", "shower", "drizzle", "storm", "thunder"]) {
            WeatherCondition::Rainy
        } else if has_any(&["cloud", "overcast"]) {
            WeatherCondition::Cloudy
        } else if has_any(&["sun"]) {
            WeatherCondition::Sunny
        } else if has_any(&["clear", "fair"]) {
            WeatherCondition::Clear
        } else {
            WeatherCondition::Other(text)
        }
    }

    /// Good weather for outdoor plans
    #[must_use]
    pub fn is_fair(&self) -> bool {
        matches!(self, WeatherCondition::Sunny | WeatherCondition::Clear)
    }

    /// Weather that favours indoor plans
    #[must_use]
    pub fn is_poor(&self) -> bool {
        matches!(self, WeatherCondition::Rainy | WeatherCondition::Cloudy)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherCondition::Sunny => write!(f, "Sunny"),
            WeatherCondition::Clear => write!(f, "Clear"),
            WeatherCondition::Cloudy => write!(f, "Cloudy"),
            WeatherCondition::Rainy => write!(f, "Rainy"),
            WeatherCondition::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Weather at the destination for the trip window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition: WeatherCondition,
    /// Display string, e.g. "22°C"
    pub temperature: String,
    pub humidity: Option<String>,
    /// Human-readable forecast text
    pub forecast: String,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new(condition: WeatherCondition) -> Self {
        Self {
            condition,
            temperature: "n/a".to_string(),
            humidity: None,
            forecast: String::new(),
        }
    }

    #[must_use]
    pub fn with_temperature<S: Into<String>>(mut self, temperature: S) -> Self {
        self.temperature = temperature.into();
        self
    }

    #[must_use]
    pub fn with_humidity<S: Into<String>>(mut self, humidity: S) -> Self {
        self.humidity = Some(humidity.into());
        self
    }

    #[must_use]
    pub fn with_forecast<S: Into<String>>(mut self, forecast: S) -> Self {
        self.forecast = forecast.into();
        self
    }

    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self.condition {
            WeatherCondition::Sunny | WeatherCondition::Clear => "☀️",
            WeatherCondition::Cloudy => "☁️",
            WeatherCondition::Rainy => "🌧️",
            WeatherCondition::Other(_) => "🌤️",
        }
    }
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self::new(WeatherCondition::Other("unknown".to_string()))
    }
}
