//! Candidate activities, restaurants and events, before and after scoring

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which pool a candidate belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Activity,
    Restaurant,
    /// Time-bound festival or special event
    Event,
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemCategory::Activity => write!(f, "activity"),
            ItemCategory::Restaurant => write!(f, "restaurant"),
            ItemCategory::Event => write!(f, "event"),
        }
    }
}

/// Inclusive date window during which an event runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EventWindow {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

/// A restaurant, activity or event produced by a destination data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Unique within its pool
    pub name: String,
    pub category: ItemCategory,
    /// Activity type ("Tour", "Cultural") or restaurant cuisine ("French")
    pub kind: String,
    /// Rating on a 0-5 scale
    pub rating: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Estimated cost per person in currency units
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Only set for time-bound events
    #[serde(default)]
    pub window: Option<EventWindow>,
}

impl CandidateItem {
    /// Create a candidate with no tags, cost or window
    pub fn new<N: Into<String>, K: Into<String>>(
        name: N,
        category: ItemCategory,
        kind: K,
        rating: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            kind: kind.into(),
            rating: rating.clamp(0.0, 5.0),
            tags: BTreeSet::new(),
            estimated_cost: 0.0,
            description: None,
            window: None,
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_cost(mut self, estimated_cost: f64) -> Self {
        self.estimated_cost = estimated_cost.max(0.0);
        self
    }

    #[must_use]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: EventWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Exact tag lookup, used for the `indoor`/`outdoor` markers
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    #[must_use]
    pub fn is_outdoor(&self) -> bool {
        self.has_tag("outdoor")
    }

    #[must_use]
    pub fn is_indoor(&self) -> bool {
        self.has_tag("indoor")
    }

    #[must_use]
    pub fn is_event(&self) -> bool {
        self.category == ItemCategory::Event
    }

    /// Whether this is an event running on `date`
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.is_event() && self.window.is_some_and(|w| w.contains(date))
    }

    /// Whether this can be scheduled on `date`; only windowed items are restricted
    #[must_use]
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.window.is_none_or(|w| w.contains(date))
    }
}

/// A candidate annotated with a relevance score in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CandidateItem,
    pub score: f64,
}

impl ScoredItem {
    #[must_use]
    pub fn new(item: CandidateItem, score: f64) -> Self {
        Self {
            item,
            score: score.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.item.name
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.item.kind
    }

    /// Render the score as a ten-cell bar, e.g. `███████░░░`
    #[must_use]
    pub fn score_bar(&self) -> String {
        let filled = ((self.score * 10.0).floor() as usize).min(10);
        format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
    }
}
