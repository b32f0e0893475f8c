//! Day-by-day itinerary produced by the optimizer

use crate::models::candidate::{ItemCategory, ScoredItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named time-of-day slot, ordered as it occurs in a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Morning,
    Lunch,
    Afternoon,
    LateAfternoon,
    Evening,
}

impl Slot {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Slot::Morning => "MORNING",
            Slot::Lunch => "LUNCH",
            Slot::Afternoon => "AFTERNOON",
            Slot::LateAfternoon => "LATE AFTERNOON",
            Slot::Evening => "EVENING",
        }
    }

    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self {
            Slot::Morning => "🌅",
            Slot::Lunch => "🥪",
            Slot::Afternoon => "☀️",
            Slot::LateAfternoon => "🌇",
            Slot::Evening => "🌙",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What fills a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "assignment", rename_all = "snake_case")]
pub enum SlotAssignment {
    Item(ScoredItem),
    /// Activity pool ran dry with no substitute of a different type
    FreeTime { category: ItemCategory },
    /// Restaurant pool ran dry; suggests exploring the named cuisine
    ExploreCuisine { cuisine: String },
}

impl SlotAssignment {
    #[must_use]
    pub fn item(&self) -> Option<&ScoredItem> {
        match self {
            SlotAssignment::Item(item) => Some(item),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        !matches!(self, SlotAssignment::Item(_))
    }

    /// One-line description used by reports
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            SlotAssignment::Item(item) => item.name().to_string(),
            SlotAssignment::FreeTime { category } => {
                format!("Free time (no more {category} options)")
            }
            SlotAssignment::ExploreCuisine { cuisine } => format!("Explore more {cuisine} cuisine"),
        }
    }
}

/// One calendar day of the itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    /// Absent slot means the pool for it was empty
    pub slots: BTreeMap<Slot, SlotAssignment>,
}

impl DayPlan {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            slots: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&SlotAssignment> {
        self.slots.get(&slot)
    }

    /// Names of real items scheduled this day, in slot order
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .values()
            .filter_map(SlotAssignment::item)
            .map(ScoredItem::name)
    }

    /// ISO key, e.g. `2025-09-01`
    #[must_use]
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Date-ordered schedule covering every day of the trip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub days: BTreeMap<NaiveDate, DayPlan>,
    /// Number of times a pool was exhausted and reset
    pub activity_resets: u32,
    pub restaurant_resets: u32,
}

impl Itinerary {
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayPlan> {
        self.days.values()
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DayPlan> {
        self.days.get(&date)
    }

    pub fn iso_keys(&self) -> Vec<String> {
        self.days.values().map(DayPlan::iso_date).collect()
    }

    /// Every scheduled item across the trip in chronological slot order
    pub fn scheduled_items(&self) -> impl Iterator<Item = (NaiveDate, Slot, &ScoredItem)> {
        self.days.values().flat_map(|day| {
            day.slots
                .iter()
                .filter_map(move |(slot, a)| a.item().map(|item| (day.date, *slot, item)))
        })
    }
}
