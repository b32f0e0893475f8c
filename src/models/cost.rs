//! Trip cost breakdown

use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of the other categories added as miscellaneous spend
pub const MISCELLANEOUS_RATE: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Meals,
    Activities,
    Transport,
    Lodging,
    Miscellaneous,
}

impl CostCategory {
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            CostCategory::Meals => "meals",
            CostCategory::Activities => "activities",
            CostCategory::Transport => "transport",
            CostCategory::Lodging => "lodging",
            CostCategory::Miscellaneous => "miscellaneous",
        }
    }

    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self {
            CostCategory::Meals => "🍽️",
            CostCategory::Activities => "🎯",
            CostCategory::Transport => "🚗",
            CostCategory::Lodging => "🏨",
            CostCategory::Miscellaneous => "💼",
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostCategory::Meals => write!(f, "Meals & Dining"),
            CostCategory::Activities => write!(f, "Activities & Tours"),
            CostCategory::Transport => write!(f, "Local Transport"),
            CostCategory::Lodging => write!(f, "Accommodation"),
            CostCategory::Miscellaneous => write!(f, "Miscellaneous"),
        }
    }
}

/// Per-category trip cost; `lodging` is present only when lodging was requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub meals: f64,
    pub activities: f64,
    pub transport: f64,
    pub lodging: Option<f64>,
    pub miscellaneous: f64,
}

impl CostBreakdown {
    /// Build a breakdown, deriving miscellaneous from the other categories
    #[must_use]
    pub fn from_parts(meals: f64, activities: f64, transport: f64, lodging: Option<f64>) -> Self {
        let subtotal = meals + activities + transport + lodging.unwrap_or(0.0);
        Self {
            meals,
            activities,
            transport,
            lodging,
            miscellaneous: subtotal * MISCELLANEOUS_RATE,
        }
    }

    /// Present categories in display order
    #[must_use]
    pub fn entries(&self) -> Vec<(CostCategory, f64)> {
        let mut entries = vec![
            (CostCategory::Meals, self.meals),
            (CostCategory::Activities, self.activities),
            (CostCategory::Transport, self.transport),
        ];
        if let Some(lodging) = self.lodging {
            entries.push((CostCategory::Lodging, lodging));
        }
        entries.push((CostCategory::Miscellaneous, self.miscellaneous));
        entries
    }

    #[must_use]
    pub fn get(&self, category: CostCategory) -> Option<f64> {
        match category {
            CostCategory::Meals => Some(self.meals),
            CostCategory::Activities => Some(self.activities),
            CostCategory::Transport => Some(self.transport),
            CostCategory::Lodging => self.lodging,
            CostCategory::Miscellaneous => Some(self.miscellaneous),
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, amount)| amount).sum()
    }

    #[must_use]
    pub fn per_person(&self, travelers: u32) -> f64 {
        self.total() / f64::from(travelers.max(1))
    }
}
