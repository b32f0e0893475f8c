//! Trip request input, validated trip parameters and date ranges

use crate::{Result, TripScoutError};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest trip, in days, a plan can cover
pub const MAX_TRIP_DAYS: i64 = 365;

/// Spending level that selects the base cost rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Mid,
    Luxury,
}

impl BudgetTier {
    pub const ALL: [BudgetTier; 3] = [BudgetTier::Low, BudgetTier::Mid, BudgetTier::Luxury];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Mid => "mid",
            BudgetTier::Luxury => "luxury",
        }
    }
}

impl FromStr for BudgetTier {
    type Err = TripScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(BudgetTier::Low),
            "mid" => Ok(BudgetTier::Mid),
            "luxury" => Ok(BudgetTier::Luxury),
            _ => Err(TripScoutError::budget_tier(s)),
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetTier::Low => write!(f, "Low"),
            BudgetTier::Mid => write!(f, "Mid"),
            BudgetTier::Luxury => write!(f, "Luxury"),
        }
    }
}

/// Inclusive calendar range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `end < start` and trips longer than
    /// [`MAX_TRIP_DAYS`]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(TripScoutError::date_range(format!(
                "end date {end} is before start date {start}"
            )));
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_TRIP_DAYS {
            return Err(TripScoutError::date_range(format!(
                "trip of {days} days exceeds the {MAX_TRIP_DAYS} day limit"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two ISO `YYYY-MM-DD` dates
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_iso_date(start)?;
        let end = parse_iso_date(end)?;
        Self::new(start, end)
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Trip length in days, both ends included
    #[must_use]
    pub fn days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(1)
    }

    /// Lodging nights; zero for a same-day trip
    #[must_use]
    pub fn nights(&self) -> u32 {
        self.days() - 1
    }

    /// Every date in the range in chronological order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..i64::from(self.days())).map(move |offset| self.start + Duration::days(offset))
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| TripScoutError::date_range(format!("'{raw}' is not a YYYY-MM-DD date ({e})")))
}

/// Raw planning request as supplied by a caller (CLI, UI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub interests: Vec<String>,
    pub budget_tier: String,
    pub travelers: u32,
    pub include_lodging: bool,
    pub origin: Option<String>,
}

impl PlanRequest {
    /// Check the caller contract before any planning work starts
    pub fn validate(&self) -> Result<TripParameters> {
        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(TripScoutError::validation("Destination cannot be empty"));
        }
        let dates = DateRange::parse(&self.start_date, &self.end_date)?;
        let budget_tier = self.budget_tier.parse::<BudgetTier>()?;
        if self.travelers == 0 {
            return Err(TripScoutError::validation(
                "Number of travelers must be at least 1",
            ));
        }

        let mut interests: Vec<String> = self
            .interests
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if interests.is_empty() {
            interests.push("general".to_string());
        }

        let origin = self
            .origin
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);

        Ok(TripParameters {
            destination: destination.to_string(),
            dates,
            interests,
            budget_tier,
            travelers: self.travelers,
            include_lodging: self.include_lodging,
            origin,
        })
    }
}

/// Validated planning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripParameters {
    pub destination: String,
    pub dates: DateRange,
    pub interests: Vec<String>,
    pub budget_tier: BudgetTier,
    pub travelers: u32,
    pub include_lodging: bool,
    pub origin: Option<String>,
}
