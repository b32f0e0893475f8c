//! Itinerary optimizer
//!
//! Spreads scored activities and restaurants over the trip's days without
//! repeating an item until its pool has been used up. Used sets are shared
//! across the whole trip. When a pool is fully used at the start of a day it
//! is reset according to the configured [`ResetPolicy`], and each reset is
//! counted on the resulting [`Itinerary`].
//!
//! Festivals running on a given day take the first activity slots of that
//! day. Mornings otherwise prefer outdoor activities, unless outdoor
//! preference has been switched off for poor weather.

use crate::TripScoutError;
use crate::models::{
    DateRange, DayPlan, ItemCategory, Itinerary, ScoredItem, Slot, SlotAssignment,
};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What happens when every item in a pool has been scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Clear the used set and shuffle the pool with the optimizer's RNG
    #[default]
    Reshuffle,
    /// Clear the used set and start over in score order
    RoundRobin,
}

impl FromStr for ResetPolicy {
    type Err = TripScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reshuffle" => Ok(ResetPolicy::Reshuffle),
            "round_robin" | "round-robin" => Ok(ResetPolicy::RoundRobin),
            other => Err(TripScoutError::config(format!(
                "Unknown reset policy '{other}'. Must be one of: reshuffle, round_robin"
            ))),
        }
    }
}

impl fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetPolicy::Reshuffle => write!(f, "reshuffle"),
            ResetPolicy::RoundRobin => write!(f, "round_robin"),
        }
    }
}

/// Selection behaviour for activity slots after the first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerMode {
    /// Next unused activity in pool order
    #[default]
    Standard,
    /// Prefer an unused activity whose type is not yet on the day
    Diversified,
}

/// Slots filled each day, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTemplate {
    pub activity_slots: Vec<Slot>,
    pub dining_slots: Vec<Slot>,
}

impl Default for DayTemplate {
    fn default() -> Self {
        Self {
            activity_slots: vec![Slot::Morning, Slot::Afternoon],
            dining_slots: vec![Slot::Evening],
        }
    }
}

impl DayTemplate {
    /// Morning, afternoon and late afternoon activities with lunch and dinner
    #[must_use]
    pub fn extended() -> Self {
        Self {
            activity_slots: vec![Slot::Morning, Slot::Afternoon, Slot::LateAfternoon],
            dining_slots: vec![Slot::Lunch, Slot::Evening],
        }
    }
}

/// One candidate pool with its trip-wide used set
struct Pool<'a> {
    items: &'a [ScoredItem],
    /// Indices into `items`, in current selection order
    order: Vec<usize>,
    used: HashSet<&'a str>,
    resets: u32,
}

impl<'a> Pool<'a> {
    fn new(items: &'a [ScoredItem]) -> Self {
        Self {
            items,
            order: (0..items.len()).collect(),
            used: HashSet::new(),
            resets: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn is_used(&self, index: usize) -> bool {
        self.used.contains(self.items[index].name())
    }

    fn unused(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied().filter(|&i| !self.is_used(i))
    }

    /// Unused items that can be scheduled on `date`
    fn available(&self, date: NaiveDate) -> impl Iterator<Item = usize> + '_ {
        self.unused()
            .filter(move |&i| self.items[i].item.is_available_on(date))
    }

    fn mark_used(&mut self, index: usize) {
        let items = self.items;
        self.used.insert(items[index].name());
    }

    fn reset_if_exhausted(
        &mut self,
        policy: ResetPolicy,
        rng: &mut StdRng,
        date: NaiveDate,
    ) -> bool {
        if self.is_empty() || self.available(date).next().is_some() {
            return false;
        }
        self.used.clear();
        self.resets += 1;
        if policy == ResetPolicy::Reshuffle {
            self.order.shuffle(rng);
        }
        true
    }
}

/// Builds a day-by-day itinerary from scored pools
pub struct ItineraryOptimizer {
    template: DayTemplate,
    policy: ResetPolicy,
    mode: OptimizerMode,
    prefer_outdoor: bool,
    rng: StdRng,
}

impl ItineraryOptimizer {
    /// Create an optimizer. `seed` fixes the reshuffle order; `None` draws a
    /// fresh seed so concurrent runs never share RNG state.
    #[must_use]
    pub fn new(policy: ResetPolicy, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(crate::entropy_seed);
        Self {
            template: DayTemplate::default(),
            policy,
            mode: OptimizerMode::Standard,
            prefer_outdoor: true,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: DayTemplate) -> Self {
        self.template = template;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: OptimizerMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_outdoor_preference(mut self, prefer_outdoor: bool) -> Self {
        self.prefer_outdoor = prefer_outdoor;
        self
    }

    #[must_use]
    pub fn mode(&self) -> OptimizerMode {
        self.mode
    }

    /// Schedule `activities` and `restaurants` over every day of `dates`.
    ///
    /// Both pools are expected best first. An empty pool leaves its slots
    /// out of every day instead of failing.
    pub fn optimize(
        &mut self,
        activities: &[ScoredItem],
        restaurants: &[ScoredItem],
        dates: &DateRange,
    ) -> Itinerary {
        let mut activity_pool = Pool::new(activities);
        let mut restaurant_pool = Pool::new(restaurants);
        let mut itinerary = Itinerary::default();

        for date in dates.dates() {
            if activity_pool.reset_if_exhausted(self.policy, &mut self.rng, date) {
                debug!(%date, policy = %self.policy, "Activity pool exhausted, reset");
            }
            if restaurant_pool.reset_if_exhausted(self.policy, &mut self.rng, date) {
                debug!(%date, policy = %self.policy, "Restaurant pool exhausted, reset");
            }

            let mut day = DayPlan::new(date);
            self.fill_activities(&mut day, &mut activity_pool, date);
            self.fill_dining(&mut day, &mut restaurant_pool);
            itinerary.days.insert(date, day);
        }

        itinerary.activity_resets = activity_pool.resets;
        itinerary.restaurant_resets = restaurant_pool.resets;
        itinerary
    }

    fn fill_activities(&self, day: &mut DayPlan, pool: &mut Pool<'_>, date: NaiveDate) {
        if pool.is_empty() {
            return;
        }

        let festivals_today: Vec<usize> = pool
            .unused()
            .filter(|&i| pool.items[i].item.is_active_on(date))
            .collect();
        let mut first_kind: Option<String> = None;

        for (position, slot) in self.template.activity_slots.iter().enumerate() {
            let festival = festivals_today.iter().copied().find(|&i| !pool.is_used(i));
            let pick = festival.or_else(|| {
                if position == 0 {
                    self.pick_first(pool, date)
                } else {
                    self.pick_next(pool, day, date)
                }
            });

            let assignment = match pick {
                Some(index) => {
                    pool.mark_used(index);
                    SlotAssignment::Item(pool.items[index].clone())
                }
                None => substitute_activity(pool.items, day, date, first_kind.as_deref()),
            };

            if position == 0 {
                first_kind = assignment.item().map(|item| item.kind().to_string());
            }
            day.slots.insert(*slot, assignment);
        }
    }

    fn pick_first(&self, pool: &Pool<'_>, date: NaiveDate) -> Option<usize> {
        if self.prefer_outdoor {
            if let Some(outdoor) = pool
                .available(date)
                .find(|&i| pool.items[i].item.is_outdoor())
            {
                return Some(outdoor);
            }
        }
        pool.available(date).next()
    }

    fn pick_next(&self, pool: &Pool<'_>, day: &DayPlan, date: NaiveDate) -> Option<usize> {
        if self.mode == OptimizerMode::Diversified {
            let kinds_today: HashSet<&str> = day
                .slots
                .values()
                .filter_map(SlotAssignment::item)
                .map(ScoredItem::kind)
                .collect();
            if let Some(fresh) = pool
                .available(date)
                .find(|&i| !kinds_today.contains(pool.items[i].kind()))
            {
                return Some(fresh);
            }
        }
        pool.available(date).next()
    }

    fn fill_dining(&self, day: &mut DayPlan, pool: &mut Pool<'_>) {
        if pool.is_empty() {
            return;
        }

        let mut last_cuisine: Option<String> = None;
        for slot in &self.template.dining_slots {
            let next = pool.unused().next();
            let assignment = match next {
                Some(index) => {
                    pool.mark_used(index);
                    let item = pool.items[index].clone();
                    last_cuisine = Some(item.kind().to_string());
                    SlotAssignment::Item(item)
                }
                None => SlotAssignment::ExploreCuisine {
                    cuisine: last_cuisine
                        .clone()
                        .unwrap_or_else(|| pool.items[0].kind().to_string()),
                },
            };
            day.slots.insert(*slot, assignment);
        }
    }
}

/// Reuse an already scheduled activity of a different type than the day's
/// first one, or leave the slot as free time.
fn substitute_activity(
    items: &[ScoredItem],
    day: &DayPlan,
    date: NaiveDate,
    first_kind: Option<&str>,
) -> SlotAssignment {
    let names_today: HashSet<&str> = day.item_names().collect();
    items
        .iter()
        .filter(|item| item.item.is_available_on(date))
        .find(|item| !names_today.contains(item.name()) && Some(item.kind()) != first_kind)
        .map_or(
            SlotAssignment::FreeTime {
                category: ItemCategory::Activity,
            },
            |item| SlotAssignment::Item(item.clone()),
        )
}
