//! Human-readable trip plan report

use crate::models::{
    CostBreakdown, CostCategory, ScoredItem, SlotAssignment, TravelComparison, TripPlan,
};
use std::fmt;

/// How many restaurants and activities the report lists
const TOP_PICKS: usize = 5;

/// Render a plan as the text report shown in the terminal and sent by email
#[must_use]
pub fn render(plan: &TripPlan) -> String {
    PlanReport(plan).to_string()
}

/// Short single-line summary, used for push notifications
#[must_use]
pub fn summary(plan: &TripPlan) -> String {
    format!(
        "{} {} to {}: {} days, est. ${:.0} total (${:.0}/person), confidence {:.0}%",
        plan.destination,
        plan.dates.start(),
        plan.dates.end(),
        plan.dates.days(),
        plan.total_cost,
        plan.cost_per_person(),
        plan.confidence * 100.0
    )
}

/// Cost section on its own, for cost-only estimates
#[must_use]
pub fn render_costs(costs: &CostBreakdown, travelers: u32, nights: u32) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_costs(&mut out, costs, travelers, nights);
    out
}

/// Travel section on its own, for driving-vs-flying comparisons
#[must_use]
pub fn render_travel(travel: &TravelComparison) -> String {
    let mut out = String::new();
    let _ = write_travel(&mut out, travel);
    out
}

/// Display adapter for a full report
pub struct PlanReport<'a>(pub &'a TripPlan);

impl fmt::Display for PlanReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        write_overview(f, plan)?;
        write_itinerary(f, plan)?;
        if !plan.festivals.is_empty() {
            write_festivals(f, &plan.festivals)?;
        }
        write_top_picks(f, "🍽️ TOP RESTAURANTS", plan.restaurants.iter())?;
        write_top_picks(f, "🎯 TOP ACTIVITIES", plan.regular_activities())?;
        write_costs(f, &plan.costs, plan.travelers, plan.dates.nights())?;
        if let Some(travel) = &plan.travel {
            write_travel(f, travel)?;
        }
        write_closing(f, plan)
    }
}

fn write_overview(f: &mut fmt::Formatter<'_>, plan: &TripPlan) -> fmt::Result {
    writeln!(f, "🌟 TRIP PLAN: {}", plan.destination.to_uppercase())?;
    writeln!(f, "{}", "=".repeat(50))?;
    writeln!(
        f,
        "📅 Dates: {} to {} ({} days)",
        plan.dates.start(),
        plan.dates.end(),
        plan.dates.days()
    )?;
    writeln!(f, "👥 Travelers: {}", plan.travelers)?;
    writeln!(f, "💳 Budget: {}", plan.budget_tier)?;
    writeln!(f, "❤️ Interests: {}", plan.interests.join(", "))?;
    if let Some(origin) = &plan.origin {
        writeln!(f, "🛫 From: {origin}")?;
    }
    writeln!(f)?;

    let weather = &plan.weather;
    writeln!(
        f,
        "{} Weather: {}, {}",
        weather.emoji(),
        weather.condition,
        weather.temperature
    )?;
    if let Some(humidity) = &weather.humidity {
        writeln!(f, "   💧 Humidity: {humidity}")?;
    }
    if !weather.forecast.is_empty() {
        writeln!(f, "   📝 {}", weather.forecast)?;
    }
    writeln!(f)
}

fn write_itinerary(f: &mut fmt::Formatter<'_>, plan: &TripPlan) -> fmt::Result {
    writeln!(f, "🗓️ DAILY ITINERARY")?;
    writeln!(f, "{}", "-".repeat(50))?;
    for (index, day) in plan.itinerary.iter().enumerate() {
        writeln!(
            f,
            "Day {} - {}",
            index + 1,
            day.date.format("%A, %B %d")
        )?;
        if day.slots.is_empty() {
            writeln!(f, "   Nothing scheduled")?;
        }
        for (slot, assignment) in &day.slots {
            match assignment {
                SlotAssignment::Item(item) => {
                    let marker = if item.item.is_event() { " 🎉" } else { "" };
                    writeln!(
                        f,
                        "   {} {}: {}{} ({})",
                        slot.emoji(),
                        slot.label(),
                        item.name(),
                        marker,
                        item.kind()
                    )?;
                }
                placeholder => {
                    writeln!(f, "   {} {}: {}", slot.emoji(), slot.label(), placeholder.title())?;
                }
            }
        }
    }
    writeln!(f)
}

fn write_festivals(f: &mut fmt::Formatter<'_>, festivals: &[ScoredItem]) -> fmt::Result {
    writeln!(f, "🎉 FESTIVALS & EVENTS")?;
    writeln!(f, "{}", "-".repeat(50))?;
    for festival in festivals {
        write!(f, "• {} ({})", festival.name(), festival.kind())?;
        if let Some(window) = festival.item.window {
            if window.is_single_day() {
                write!(f, " on {}", window.start)?;
            } else {
                write!(f, " from {} to {}", window.start, window.end)?;
            }
        }
        writeln!(f)?;
        if let Some(description) = &festival.item.description {
            writeln!(f, "   {description}")?;
        }
    }
    writeln!(f)
}

fn write_top_picks<'a>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    items: impl Iterator<Item = &'a ScoredItem>,
) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "-".repeat(50))?;
    let mut any = false;
    for (rank, item) in items.take(TOP_PICKS).enumerate() {
        any = true;
        writeln!(
            f,
            "{}. {} ({}) ⭐ {:.1}",
            rank + 1,
            item.name(),
            item.kind(),
            item.item.rating
        )?;
        writeln!(
            f,
            "   Match: {} {:.0}%",
            item.score_bar(),
            item.score * 100.0
        )?;
    }
    if !any {
        writeln!(f, "   No options found")?;
    }
    writeln!(f)
}

fn write_costs(
    f: &mut impl fmt::Write,
    costs: &CostBreakdown,
    travelers: u32,
    nights: u32,
) -> fmt::Result {
    writeln!(f, "💰 ESTIMATED COSTS")?;
    writeln!(f, "{}", "-".repeat(50))?;
    let total = costs.total();
    for (category, amount) in costs.entries() {
        let share = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
        writeln!(
            f,
            "{} {:<20} ${:>10.2} ({:.1}%)",
            category.emoji(),
            category.to_string(),
            amount,
            share
        )?;
    }
    writeln!(f, "{}", "-".repeat(50))?;
    writeln!(f, "   {:<20} ${:>10.2}", "Total", total)?;
    writeln!(f, "   {:<20} ${:>10.2}", "Per person", costs.per_person(travelers))?;
    if costs.get(CostCategory::Lodging).is_none() {
        writeln!(f, "   🏨 Accommodation not included")?;
    } else if nights == 0 {
        writeln!(f, "   🏨 Day trip, no nights of accommodation")?;
    }
    writeln!(f)
}

fn write_travel(f: &mut impl fmt::Write, travel: &TravelComparison) -> fmt::Result {
    writeln!(
        f,
        "🚗✈️ TRAVEL: {} → {}",
        travel.origin, travel.destination
    )?;
    writeln!(f, "{}", "-".repeat(50))?;

    let driving = &travel.driving;
    if driving.available {
        writeln!(
            f,
            "🚗 Driving: {:.0} miles, {:.1}h each way, ${:.2} total (${:.2}/person), convenience {}/10",
            driving.distance_miles,
            driving.drive_time_hours,
            driving.costs.total_per_group,
            driving.costs.total_per_person,
            driving.convenience_score
        )?;
        writeln!(
            f,
            "   Gas ${:.2} · Wear ${:.2} · Tolls ${:.2} · Parking ${:.2}",
            driving.costs.gas,
            driving.costs.wear_and_tear,
            driving.costs.tolls,
            driving.costs.parking
        )?;
    } else {
        writeln!(
            f,
            "🚗 Driving: not available ({})",
            driving.unavailable_reason.as_deref().unwrap_or("no road connection")
        )?;
    }

    let flying = &travel.flying;
    writeln!(
        f,
        "✈️ Flying: {:.1}h flight, {:.1}h total, ${:.2} total (${:.2}/person), convenience {}/10",
        flying.flight_duration_hours,
        flying.total_time_hours,
        flying.total_cost,
        flying.cost_per_person,
        flying.convenience_score
    )?;

    let recommendation = &travel.recommendation;
    writeln!(
        f,
        "👉 Recommended: {} ({})",
        recommendation.preferred, recommendation.reason
    )?;
    if driving.available {
        writeln!(
            f,
            "   Cost difference ${:.2}, time difference {:.1}h",
            recommendation.cost_difference, recommendation.time_difference_hours
        )?;
    }
    writeln!(f)
}

fn write_closing(f: &mut fmt::Formatter<'_>, plan: &TripPlan) -> fmt::Result {
    writeln!(
        f,
        "{} Confidence: {:.0}% ({})",
        plan.confidence_level.emoji(),
        plan.confidence * 100.0,
        plan.confidence_level
    )?;
    if plan.is_high_confidence() {
        writeln!(f, "   This plan matches your interests well.")?;
    } else {
        writeln!(f, "   Some picks are loose matches; review before booking.")?;
    }

    if !plan.warnings.is_empty() {
        writeln!(f)?;
        writeln!(f, "⚠️ Notes")?;
        for warning in &plan.warnings {
            writeln!(f, "   • {warning}")?;
        }
    }
    Ok(())
}
