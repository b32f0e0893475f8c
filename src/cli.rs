//! CLI command definitions and subcommands

use crate::config::PlannerConfig;
use crate::models::PlanRequest;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Smart Trip Scout - day-by-day trip plans, cost estimates and travel comparisons
#[derive(Parser, Debug)]
#[command(
    name = "tripscout",
    version,
    about = "Plan trips: scored itineraries, cost estimates and driving-vs-flying comparisons",
    after_help = "Configuration is read from ~/.config/tripscout/config.toml and TRIPSCOUT_* environment variables."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a full trip plan with itinerary, costs and optional travel comparison
    Plan(PlanArgs),

    /// Estimate trip costs only
    Estimate(EstimateArgs),

    /// Compare driving and flying between two places
    Compare(CompareArgs),
}

/// Options shared by planning and cost estimation
#[derive(Args, Debug, Clone)]
pub struct TripArgs {
    /// Destination, e.g. "Paris, France"
    pub destination: String,

    /// First day of the trip (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: String,

    /// Last day of the trip (YYYY-MM-DD)
    #[arg(short, long)]
    pub end: String,

    /// Budget tier: low, mid or luxury
    #[arg(short, long)]
    pub budget: Option<String>,

    /// Number of travelers
    #[arg(short, long)]
    pub travelers: Option<u32>,

    /// Leave accommodation out of the estimate
    #[arg(long)]
    pub no_lodging: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub trip: TripArgs,

    /// Interests, comma separated or repeated (e.g. food,art)
    #[arg(short, long, value_delimiter = ',')]
    pub interests: Vec<String>,

    /// Where the trip starts; enables the driving-vs-flying comparison
    #[arg(short, long)]
    pub origin: Option<String>,

    /// Email the finished plan to this address
    #[arg(long, value_name = "ADDRESS")]
    pub email: Option<String>,

    /// Send a push notification when the plan is ready
    #[arg(long)]
    pub push: bool,

    /// Print the plan as JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[command(flatten)]
    pub trip: TripArgs,

    /// Print the breakdown as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Starting point
    #[arg(short, long)]
    pub origin: String,

    /// Destination
    pub destination: String,

    /// Number of travelers
    #[arg(short, long, default_value_t = 1)]
    pub travelers: u32,

    /// Print the comparison as JSON
    #[arg(long)]
    pub json: bool,
}

impl TripArgs {
    #[must_use]
    pub fn budget_tier(&self, defaults: &PlannerConfig) -> String {
        self.budget
            .clone()
            .unwrap_or_else(|| defaults.default_budget_tier.clone())
    }

    #[must_use]
    pub fn travelers(&self, defaults: &PlannerConfig) -> u32 {
        self.travelers.unwrap_or(defaults.default_travelers)
    }
}

impl PlanArgs {
    /// Raw request; validation happens in the planner
    #[must_use]
    pub fn to_request(&self, defaults: &PlannerConfig) -> PlanRequest {
        PlanRequest {
            destination: self.trip.destination.clone(),
            start_date: self.trip.start.clone(),
            end_date: self.trip.end.clone(),
            interests: self.interests.clone(),
            budget_tier: self.trip.budget_tier(defaults),
            travelers: self.trip.travelers(defaults),
            include_lodging: !self.trip.no_lodging,
            origin: self.origin.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_args_to_request() {
        let cli = Cli::parse_from([
            "tripscout",
            "plan",
            "Paris, France",
            "--start",
            "2025-09-01",
            "--end",
            "2025-09-05",
            "--interests",
            "food,art",
            "--interests",
            "history",
            "--travelers",
            "2",
            "--origin",
            "London",
        ]);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        let request = args.to_request(&PlannerConfig::default());

        assert_eq!(request.destination, "Paris, France");
        assert_eq!(request.interests, vec!["food", "art", "history"]);
        assert_eq!(request.budget_tier, "mid");
        assert_eq!(request.travelers, 2);
        assert!(request.include_lodging);
        assert_eq!(request.origin.as_deref(), Some("London"));
    }

    #[test]
    fn test_estimate_defaults_from_config() {
        let cli = Cli::parse_from([
            "tripscout",
            "--verbose",
            "estimate",
            "Rome",
            "-s",
            "2025-05-01",
            "-e",
            "2025-05-03",
            "--no-lodging",
        ]);
        assert!(cli.verbose);
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate command");
        };
        let defaults = PlannerConfig {
            default_budget_tier: "luxury".to_string(),
            default_travelers: 4,
            ..PlannerConfig::default()
        };
        assert_eq!(args.trip.budget_tier(&defaults), "luxury");
        assert_eq!(args.trip.travelers(&defaults), 4);
        assert!(args.trip.no_lodging);
    }
}
