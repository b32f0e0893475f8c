use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use tripscout::cli::{Cli, Command, CompareArgs, EstimateArgs, PlanArgs};
use tripscout::config::TripScoutConfig;
use tripscout::notify::{EmailNotifier, NotificationSink, PushNotifier, deliver_all};
use tripscout::planning::{CostEstimator, PlanningEvent, TravelComparator, TripPlanner};
use tripscout::{TripScoutError, logging, report};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TripScoutConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    debug!(?cli, "Parsed command line");

    match cli.command {
        Command::Plan(args) => run_plan(&config, &args).await,
        Command::Estimate(args) => run_estimate(&config, &args),
        Command::Compare(args) => run_compare(&args),
    }
}

/// Fatal library errors are shown as their user-facing message
fn user_error(e: TripScoutError) -> anyhow::Error {
    anyhow!(e.user_message())
}

fn print_event(event: &PlanningEvent, to_stderr: bool) {
    let line = match event {
        PlanningEvent::Stage(stage) => stage.message().to_string(),
        PlanningEvent::Warning(message) => format!("⚠️ {message}"),
        PlanningEvent::Failed(message) => format!("❌ {message}"),
        PlanningEvent::Completed { confidence, days } => {
            format!("🎉 Planned {days} days ({:.0}% confidence)", confidence * 100.0)
        }
    };
    if to_stderr {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

async fn run_plan(config: &TripScoutConfig, args: &PlanArgs) -> Result<()> {
    let planner = TripPlanner::from_config(config).map_err(user_error)?;
    let request = args.to_request(&config.planner);

    let (tx, mut rx) = mpsc::channel(32);
    let (cancel_tx, cancel_rx) = watch::channel(false);

    // Progress goes to stderr when stdout carries JSON
    let to_stderr = args.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(&event, to_stderr);
        }
    });
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            let _ = cancel_tx.send(true);
        }
    });

    let result = planner.plan_with_progress(&request, tx, cancel_rx).await;
    interrupt.abort();
    printer.await.context("Progress printer stopped unexpectedly")?;
    let plan = result.map_err(user_error)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?
        );
    } else {
        println!();
        print!("{}", report::render(&plan));
    }

    let mut sinks: Vec<Box<dyn NotificationSink>> = Vec::new();
    let mut setup_warnings = Vec::new();
    if let Some(address) = &args.email {
        match EmailNotifier::from_config(&config.notifications, address) {
            Ok(notifier) => sinks.push(Box::new(notifier)),
            Err(e) => setup_warnings.push(format!("Email not sent: {e:#}")),
        }
    }
    if args.push {
        match PushNotifier::from_config(&config.notifications) {
            Ok(notifier) => sinks.push(Box::new(notifier)),
            Err(e) => setup_warnings.push(format!("Push not sent: {e:#}")),
        }
    }

    let delivery_warnings = deliver_all(&sinks, &plan).await;
    for warning in setup_warnings.iter().chain(&delivery_warnings) {
        eprintln!("⚠️ {warning}");
    }
    if !sinks.is_empty() && delivery_warnings.len() < sinks.len() {
        eprintln!("📨 Notifications sent");
    }
    Ok(())
}

fn run_estimate(config: &TripScoutConfig, args: &EstimateArgs) -> Result<()> {
    let trip = &args.trip;
    let travelers = trip.travelers(&config.planner);
    let breakdown = CostEstimator::default()
        .estimate_raw(
            &trip.destination,
            &trip.start,
            &trip.end,
            &trip.budget_tier(&config.planner),
            travelers,
            !trip.no_lodging,
        )
        .map_err(user_error)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&breakdown).context("Failed to serialize costs")?
        );
    } else {
        let dates = tripscout::models::DateRange::parse(&trip.start, &trip.end)
            .map_err(user_error)?;
        println!("{} ({} days)", trip.destination, dates.days());
        print!("{}", report::render_costs(&breakdown, travelers, dates.nights()));
    }
    Ok(())
}

fn run_compare(args: &CompareArgs) -> Result<()> {
    let comparison = TravelComparator::default()
        .compare(&args.origin, &args.destination, args.travelers)
        .map_err(user_error)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&comparison).context("Failed to serialize comparison")?
        );
    } else {
        print!("{}", report::render_travel(&comparison));
    }
    Ok(())
}
