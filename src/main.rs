use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use hydration_buddy::{
    clock::SystemClock,
    config,
    core::{
        Goal, Tracker,
        report::{self, MAX_TRAILING_DAYS},
    },
    errors::Result,
    ids::UlidGenerator,
    store::{SessionStore, Store},
};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hydration-buddy", version, about = "Track daily water intake")]
struct Cli {
    /// Path to config.toml (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record an intake for today
    Add {
        /// Volume in milliliters
        ml: u32,
        /// Optional label, defaults to "<ml> ml"
        #[arg(long)]
        label: Option<String>,
    },
    /// Remove volume from today (never below zero)
    Remove {
        /// Volume in milliliters
        ml: u32,
        #[arg(long)]
        label: Option<String>,
    },
    /// Revert today's last event
    Undo,
    /// Discard everything recorded today
    Reset,
    /// Set the daily goal
    Goal {
        /// Goal in milliliters
        ml: f64,
    },
    /// Show today's progress and the trailing days
    Status {
        /// Number of trailing days to show
        #[arg(long, value_parser = parse_days)]
        days: Option<usize>,
    },
    /// List every recorded day, newest first
    History,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load configuration
    let app_config = config::load_app_configuration(cli.config.as_deref())
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the store and load the session
    let store = SessionStore::open(&app_config).await;
    if !store.is_persistent() {
        warn!("Running without persistence for this session");
    }
    let mut tracker = Tracker::load(
        store,
        Arc::new(SystemClock),
        Arc::new(UlidGenerator),
        app_config.default_goal(),
    )
    .await;
    info!(today = %tracker.today(), "Session ready");

    // 5. Run the command
    match cli.command {
        Command::Add { ml, label } => {
            match tracker.record_intake(i64::from(ml), label.as_deref()).await {
                Some(event) => println!("{} ({})", event.label(), report::format_event_amount(event.amount())),
                None => println!("Nothing recorded"),
            }
            print_today(&tracker);
        }
        Command::Remove { ml, label } => {
            match tracker.record_intake(-i64::from(ml), label.as_deref()).await {
                Some(event) => println!("{} ({})", event.label(), report::format_event_amount(event.amount())),
                None => println!("Nothing to remove today"),
            }
            print_today(&tracker);
        }
        Command::Undo => {
            match tracker.undo_last().await {
                Some(event) => println!("Undid: {}", event.label()),
                None => println!("Nothing to undo today"),
            }
            print_today(&tracker);
        }
        Command::Reset => {
            match tracker.reset_today().await {
                Some(entry) => println!("Cleared {} ml from today", entry.total()),
                None => println!("Today was already empty"),
            }
        }
        Command::Goal { ml } => {
            let goal = Goal::new(ml)?;
            tracker.set_goal(goal).await;
            println!("Daily goal set to {goal}");
        }
        Command::Status { days } => {
            print_today(&tracker);
            let entry = tracker.today_entry();
            for event in entry.events() {
                println!(
                    "  {}  {:>9}  {}",
                    event.time().format("%H:%M"),
                    report::format_event_amount(event.amount()),
                    event.label()
                );
            }
            println!();
            let days = days
                .unwrap_or(app_config.trailing_days)
                .min(MAX_TRAILING_DAYS);
            for point in tracker.trailing_days(days) {
                println!("  {}  {:>6} ml", point.date, point.amount);
            }
        }
        Command::History => {
            let rows = tracker.history_rows();
            if rows.is_empty() {
                println!("No entries yet - start by adding your first glass");
            }
            for row in rows {
                println!("  {}  {:>6} ml  {:>4}%", row.date, row.total, row.share_percent);
            }
        }
    }

    Ok(())
}

fn print_today<S: Store>(tracker: &Tracker<S>) {
    let total = tracker.today_entry().total();
    println!(
        "Today: {total} ml / {} ({})  {}",
        tracker.goal(),
        report::format_liters(total),
        report::format_progress_bar(tracker.today_progress(), None)
    );
}

/// Parses `--days`, rejecting windows longer than [`MAX_TRAILING_DAYS`].
fn parse_days(raw: &str) -> std::result::Result<usize, String> {
    let days: usize = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number of days"))?;
    if days > MAX_TRAILING_DAYS {
        return Err(format!("at most {MAX_TRAILING_DAYS} days can be shown"));
    }
    Ok(days)
}
