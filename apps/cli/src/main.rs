//! `dsa-tracker` — spaced-revision tracker for DSA practice.
//!
//! Items you log are scheduled with a modified SM-2 algorithm; rate each
//! recall 1-5 and the tracker decides when you see the item next.

mod commands;
mod db;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use revision_core::RevisionEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use db::SqliteRepository;

#[derive(Parser, Debug)]
#[command(name = "dsa-tracker", about = "Spaced-revision tracker for DSA practice", version)]
struct Cli {
    /// Path to the SQLite database (default: platform data directory).
    #[arg(long, value_name = "FILE", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log a freshly learned item.
    Log {
        /// Item name, e.g. the problem or topic title.
        name: String,
        #[arg(short, long)]
        subject: String,
        /// easy | medium | hard
        #[arg(short, long, default_value = "medium")]
        difficulty: String,
        /// Date learned (YYYY-MM-DD, default today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List all tracked items.
    List {
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show items due for revision (includes overdue).
    Due {
        /// Only items strictly past their due date.
        #[arg(long, conflicts_with = "exact")]
        overdue: bool,
        /// Only items due exactly today.
        #[arg(long)]
        exact: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show revisions coming up after today.
    Upcoming {
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long)]
        json: bool,
    },
    /// Show the most urgent due items first.
    Priority {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Record a completed revision with a 1-5 recall rating.
    Revise {
        id: String,
        /// Recall quality 1-5 (values outside the range are clamped).
        #[arg(short, long)]
        quality: u8,
        /// Minutes spent.
        #[arg(long, default_value_t = 0)]
        time: u32,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Reset an item back to cycle 0.
    Reset { id: String },
    /// Delete an item and its history.
    Delete { id: String },
    /// Show overall progress and today's numbers.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Show per-subject strength, weakest first.
    Subjects {
        #[arg(long)]
        json: bool,
    },
    /// Show or change scheduler settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show {
        #[arg(long)]
        json: bool,
    },
    Set {
        #[arg(long)]
        total_cycles: Option<u32>,
        #[arg(long)]
        daily_goal: Option<u32>,
        /// Comma-separated day counts, e.g. "0,1,3,7,14".
        #[arg(long)]
        base_intervals: Option<String>,
    },
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dsa-tracker")
        .join("tracker.db")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let db_path = cli.db.unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    tracing::debug!(path = %db_path.display(), "opening database");
    let repo = SqliteRepository::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let mut engine = RevisionEngine::new(repo);

    match cli.command {
        Command::Log {
            name,
            subject,
            difficulty,
            date,
        } => commands::item::log(&mut engine, name, subject, difficulty, date),
        Command::List { subject, json } => commands::item::list(&engine, subject, json),
        Command::Due {
            overdue,
            exact,
            json,
        } => commands::revise::due(&engine, overdue, exact, json),
        Command::Upcoming { days, json } => commands::revise::upcoming(&engine, days, json),
        Command::Priority { limit, json } => commands::revise::priority(&engine, limit, json),
        Command::Revise {
            id,
            quality,
            time,
            notes,
        } => commands::revise::revise(&mut engine, id, quality, time, notes),
        Command::Reset { id } => commands::item::reset(&mut engine, id),
        Command::Delete { id } => commands::item::delete(&mut engine, id),
        Command::Stats { json } => commands::stats::stats(&engine, json),
        Command::Subjects { json } => commands::stats::subjects(&engine, json),
        Command::Settings { action } => match action {
            SettingsAction::Show { json } => commands::settings::show(&engine, json),
            SettingsAction::Set {
                total_cycles,
                daily_goal,
                base_intervals,
            } => commands::settings::set(&mut engine, total_cycles, daily_goal, base_intervals),
        },
    }
}
