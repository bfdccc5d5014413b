//! CLI subcommand handlers.

pub mod item;
pub mod revise;
pub mod settings;
pub mod stats;

use revision_core::types::Item;
use revision_core::RevisionEngine;

use crate::db::SqliteRepository;

pub type Engine = RevisionEngine<SqliteRepository>;

pub(crate) fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("Nothing here.");
        return;
    }
    println!(
        "{:<36}  {:<28} {:<14} {:<7} {:>5} {:>5}  {}",
        "ID", "NAME", "SUBJECT", "DIFF", "CYCLE", "EASE", "NEXT DUE"
    );
    for item in items {
        let next = item
            .next_revision_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<36}  {:<28} {:<14} {:<7} {:>5} {:>5.2}  {}",
            item.id,
            truncate(&item.name, 28),
            truncate(&item.subject, 14),
            item.difficulty.as_str(),
            item.revision_cycle,
            item.ease_factor,
            next
        );
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
