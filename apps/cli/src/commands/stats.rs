//! Statistics commands.

use anyhow::Result;
use serde::Serialize;

use super::{print_json, Engine};

#[derive(Debug, Serialize)]
struct StatsView {
    total_items: usize,
    mastered_items: usize,
    pending: usize,
    due_today: usize,
    overdue: usize,
    completed_today: usize,
    productivity_score: u32,
    total_revisions: u64,
    xp_today: u32,
    xp_total: u64,
}

pub fn stats(engine: &Engine, json: bool) -> Result<()> {
    let counters = engine.store().tracker_stats()?;
    let view = StatsView {
        total_items: counters.total_items,
        mastered_items: counters.mastered_items,
        pending: engine.total_pending()?,
        due_today: engine.due_today()?.len(),
        overdue: engine.overdue()?.len(),
        completed_today: engine.completed_today()?.len(),
        productivity_score: engine.productivity_score()?,
        total_revisions: counters.total_revisions,
        xp_today: counters.xp_today,
        xp_total: counters.xp_total,
    };
    if json {
        return print_json(&view);
    }

    println!("Items:        {} ({} mastered)", view.total_items, view.mastered_items);
    println!("Pending:      {}", view.pending);
    println!("Due today:    {} ({} overdue)", view.due_today, view.overdue);
    println!("Done today:   {}", view.completed_today);
    println!("Productivity: {}/100", view.productivity_score);
    println!("Revisions:    {} all-time", view.total_revisions);
    println!("XP:           {} today, {} all-time", view.xp_today, view.xp_total);

    let recent = engine.store().recent_activity(5)?;
    if !recent.is_empty() {
        println!("\nRecent activity:");
        for entry in recent {
            println!("  [{}] {}", entry.kind, entry.text);
        }
    }
    Ok(())
}

pub fn subjects(engine: &Engine, json: bool) -> Result<()> {
    let subjects = engine.weak_subjects()?;
    if json {
        return print_json(&subjects);
    }
    if subjects.is_empty() {
        println!("No subjects yet.");
        return Ok(());
    }
    println!(
        "{:<20} {:>6} {:>9} {:>9} {:>9} {:>9}",
        "SUBJECT", "ITEMS", "MASTERED", "AVG EASE", "AVG QUAL", "STRENGTH"
    );
    for s in &subjects {
        println!(
            "{:<20} {:>6} {:>8}% {:>9.2} {:>9.2} {:>9}",
            s.subject, s.total, s.mastery_percent, s.avg_ease, s.avg_quality, s.strength_score
        );
    }
    println!("\nWeakest subjects are listed first.");
    Ok(())
}
