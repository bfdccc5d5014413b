//! Revision commands: rating a recall, and the due/upcoming/priority views.

use anyhow::Result;
use revision_core::types::Quality;

use super::{print_items, print_json, Engine};

pub fn revise(engine: &mut Engine, id: String, quality: u8, time: u32, notes: String) -> Result<()> {
    // Out-of-range ratings are clamped, not rejected.
    let quality = Quality::new(quality);
    match engine.complete_revision(&id, quality, time, &notes)? {
        None => println!("No revisable item with id {id} — nothing to do."),
        Some(result) => {
            if result.mastered {
                println!(
                    "Mastered \"{}\" after {} cycles! +{} XP",
                    result.item.name, result.total_cycles, result.xp_earned
                );
            } else {
                let next = result
                    .item
                    .next_revision_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "Revised \"{}\" (cycle {}/{}, quality {}/5) — +{} XP, next due {next}",
                    result.item.name,
                    result.new_cycle,
                    result.total_cycles,
                    quality.value(),
                    result.xp_earned
                );
            }
            if !quality.is_successful() {
                println!("Recall failed — cycle regressed and the item is flagged for revision.");
            }
        }
    }
    Ok(())
}

pub fn due(engine: &Engine, overdue_only: bool, exact_only: bool, json: bool) -> Result<()> {
    let items = if overdue_only {
        engine.overdue()?
    } else if exact_only {
        engine.due_exactly_today()?
    } else {
        engine.due_today()?
    };
    if json {
        return print_json(&items);
    }
    print_items(&items);
    Ok(())
}

pub fn upcoming(engine: &Engine, days: u32, json: bool) -> Result<()> {
    let items = engine.upcoming(days)?;
    if json {
        return print_json(&items);
    }
    print_items(&items);
    Ok(())
}

pub fn priority(engine: &Engine, limit: usize, json: bool) -> Result<()> {
    let ranked = engine.priority_revisions(limit)?;
    if json {
        return print_json(&ranked);
    }
    if ranked.is_empty() {
        println!("Nothing due — all caught up.");
        return Ok(());
    }
    println!("{:>5}  {:<36}  {:<28} {}", "SCORE", "ID", "NAME", "DUE");
    for entry in &ranked {
        let due = entry
            .item
            .next_revision_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>5}  {:<36}  {:<28} {due}",
            entry.priority_score, entry.item.id, entry.item.name
        );
    }
    Ok(())
}
