//! Item lifecycle commands: log, list, reset, delete.

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use revision_core::types::{Difficulty, NewItem};
use uuid::Uuid;

use super::{print_items, print_json, Engine};

pub fn log(
    engine: &mut Engine,
    name: String,
    subject: String,
    difficulty: String,
    date: Option<NaiveDate>,
) -> Result<()> {
    let difficulty = Difficulty::from_str(&difficulty.to_lowercase())
        .ok_or_else(|| anyhow!("unknown difficulty '{difficulty}' (easy | medium | hard)"))?;
    let item = engine.log_item(NewItem {
        id: Uuid::new_v4().to_string(),
        name,
        subject,
        difficulty,
        date_learned: date.unwrap_or_else(|| Local::now().date_naive()),
    })?;

    tracing::debug!(id = %item.id, "logged item");
    let due = item
        .next_revision_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".into());
    println!("Logged \"{}\" ({}) — id {}", item.name, item.subject, item.id);
    println!("First revision due {due}.");
    Ok(())
}

pub fn list(engine: &Engine, subject: Option<String>, json: bool) -> Result<()> {
    let mut items = engine.list_items()?;
    if let Some(subject) = subject {
        items.retain(|i| i.subject.eq_ignore_ascii_case(&subject));
    }
    if json {
        return print_json(&items);
    }
    print_items(&items);
    Ok(())
}

pub fn reset(engine: &mut Engine, id: String) -> Result<()> {
    match engine.reset_revision_cycle(&id)? {
        Some(item) => {
            let due = item
                .next_revision_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "today".into());
            println!("Reset \"{}\" — back to cycle 0, due {due}.", item.name);
        }
        None => println!("No item with id {id} — nothing to do."),
    }
    Ok(())
}

pub fn delete(engine: &mut Engine, id: String) -> Result<()> {
    if engine.delete_item(&id)? {
        println!("Deleted {id}.");
    } else {
        println!("No item with id {id} — nothing to do.");
    }
    Ok(())
}
