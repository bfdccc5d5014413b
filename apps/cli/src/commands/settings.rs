//! Scheduler settings commands.

use anyhow::{bail, Context, Result};

use super::{print_json, Engine};

pub fn show(engine: &Engine, json: bool) -> Result<()> {
    let settings = engine.settings()?;
    if json {
        return print_json(&settings);
    }
    println!("total_cycles:   {}", settings.total_cycles);
    println!("daily_goal:     {}", settings.daily_goal);
    println!(
        "base_intervals: {}",
        settings
            .base_intervals
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    );
    Ok(())
}

pub fn set(
    engine: &mut Engine,
    total_cycles: Option<u32>,
    daily_goal: Option<u32>,
    base_intervals: Option<String>,
) -> Result<()> {
    let mut settings = engine.settings()?;

    if let Some(cycles) = total_cycles {
        if cycles == 0 {
            bail!("total-cycles must be at least 1");
        }
        settings.total_cycles = cycles;
    }
    if let Some(goal) = daily_goal {
        settings.daily_goal = goal;
    }
    if let Some(raw) = base_intervals {
        let intervals = raw
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("base-intervals must be a comma-separated list of day counts")?;
        if intervals.is_empty() {
            bail!("base-intervals must not be empty");
        }
        settings.base_intervals = intervals;
    }

    engine.save_settings(&settings)?;
    println!("Settings saved.");
    show(engine, false)
}
