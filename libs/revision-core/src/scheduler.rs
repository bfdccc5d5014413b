//! Pure scheduling math: next-date, ease-factor, and XP calculations.
//!
//! Modified SM-2: the interval table in [`Settings`] gives the base interval
//! per revision cycle, and the per-item ease factor scales it linearly
//! around the neutral ease of 2.5.

use chrono::{Duration, NaiveDate};

use crate::types::{Difficulty, Item, Quality, Settings};

/// Ease factor assigned to new and reset items.
pub const INITIAL_EASE: f64 = 2.5;

/// Floor for the ease factor, per SM-2.
pub const MINIMUM_EASE: f64 = 1.3;

/// Geometric growth applied to cycles beyond the configured interval table.
const GROWTH_FACTOR: f64 = 1.5;

/// Minimum XP awarded for any completed revision.
const MIN_XP: i64 = 5;

/// Compute when an item is next due, or `None` once all cycles are done.
///
/// Anchored at the last revision date, falling back to the date the item
/// was learned. Pure and deterministic.
pub fn calculate_next_date(item: &Item, settings: &Settings) -> Option<NaiveDate> {
    if item.revision_cycle >= settings.total_cycles {
        return None;
    }

    let cycle = item.revision_cycle as usize;
    let base = match settings.base_intervals.get(cycle) {
        Some(&days) => days,
        None => {
            let last = settings.base_intervals.last().copied().unwrap_or(0);
            let steps_beyond = (cycle - settings.base_intervals.len() + 1) as u32;
            extrapolate_interval(last, steps_beyond)
        }
    };

    // Scale around the neutral ease. A base interval of 0 (cycle 0 with the
    // default table) stays 0: a freshly learned item is due on its learn date.
    let adjusted = if base == 0 {
        0
    } else {
        ((base as f64 * (item.ease_factor / INITIAL_EASE)).round() as i64).max(1)
    };

    let anchor = item.last_revision_date.unwrap_or(item.date_learned);
    Some(anchor + Duration::days(adjusted))
}

/// Base interval for a cycle past the end of the interval table:
/// last known interval times 1.5 per step beyond, rounded.
pub fn extrapolate_interval(last_known: u32, steps_beyond: u32) -> u32 {
    (last_known as f64 * GROWTH_FACTOR.powi(steps_beyond as i32)).round() as u32
}

/// SM-2 ease-factor update: `EF' = EF + (0.1 - (5-q)(0.08 + (5-q)*0.02))`,
/// rounded to two decimals and floored at [`MINIMUM_EASE`].
pub fn update_ease_factor(current: f64, quality: Quality) -> f64 {
    let q = quality.value() as f64;
    let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    let updated = ((current + delta) * 100.0).round() / 100.0;
    updated.max(MINIMUM_EASE)
}

/// XP for one revision: difficulty base, quality bonus, cycle-progression
/// bonus, floored at 5.
pub fn calculate_revision_xp(quality: Quality, difficulty: Difficulty, cycle: u32) -> u32 {
    let xp = difficulty.base_xp() as i64
        + (quality.value() as i64 - 3) * 3
        + (cycle as i64 / 3) * 2;
    xp.max(MIN_XP) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn item_at(cycle: u32, ease: f64) -> Item {
        Item {
            id: "q1".into(),
            name: "Two Sum".into(),
            subject: "Arrays".into(),
            difficulty: Difficulty::Medium,
            date_learned: date("2024-01-01"),
            ease_factor: ease,
            revision_cycle: cycle,
            status: Status::Active,
            streak: 0,
            last_revision_date: None,
            next_revision_date: None,
            xp_earned: 0,
            revision_history: Vec::new(),
        }
    }

    #[test]
    fn fresh_item_due_on_learn_date() {
        let item = item_at(0, 2.5);
        let next = calculate_next_date(&item, &Settings::default());
        assert_eq!(next, Some(date("2024-01-01")));
    }

    #[test]
    fn cycle_one_interval_scales_with_ease() {
        let mut item = item_at(1, 2.6);
        item.last_revision_date = Some(date("2024-01-05"));
        // round(1 * 2.6/2.5) = round(1.04) = 1
        let next = calculate_next_date(&item, &Settings::default());
        assert_eq!(next, Some(date("2024-01-06")));
    }

    #[test]
    fn low_ease_shrinks_interval_but_never_below_one_day() {
        let mut item = item_at(1, 1.3);
        item.last_revision_date = Some(date("2024-01-05"));
        // round(1 * 0.52) = 1 after the floor
        let next = calculate_next_date(&item, &Settings::default());
        assert_eq!(next, Some(date("2024-01-06")));
    }

    #[test]
    fn high_ease_stretches_interval() {
        let mut item = item_at(5, 3.75);
        item.last_revision_date = Some(date("2024-01-01"));
        // base 21, round(21 * 1.5) = 32
        let settings = Settings {
            total_cycles: 20,
            ..Settings::default()
        };
        let next = calculate_next_date(&item, &settings);
        assert_eq!(next, Some(date("2024-02-02")));
    }

    #[test]
    fn mastered_cycle_yields_no_date() {
        let item = item_at(15, 2.5);
        assert_eq!(calculate_next_date(&item, &Settings::default()), None);
    }

    #[test]
    fn next_date_is_pure() {
        let mut item = item_at(7, 2.1);
        item.last_revision_date = Some(date("2024-03-10"));
        let settings = Settings::default();
        let first = calculate_next_date(&item, &settings);
        let second = calculate_next_date(&item, &settings);
        assert_eq!(first, second);
    }

    #[test]
    fn extrapolates_beyond_interval_table() {
        // Table of length 15, total_cycles 20: cycle 15 is one step beyond.
        let settings = Settings {
            total_cycles: 20,
            ..Settings::default()
        };
        let mut item = item_at(15, 2.5);
        item.last_revision_date = Some(date("2024-01-01"));
        // 240 * 1.5 = 360 days
        let next = calculate_next_date(&item, &settings);
        assert_eq!(next, Some(date("2024-12-26")));
    }

    #[test]
    fn extrapolation_is_geometric() {
        assert_eq!(extrapolate_interval(240, 1), 360);
        assert_eq!(extrapolate_interval(240, 2), 540);
        assert_eq!(extrapolate_interval(240, 3), 810);
    }

    #[test]
    fn ease_never_drops_below_floor() {
        for q in 1..=5 {
            let updated = update_ease_factor(1.3, Quality::new(q));
            assert!(updated >= MINIMUM_EASE, "q={q} gave {updated}");
        }
    }

    #[test]
    fn ease_update_is_monotonic_in_quality() {
        let ef = 2.5;
        assert!(update_ease_factor(ef, Quality::new(5)) > update_ease_factor(ef, Quality::new(1)));
    }

    #[test]
    fn perfect_recall_raises_ease_by_a_tenth() {
        assert_eq!(update_ease_factor(2.5, Quality::new(5)), 2.6);
    }

    #[test]
    fn quality_three_slightly_lowers_ease() {
        // SM-2's near-neutral point is q=4, not q=3.
        assert_eq!(update_ease_factor(2.5, Quality::new(3)), 2.36);
    }

    #[test]
    fn quality_clamps_out_of_range_input() {
        assert_eq!(update_ease_factor(2.5, Quality::new(0)), update_ease_factor(2.5, Quality::new(1)));
        assert_eq!(update_ease_factor(2.5, Quality::new(9)), update_ease_factor(2.5, Quality::new(5)));
    }

    #[test]
    fn xp_floors_at_five() {
        // 10 + (1-3)*3 + 0 = 4 -> clamped
        assert_eq!(calculate_revision_xp(Quality::new(1), Difficulty::Easy, 0), 5);
    }

    #[test]
    fn xp_rewards_difficulty_quality_and_progress() {
        // 25 + (5-3)*3 + (9/3)*2 = 37
        assert_eq!(calculate_revision_xp(Quality::new(5), Difficulty::Hard, 9), 37);
        // 15 + 0 + 0 = 15
        assert_eq!(calculate_revision_xp(Quality::new(3), Difficulty::Medium, 2), 15);
    }
}
