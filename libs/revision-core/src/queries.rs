//! Prioritization layer: pure reads over an item snapshot plus "today".
//!
//! Callers pass the reference date explicitly; [`crate::engine`] wires in
//! the system clock. All comparisons are on calendar dates.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::types::{Item, PriorityItem, Settings, SubjectStrength};

/// Items due for revision: not mastered, scheduled, and due today or earlier.
pub fn due_today<'a>(items: &'a [Item], today: NaiveDate) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|i| !i.is_mastered() && matches!(i.next_revision_date, Some(d) if d <= today))
        .collect()
}

/// Items strictly past their due date.
pub fn overdue<'a>(items: &'a [Item], today: NaiveDate) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|i| !i.is_mastered() && matches!(i.next_revision_date, Some(d) if d < today))
        .collect()
}

/// Items due exactly today (not overdue).
pub fn due_exactly_today<'a>(items: &'a [Item], today: NaiveDate) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|i| !i.is_mastered() && i.next_revision_date == Some(today))
        .collect()
}

/// Items due within the next `days` days (excluding today), soonest first.
pub fn upcoming<'a>(items: &'a [Item], today: NaiveDate, days: u32) -> Vec<&'a Item> {
    let horizon = today + Duration::days(days as i64);
    let mut found: Vec<&Item> = items
        .iter()
        .filter(|i| {
            !i.is_mastered() && matches!(i.next_revision_date, Some(d) if d > today && d <= horizon)
        })
        .collect();
    found.sort_by_key(|i| i.next_revision_date);
    found
}

/// Items revised today, regardless of status.
pub fn completed_today<'a>(items: &'a [Item], today: NaiveDate) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|i| i.last_revision_date == Some(today))
        .collect()
}

/// Count of unmastered items still on the schedule.
pub fn total_pending(items: &[Item]) -> usize {
    items
        .iter()
        .filter(|i| !i.is_mastered() && i.next_revision_date.is_some())
        .count()
}

/// Urgency heuristic for ranking due items; higher is more urgent.
///
/// Overdue days dominate; a low ease factor and a broken streak raise the
/// score independently of overdue-ness.
pub fn priority_score(item: &Item, today: NaiveDate) -> i64 {
    let mut score = 0.0;

    if let Some(next) = item.next_revision_date {
        let days_overdue = (today - next).num_days();
        if days_overdue > 0 {
            score += days_overdue as f64 * 10.0;
        }
    }

    score += (3.0 - item.ease_factor) * 20.0;
    score += 5u32.saturating_sub(item.streak) as f64 * 3.0;
    score += (item.difficulty.priority_weight() * 2) as f64;

    score.round() as i64
}

/// Due items annotated with their priority score, most urgent first,
/// truncated to `limit`.
pub fn priority_revisions(items: &[Item], today: NaiveDate, limit: usize) -> Vec<PriorityItem> {
    let mut ranked: Vec<PriorityItem> = due_today(items, today)
        .into_iter()
        .map(|item| PriorityItem {
            priority_score: priority_score(item, today),
            item: item.clone(),
        })
        .collect();
    ranked.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
    ranked.truncate(limit);
    ranked
}

/// Recall strength per subject, weakest first.
pub fn weak_subjects(items: &[Item]) -> Vec<SubjectStrength> {
    #[derive(Default)]
    struct Acc {
        total: usize,
        mastered: usize,
        ease_sum: f64,
        quality_sum: u64,
        quality_count: u64,
    }

    let mut by_subject: BTreeMap<&str, Acc> = BTreeMap::new();
    for item in items {
        let acc = by_subject.entry(item.subject.as_str()).or_default();
        acc.total += 1;
        acc.ease_sum += item.ease_factor;
        if item.is_mastered() {
            acc.mastered += 1;
        }
        for record in &item.revision_history {
            acc.quality_sum += record.quality.value() as u64;
            acc.quality_count += 1;
        }
    }

    let mut subjects: Vec<SubjectStrength> = by_subject
        .into_iter()
        .map(|(subject, acc)| {
            let avg_quality = if acc.quality_count > 0 {
                acc.quality_sum as f64 / acc.quality_count as f64
            } else {
                3.0
            };
            let strength_score = if acc.quality_count > 0 {
                (avg_quality / 5.0 * 100.0).round() as u32
            } else {
                50
            };
            SubjectStrength {
                subject: subject.to_string(),
                total: acc.total,
                mastered: acc.mastered,
                avg_ease: acc.ease_sum / acc.total as f64,
                avg_quality,
                mastery_percent: (acc.mastered as f64 / acc.total as f64 * 100.0).round() as u32,
                strength_score,
            }
        })
        .collect();
    subjects.sort_by_key(|s| s.strength_score);
    subjects
}

/// Today's completion score, 0-100. Blends coverage of today's due items
/// (70%) with progress toward the daily goal (30%); vacuously 100 when
/// nothing is due.
pub fn productivity_score(items: &[Item], settings: &Settings, today: NaiveDate) -> u32 {
    let due = due_today(items, today).len();
    let completed = completed_today(items, today).len();

    if due == 0 {
        return 100;
    }

    let completion_rate = (completed as f64 / due.max(1) as f64).min(1.0);
    let goal_rate = (completed as f64 / settings.daily_goal.max(1) as f64).min(1.0);

    ((completion_rate * 0.7 + goal_rate * 0.3) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Quality, RevisionRecord, Status};
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn item(id: &str, subject: &str, next: Option<&str>) -> Item {
        Item {
            id: id.into(),
            name: id.to_uppercase(),
            subject: subject.into(),
            difficulty: Difficulty::Medium,
            date_learned: date("2024-01-01"),
            ease_factor: 2.5,
            revision_cycle: 1,
            status: Status::Active,
            streak: 0,
            last_revision_date: None,
            next_revision_date: next.map(date),
            xp_earned: 0,
            revision_history: Vec::new(),
        }
    }

    fn record(quality: u8) -> RevisionRecord {
        RevisionRecord {
            date: date("2024-01-02"),
            quality: Quality::new(quality),
            time_taken_minutes: 10,
            notes: String::new(),
            cycle: 1,
        }
    }

    #[test]
    fn due_today_includes_overdue_but_not_future() {
        let today = date("2024-06-15");
        let items = vec![
            item("a", "Arrays", Some("2024-06-10")),
            item("b", "Arrays", Some("2024-06-15")),
            item("c", "Arrays", Some("2024-06-16")),
            item("d", "Arrays", None),
        ];
        let due: Vec<&str> = due_today(&items, today).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(due, vec!["a", "b"]);
    }

    #[test]
    fn overdue_excludes_items_due_exactly_today() {
        let today = date("2024-06-15");
        let items = vec![
            item("a", "Arrays", Some("2024-06-10")),
            item("b", "Arrays", Some("2024-06-15")),
        ];
        let late: Vec<&str> = overdue(&items, today).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(late, vec!["a"]);
        let exact: Vec<&str> = due_exactly_today(&items, today)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(exact, vec!["b"]);
    }

    #[test]
    fn mastered_items_never_show_up_as_due() {
        let today = date("2024-06-15");
        let mut done = item("a", "Arrays", Some("2024-06-01"));
        done.status = Status::Mastered;
        let items = vec![done];
        assert!(due_today(&items, today).is_empty());
        assert!(overdue(&items, today).is_empty());
        assert!(upcoming(&items, today, 30).is_empty());
        assert_eq!(total_pending(&items), 0);
    }

    #[test]
    fn upcoming_is_windowed_and_sorted() {
        let today = date("2024-06-15");
        let items = vec![
            item("a", "Arrays", Some("2024-06-20")),
            item("b", "Arrays", Some("2024-06-16")),
            item("c", "Arrays", Some("2024-06-15")), // due today, excluded
            item("d", "Arrays", Some("2024-06-30")), // beyond the window
        ];
        let next: Vec<&str> = upcoming(&items, today, 7).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(next, vec!["b", "a"]);
    }

    #[test]
    fn completed_today_ignores_mastery() {
        let today = date("2024-06-15");
        let mut finished = item("a", "Arrays", None);
        finished.status = Status::Mastered;
        finished.last_revision_date = Some(today);
        let mut other = item("b", "Arrays", Some("2024-06-20"));
        other.last_revision_date = Some(date("2024-06-14"));
        let items = vec![finished, other];
        let done: Vec<&str> = completed_today(&items, today).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(done, vec!["a"]);
    }

    #[test]
    fn priority_score_concrete_case() {
        // 5 days overdue, EF 1.3, streak 0, Hard:
        // 50 + (3.0-1.3)*20 + 5*3 + 3*2 = 105
        let today = date("2024-06-15");
        let mut hard = item("a", "Graphs", Some("2024-06-10"));
        hard.ease_factor = 1.3;
        hard.difficulty = Difficulty::Hard;
        assert_eq!(priority_score(&hard, today), 105);
    }

    #[test]
    fn not_yet_due_contributes_no_overdue_points() {
        let today = date("2024-06-15");
        let fresh = item("a", "Graphs", Some("2024-06-20"));
        // (3.0-2.5)*20 + 5*3 + 2*2 = 29
        assert_eq!(priority_score(&fresh, today), 29);
    }

    #[test]
    fn priority_revisions_ranks_and_truncates() {
        let today = date("2024-06-15");
        let mut urgent = item("a", "Graphs", Some("2024-06-05"));
        urgent.ease_factor = 1.5;
        let mild = item("b", "Arrays", Some("2024-06-15"));
        let calm = item("c", "Arrays", Some("2024-06-14"));
        let items = vec![mild, urgent, calm];

        let ranked = priority_revisions(&items, today, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.id, "a");
        assert!(ranked[0].priority_score > ranked[1].priority_score);
    }

    #[test]
    fn weak_subjects_sorted_weakest_first_with_default_score() {
        let mut shaky = item("a", "Graphs", None);
        shaky.revision_history = vec![record(2), record(1)];
        let mut solid = item("b", "Arrays", None);
        solid.revision_history = vec![record(5), record(4)];
        let unrevised = item("c", "Trees", None);
        let items = vec![solid, shaky, unrevised];

        let subjects = weak_subjects(&items);
        let order: Vec<(&str, u32)> = subjects
            .iter()
            .map(|s| (s.subject.as_str(), s.strength_score))
            .collect();
        // avg 1.5/5 -> 30, no history -> 50, avg 4.5/5 -> 90
        assert_eq!(order, vec![("Graphs", 30), ("Trees", 50), ("Arrays", 90)]);
    }

    #[test]
    fn weak_subjects_carries_mastery_percent() {
        let mut done = item("a", "Arrays", None);
        done.status = Status::Mastered;
        let open = item("b", "Arrays", Some("2024-07-01"));
        let subjects = weak_subjects(&[done, open]);
        assert_eq!(subjects[0].mastery_percent, 50);
        assert_eq!(subjects[0].total, 2);
        assert_eq!(subjects[0].mastered, 1);
    }

    #[test]
    fn productivity_is_vacuously_perfect() {
        let today = date("2024-06-15");
        assert_eq!(productivity_score(&[], &Settings::default(), today), 100);
    }

    #[test]
    fn productivity_blends_completion_and_goal() {
        let today = date("2024-06-15");
        let mut items: Vec<Item> = (0..4)
            .map(|n| item(&format!("due{n}"), "Arrays", Some("2024-06-15")))
            .collect();
        for n in 0..2 {
            let mut done = item(&format!("done{n}"), "Arrays", Some("2024-06-20"));
            done.last_revision_date = Some(today);
            items.push(done);
        }
        // completion 2/4 = 0.5, goal 2/5 = 0.4 -> 0.5*0.7 + 0.4*0.3 = 0.47
        assert_eq!(productivity_score(&items, &Settings::default(), today), 47);
    }
}
