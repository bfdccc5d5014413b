//! The revision engine: state transitions over an injected store, plus
//! clock-aware wrappers around the pure query layer.

use chrono::{Local, NaiveDate};

use crate::queries;
use crate::scheduler::{self, INITIAL_EASE};
use crate::store::{ActivityKind, RevisionStore, StoreResult};
use crate::types::{
    Item, NewItem, PriorityItem, Quality, RevisionRecord, RevisionResult, Status, SubjectStrength,
};

/// Single-writer scheduling engine. Mutating operations take `&mut self`,
/// so exclusive access to the store is compiler-enforced; construct one
/// engine per process.
pub struct RevisionEngine<S> {
    store: S,
}

impl<S> RevisionEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: RevisionStore> RevisionEngine<S> {
    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Log a freshly learned item: cycle 0, neutral ease, scheduled from
    /// its learn date (first interval is 0 with default settings, so it is
    /// due the day it was learned).
    pub fn log_item(&mut self, new: NewItem) -> StoreResult<Item> {
        let settings = self.store.get_settings()?;
        let mut item = Item {
            id: new.id,
            name: new.name,
            subject: new.subject,
            difficulty: new.difficulty,
            date_learned: new.date_learned,
            ease_factor: INITIAL_EASE,
            revision_cycle: 0,
            status: Status::Active,
            streak: 0,
            last_revision_date: None,
            next_revision_date: None,
            xp_earned: 0,
            revision_history: Vec::new(),
        };
        item.next_revision_date = scheduler::calculate_next_date(&item, &settings);

        self.store.save_item(&item)?;
        self.store.append_activity(
            ActivityKind::Logged,
            &format!("Logged \"{}\" ({})", item.name, item.subject),
        )?;
        Ok(item)
    }

    /// Process a completed revision for `id`.
    ///
    /// Returns `Ok(None)` when the item does not exist, and also when it is
    /// already mastered: mastery is terminal, so further revisions are
    /// no-ops rather than errors.
    ///
    /// A failed recall (quality < 3) regresses the cycle by one instead of
    /// advancing it, resets the streak, and flags the item as needing
    /// revision. The history entry is appended either way.
    pub fn complete_revision(
        &mut self,
        id: &str,
        quality: Quality,
        time_taken_minutes: u32,
        notes: &str,
    ) -> StoreResult<Option<RevisionResult>> {
        let settings = self.store.get_settings()?;
        let Some(mut item) = self.store.get_item(id)? else {
            return Ok(None);
        };
        if item.is_mastered() {
            return Ok(None);
        }

        let today = Self::today();
        let new_ease = scheduler::update_ease_factor(item.ease_factor, quality);

        let record = RevisionRecord {
            date: today,
            quality,
            time_taken_minutes,
            notes: notes.to_string(),
            cycle: item.revision_cycle + 1,
        };

        let new_cycle = if quality.is_successful() {
            item.revision_cycle + 1
        } else {
            item.revision_cycle.saturating_sub(1)
        };
        let new_streak = if quality.is_successful() { item.streak + 1 } else { 0 };
        let new_status = if new_cycle >= settings.total_cycles {
            Status::Mastered
        } else if !quality.is_successful() {
            Status::NeedsRevision
        } else {
            // No NeedsRevision -> Active recovery: once flagged weak, an item
            // stays flagged until mastered.
            item.status
        };
        let xp = scheduler::calculate_revision_xp(quality, item.difficulty, new_cycle);

        item.ease_factor = new_ease;
        item.revision_cycle = new_cycle.min(settings.total_cycles);
        item.streak = new_streak;
        item.status = new_status;
        item.last_revision_date = Some(today);
        item.xp_earned += xp;
        item.next_revision_date = scheduler::calculate_next_date(&item, &settings);
        item.revision_history.push(record.clone());

        self.store.append_revision(&item.id, &record)?;
        self.store.save_item(&item)?;
        self.store.add_daily_xp(today, xp)?;
        self.store.increment_total_revisions()?;

        let mastered = new_status == Status::Mastered;
        self.store.append_activity(
            ActivityKind::Revision,
            &format!(
                "Revised \"{}\" (Cycle {}/{}, Quality: {}/5)",
                item.name,
                new_cycle,
                settings.total_cycles,
                quality.value()
            ),
        )?;
        if mastered {
            self.store
                .append_activity(ActivityKind::Mastered, &format!("Mastered \"{}\"", item.name))?;
        }

        Ok(Some(RevisionResult {
            xp_earned: xp,
            new_cycle,
            total_cycles: settings.total_cycles,
            mastered,
            item,
        }))
    }

    /// Hard reset: back to cycle 0 with neutral ease, flagged as needing
    /// revision and due today. Revision history is kept.
    pub fn reset_revision_cycle(&mut self, id: &str) -> StoreResult<Option<Item>> {
        let Some(mut item) = self.store.get_item(id)? else {
            return Ok(None);
        };

        item.revision_cycle = 0;
        item.ease_factor = INITIAL_EASE;
        item.streak = 0;
        item.status = Status::NeedsRevision;
        item.next_revision_date = Some(Self::today());

        self.store.save_item(&item)?;
        self.store.append_activity(
            ActivityKind::Reset,
            &format!("Reset revisions for \"{}\"", item.name),
        )?;
        Ok(Some(item))
    }

    pub fn delete_item(&mut self, id: &str) -> StoreResult<bool> {
        self.store.delete_item(id)
    }

    pub fn get_item(&self, id: &str) -> StoreResult<Option<Item>> {
        self.store.get_item(id)
    }

    pub fn list_items(&self) -> StoreResult<Vec<Item>> {
        self.store.list_items()
    }

    pub fn settings(&self) -> StoreResult<crate::types::Settings> {
        self.store.get_settings()
    }

    pub fn save_settings(&mut self, settings: &crate::types::Settings) -> StoreResult<()> {
        self.store.save_settings(settings)
    }

    pub fn due_today(&self) -> StoreResult<Vec<Item>> {
        let items = self.store.list_items()?;
        Ok(cloned(queries::due_today(&items, Self::today())))
    }

    pub fn overdue(&self) -> StoreResult<Vec<Item>> {
        let items = self.store.list_items()?;
        Ok(cloned(queries::overdue(&items, Self::today())))
    }

    pub fn due_exactly_today(&self) -> StoreResult<Vec<Item>> {
        let items = self.store.list_items()?;
        Ok(cloned(queries::due_exactly_today(&items, Self::today())))
    }

    pub fn upcoming(&self, days: u32) -> StoreResult<Vec<Item>> {
        let items = self.store.list_items()?;
        Ok(cloned(queries::upcoming(&items, Self::today(), days)))
    }

    pub fn completed_today(&self) -> StoreResult<Vec<Item>> {
        let items = self.store.list_items()?;
        Ok(cloned(queries::completed_today(&items, Self::today())))
    }

    pub fn total_pending(&self) -> StoreResult<usize> {
        let items = self.store.list_items()?;
        Ok(queries::total_pending(&items))
    }

    pub fn priority_revisions(&self, limit: usize) -> StoreResult<Vec<PriorityItem>> {
        let items = self.store.list_items()?;
        Ok(queries::priority_revisions(&items, Self::today(), limit))
    }

    pub fn weak_subjects(&self) -> StoreResult<Vec<SubjectStrength>> {
        let items = self.store.list_items()?;
        Ok(queries::weak_subjects(&items))
    }

    pub fn productivity_score(&self) -> StoreResult<u32> {
        let settings = self.store.get_settings()?;
        let items = self.store.list_items()?;
        Ok(queries::productivity_score(&items, &settings, Self::today()))
    }
}

fn cloned(items: Vec<&Item>) -> Vec<Item> {
    items.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Difficulty, Settings};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn engine() -> RevisionEngine<MemoryStore> {
        RevisionEngine::new(MemoryStore::new())
    }

    fn log(engine: &mut RevisionEngine<MemoryStore>, id: &str) -> Item {
        engine
            .log_item(NewItem {
                id: id.into(),
                name: format!("Problem {id}"),
                subject: "Graphs".into(),
                difficulty: Difficulty::Medium,
                date_learned: Local::now().date_naive(),
            })
            .unwrap()
    }

    #[test]
    fn logged_item_is_due_on_its_learn_date() {
        let mut engine = engine();
        let item = log(&mut engine, "q1");
        assert_eq!(item.revision_cycle, 0);
        assert_eq!(item.ease_factor, 2.5);
        assert_eq!(item.next_revision_date, Some(item.date_learned));
        assert_eq!(engine.due_today().unwrap().len(), 1);
    }

    #[test]
    fn good_revision_advances_cycle_and_raises_ease() {
        let mut engine = engine();
        log(&mut engine, "q1");

        let result = engine
            .complete_revision("q1", Quality::new(5), 10, "")
            .unwrap()
            .unwrap();
        let today = Local::now().date_naive();

        assert_eq!(result.new_cycle, 1);
        assert!(!result.mastered);
        assert_eq!(result.item.ease_factor, 2.6);
        assert_eq!(result.item.streak, 1);
        assert_eq!(result.item.status, Status::Active);
        // round(1 * 2.6/2.5) = 1 day out
        assert_eq!(result.item.next_revision_date, Some(today + Duration::days(1)));
        assert_eq!(result.item.last_revision_date, Some(today));

        let stored = engine.get_item("q1").unwrap().unwrap();
        assert_eq!(stored.revision_history.len(), 1);
        assert_eq!(stored.revision_history[0].cycle, 1);
    }

    #[test]
    fn failed_recall_regresses_cycle_and_flags_item() {
        let mut engine = engine();
        let mut item = log(&mut engine, "q1");
        item.revision_cycle = 3;
        item.streak = 4;
        engine.store_mut().save_item(&item).unwrap();

        let result = engine
            .complete_revision("q1", Quality::new(1), 5, "blanked")
            .unwrap()
            .unwrap();

        assert_eq!(result.new_cycle, 2);
        assert_eq!(result.item.streak, 0);
        assert_eq!(result.item.status, Status::NeedsRevision);
        // History entry still records the attempted advance.
        let stored = engine.get_item("q1").unwrap().unwrap();
        assert_eq!(stored.revision_history[0].cycle, 4);
    }

    #[test]
    fn failed_recall_at_cycle_zero_stays_at_zero() {
        let mut engine = engine();
        log(&mut engine, "q1");
        let result = engine
            .complete_revision("q1", Quality::new(2), 5, "")
            .unwrap()
            .unwrap();
        assert_eq!(result.new_cycle, 0);
    }

    #[test]
    fn final_cycle_masters_the_item() {
        let mut engine = engine();
        let mut item = log(&mut engine, "q1");
        item.revision_cycle = 14;
        engine.store_mut().save_item(&item).unwrap();

        let result = engine
            .complete_revision("q1", Quality::new(4), 8, "")
            .unwrap()
            .unwrap();

        assert_eq!(result.new_cycle, 15);
        assert!(result.mastered);
        assert_eq!(result.item.status, Status::Mastered);
        assert_eq!(result.item.next_revision_date, None);
        assert!(engine.due_today().unwrap().is_empty());
        assert_eq!(engine.total_pending().unwrap(), 0);
    }

    #[test]
    fn mastered_item_cannot_be_revised_again() {
        let mut engine = engine();
        let mut item = log(&mut engine, "q1");
        item.revision_cycle = 14;
        engine.store_mut().save_item(&item).unwrap();
        engine.complete_revision("q1", Quality::new(4), 8, "").unwrap();

        let again = engine.complete_revision("q1", Quality::new(1), 8, "").unwrap();
        assert!(again.is_none());

        let stored = engine.get_item("q1").unwrap().unwrap();
        assert_eq!(stored.status, Status::Mastered);
        assert_eq!(stored.revision_cycle, 15);
    }

    #[test]
    fn unknown_item_is_a_noop() {
        let mut engine = engine();
        assert!(engine
            .complete_revision("missing", Quality::new(4), 0, "")
            .unwrap()
            .is_none());
        assert!(engine.reset_revision_cycle("missing").unwrap().is_none());
    }

    #[test]
    fn revision_bookkeeping_hits_every_log() {
        let mut engine = engine();
        log(&mut engine, "q1");
        let result = engine
            .complete_revision("q1", Quality::new(4), 12, "")
            .unwrap()
            .unwrap();

        let today = Local::now().date_naive();
        let store = engine.store();
        assert_eq!(store.total_revisions, 1);
        assert_eq!(store.daily_xp.get(&today), Some(&result.xp_earned));
        assert!(store
            .activity
            .iter()
            .any(|(kind, _)| *kind == ActivityKind::Revision));
    }

    #[test]
    fn reset_zeroes_progress_but_keeps_history() {
        let mut engine = engine();
        log(&mut engine, "q1");
        engine.complete_revision("q1", Quality::new(5), 10, "").unwrap();
        engine.complete_revision("q1", Quality::new(4), 10, "").unwrap();

        let reset = engine.reset_revision_cycle("q1").unwrap().unwrap();
        assert_eq!(reset.revision_cycle, 0);
        assert_eq!(reset.ease_factor, 2.5);
        assert_eq!(reset.streak, 0);
        assert_eq!(reset.status, Status::NeedsRevision);
        assert_eq!(reset.next_revision_date, Some(Local::now().date_naive()));

        let stored = engine.get_item("q1").unwrap().unwrap();
        assert_eq!(stored.revision_history.len(), 2);
    }

    #[test]
    fn custom_total_cycles_respected() {
        let settings = Settings {
            total_cycles: 2,
            ..Settings::default()
        };
        let mut engine = RevisionEngine::new(MemoryStore::with_settings(settings));
        log(&mut engine, "q1");
        engine.complete_revision("q1", Quality::new(4), 5, "").unwrap();
        let result = engine
            .complete_revision("q1", Quality::new(4), 5, "")
            .unwrap()
            .unwrap();
        assert!(result.mastered);
        assert_eq!(result.item.revision_cycle, 2);
    }
}
