//! Repository contract the engine persists through.
//!
//! The engine owns no storage of its own; a [`RevisionStore`] is injected
//! at construction. Missing items are `Ok(None)`, never an error — only
//! genuine persistence failures surface as [`StoreError`].

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{Item, RevisionRecord, Settings};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence failure reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend: {0}")]
    Backend(String),

    #[error("corrupt record for item {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Category tag for the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Logged,
    Revision,
    Reset,
    Mastered,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logged => "logged",
            Self::Revision => "revision",
            Self::Reset => "reset",
            Self::Mastered => "mastered",
        }
    }
}

/// Key-value item store plus the bookkeeping logs the engine appends to.
///
/// `save_item` upserts an item's scalar fields; revision history is written
/// only through `append_revision`, keeping the log physically append-only.
pub trait RevisionStore {
    fn get_item(&self, id: &str) -> StoreResult<Option<Item>>;
    fn save_item(&mut self, item: &Item) -> StoreResult<()>;
    fn delete_item(&mut self, id: &str) -> StoreResult<bool>;
    fn list_items(&self) -> StoreResult<Vec<Item>>;

    fn append_revision(&mut self, item_id: &str, record: &RevisionRecord) -> StoreResult<()>;
    fn append_activity(&mut self, kind: ActivityKind, text: &str) -> StoreResult<()>;
    fn add_daily_xp(&mut self, date: NaiveDate, xp: u32) -> StoreResult<()>;
    fn increment_total_revisions(&mut self) -> StoreResult<()>;

    fn get_settings(&self) -> StoreResult<Settings>;
    fn save_settings(&mut self, settings: &Settings) -> StoreResult<()>;
}

/// In-memory store; reference implementation and test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, Item>,
    pub activity: Vec<(ActivityKind, String)>,
    pub daily_xp: BTreeMap<NaiveDate, u32>,
    pub total_revisions: u64,
    settings: Settings,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
}

impl RevisionStore for MemoryStore {
    fn get_item(&self, id: &str) -> StoreResult<Option<Item>> {
        Ok(self.items.get(id).cloned())
    }

    fn save_item(&mut self, item: &Item) -> StoreResult<()> {
        // Preserve existing history; it only grows through append_revision.
        let history = self
            .items
            .get(&item.id)
            .map(|existing| existing.revision_history.clone())
            .unwrap_or_default();
        let mut stored = item.clone();
        stored.revision_history = history;
        self.items.insert(stored.id.clone(), stored);
        Ok(())
    }

    fn delete_item(&mut self, id: &str) -> StoreResult<bool> {
        Ok(self.items.remove(id).is_some())
    }

    fn list_items(&self) -> StoreResult<Vec<Item>> {
        let mut items: Vec<Item> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    fn append_revision(&mut self, item_id: &str, record: &RevisionRecord) -> StoreResult<()> {
        if let Some(item) = self.items.get_mut(item_id) {
            item.revision_history.push(record.clone());
        }
        Ok(())
    }

    fn append_activity(&mut self, kind: ActivityKind, text: &str) -> StoreResult<()> {
        self.activity.push((kind, text.to_string()));
        Ok(())
    }

    fn add_daily_xp(&mut self, date: NaiveDate, xp: u32) -> StoreResult<()> {
        *self.daily_xp.entry(date).or_insert(0) += xp;
        Ok(())
    }

    fn increment_total_revisions(&mut self) -> StoreResult<()> {
        self.total_revisions += 1;
        Ok(())
    }

    fn get_settings(&self) -> StoreResult<Settings> {
        Ok(self.settings.clone())
    }

    fn save_settings(&mut self, settings: &Settings) -> StoreResult<()> {
        self.settings = settings.clone();
        Ok(())
    }
}
