//! Repository pattern for database access.

use std::collections::HashMap;
use std::path::Path;

use chrono::{Local, NaiveDate};
use revision_core::store::{ActivityKind, RevisionStore, StoreResult};
use revision_core::types::{Difficulty, Item, Quality, RevisionRecord, Settings, Status};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::error::DbError;

type Result<T> = std::result::Result<T, DbError>;

/// One line from the activity feed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivityEntry {
    pub logged_at: String,
    pub kind: String,
    pub text: String,
}

/// Lifetime counters and today's totals for the stats view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrackerStats {
    pub total_items: usize,
    pub mastered_items: usize,
    pub total_revisions: u64,
    pub xp_today: u32,
    pub xp_total: u64,
}

/// SQLite-backed [`RevisionStore`] plus the read-side queries the CLI needs.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_SETTINGS)?;
        self.conn.execute_batch(super::schema::INIT_USER_STATS)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![super::schema::SCHEMA_VERSION],
        )?;
        Ok(())
    }

    fn fetch_item(&self, id: &str) -> Result<Option<Item>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, subject, difficulty, date_learned, ease_factor,
                        revision_cycle, status, streak, last_revision_date,
                        next_revision_date, xp_earned
                 FROM items WHERE id = ?1",
                params![id],
                ItemRow::from_row,
            )
            .optional()?;

        match row {
            Some(raw) => {
                let mut item = raw.into_item()?;
                item.revision_history = self.fetch_history(&item.id)?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    fn fetch_items(&self) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, subject, difficulty, date_learned, ease_factor,
                    revision_cycle, status, streak, last_revision_date,
                    next_revision_date, xp_earned
             FROM items ORDER BY date_learned, id",
        )?;
        let rows = stmt.query_map([], ItemRow::from_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?.into_item()?);
        }

        let mut histories = self.fetch_all_histories()?;
        for item in &mut items {
            if let Some(history) = histories.remove(&item.id) {
                item.revision_history = history;
            }
        }
        Ok(items)
    }

    fn fetch_history(&self, item_id: &str) -> Result<Vec<RevisionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT revised_on, quality, time_taken_minutes, notes, cycle
             FROM revisions WHERE item_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![item_id], RevisionRow::from_row)?;

        let mut history = Vec::new();
        for row in rows {
            history.push(row?.into_record(item_id)?);
        }
        Ok(history)
    }

    fn fetch_all_histories(&self) -> Result<HashMap<String, Vec<RevisionRecord>>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, revised_on, quality, time_taken_minutes, notes, cycle
             FROM revisions ORDER BY item_id, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                RevisionRow {
                    revised_on: row.get(1)?,
                    quality: row.get(2)?,
                    time_taken_minutes: row.get(3)?,
                    notes: row.get(4)?,
                    cycle: row.get(5)?,
                },
            ))
        })?;

        let mut histories: HashMap<String, Vec<RevisionRecord>> = HashMap::new();
        for row in rows {
            let (item_id, raw) = row?;
            let record = raw.into_record(&item_id)?;
            histories.entry(item_id).or_default().push(record);
        }
        Ok(histories)
    }

    // Plain upsert rather than INSERT OR REPLACE: a replace would delete the
    // row and cascade away the revision history.
    fn upsert_item(&self, item: &Item) -> Result<()> {
        self.conn.execute(
            "INSERT INTO items (id, name, subject, difficulty, date_learned, ease_factor,
                                revision_cycle, status, streak, last_revision_date,
                                next_revision_date, xp_earned)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                subject = excluded.subject,
                difficulty = excluded.difficulty,
                date_learned = excluded.date_learned,
                ease_factor = excluded.ease_factor,
                revision_cycle = excluded.revision_cycle,
                status = excluded.status,
                streak = excluded.streak,
                last_revision_date = excluded.last_revision_date,
                next_revision_date = excluded.next_revision_date,
                xp_earned = excluded.xp_earned",
            params![
                item.id,
                item.name,
                item.subject,
                item.difficulty.as_str(),
                item.date_learned.to_string(),
                item.ease_factor,
                item.revision_cycle,
                item.status.as_str(),
                item.streak,
                item.last_revision_date.map(|d| d.to_string()),
                item.next_revision_date.map(|d| d.to_string()),
                item.xp_earned,
            ],
        )?;
        Ok(())
    }

    fn remove_item(&self, id: &str) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM items WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn insert_revision(&self, item_id: &str, record: &RevisionRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO revisions (item_id, revised_on, quality, time_taken_minutes, notes, cycle)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item_id,
                record.date.to_string(),
                record.quality.value(),
                record.time_taken_minutes,
                record.notes,
                record.cycle,
            ],
        )?;
        Ok(())
    }

    fn insert_activity(&self, kind: ActivityKind, text: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO activity_log (logged_at, kind, text) VALUES (?1, ?2, ?3)",
            params![Local::now().to_rfc3339(), kind.as_str(), text],
        )?;
        Ok(())
    }

    fn upsert_daily_xp(&self, date: NaiveDate, xp: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO daily_xp (date, xp) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET xp = xp + excluded.xp",
            params![date.to_string(), xp],
        )?;
        Ok(())
    }

    fn bump_total_revisions(&self) -> Result<()> {
        self.conn.execute(
            "UPDATE user_stats SET total_revisions = total_revisions + 1 WHERE id = 1",
            [],
        )?;
        Ok(())
    }

    fn read_settings(&self) -> Result<Settings> {
        let (total_cycles, daily_goal, raw_intervals) = self.conn.query_row(
            "SELECT total_cycles, daily_goal, base_intervals FROM settings WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;
        let base_intervals = serde_json::from_str(&raw_intervals).map_err(|e| {
            DbError::InvalidData {
                id: "settings".into(),
                reason: format!("bad base_intervals: {e}"),
            }
        })?;
        Ok(Settings {
            total_cycles,
            daily_goal,
            base_intervals,
        })
    }

    fn write_settings(&self, settings: &Settings) -> Result<()> {
        let intervals = serde_json::to_string(&settings.base_intervals).map_err(|e| {
            DbError::InvalidData {
                id: "settings".into(),
                reason: e.to_string(),
            }
        })?;
        self.conn.execute(
            "UPDATE settings SET total_cycles = ?1, daily_goal = ?2, base_intervals = ?3
             WHERE id = 1",
            params![settings.total_cycles, settings.daily_goal, intervals],
        )?;
        Ok(())
    }

    /// Most recent activity lines, newest first.
    pub fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT logged_at, kind, text FROM activity_log ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(ActivityEntry {
                logged_at: row.get(0)?,
                kind: row.get(1)?,
                text: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// XP logged on a given calendar day.
    pub fn xp_on(&self, date: NaiveDate) -> Result<u32> {
        let xp = self
            .conn
            .query_row(
                "SELECT xp FROM daily_xp WHERE date = ?1",
                params![date.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(xp.unwrap_or(0))
    }

    /// Aggregate counters for the stats view.
    pub fn tracker_stats(&self) -> Result<TrackerStats> {
        let total_items: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        let mastered_items: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE status = 'mastered'",
            [],
            |row| row.get(0),
        )?;
        let total_revisions: u64 = self.conn.query_row(
            "SELECT total_revisions FROM user_stats WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        let xp_total: u64 = self.conn.query_row(
            "SELECT COALESCE(SUM(xp), 0) FROM daily_xp",
            [],
            |row| row.get(0),
        )?;
        let xp_today = self.xp_on(Local::now().date_naive())?;
        Ok(TrackerStats {
            total_items,
            mastered_items,
            total_revisions,
            xp_today,
            xp_total,
        })
    }
}

impl RevisionStore for SqliteRepository {
    fn get_item(&self, id: &str) -> StoreResult<Option<Item>> {
        self.fetch_item(id).map_err(Into::into)
    }

    fn save_item(&mut self, item: &Item) -> StoreResult<()> {
        self.upsert_item(item).map_err(Into::into)
    }

    fn delete_item(&mut self, id: &str) -> StoreResult<bool> {
        self.remove_item(id).map_err(Into::into)
    }

    fn list_items(&self) -> StoreResult<Vec<Item>> {
        self.fetch_items().map_err(Into::into)
    }

    fn append_revision(&mut self, item_id: &str, record: &RevisionRecord) -> StoreResult<()> {
        self.insert_revision(item_id, record).map_err(Into::into)
    }

    fn append_activity(&mut self, kind: ActivityKind, text: &str) -> StoreResult<()> {
        self.insert_activity(kind, text).map_err(Into::into)
    }

    fn add_daily_xp(&mut self, date: NaiveDate, xp: u32) -> StoreResult<()> {
        self.upsert_daily_xp(date, xp).map_err(Into::into)
    }

    fn increment_total_revisions(&mut self) -> StoreResult<()> {
        self.bump_total_revisions().map_err(Into::into)
    }

    fn get_settings(&self) -> StoreResult<Settings> {
        self.read_settings().map_err(Into::into)
    }

    fn save_settings(&mut self, settings: &Settings) -> StoreResult<()> {
        self.write_settings(settings).map_err(Into::into)
    }
}

/// Raw item row; converted outside the rusqlite closure so date and enum
/// parse failures surface as [`DbError::InvalidData`].
struct ItemRow {
    id: String,
    name: String,
    subject: String,
    difficulty: String,
    date_learned: String,
    ease_factor: f64,
    revision_cycle: u32,
    status: String,
    streak: u32,
    last_revision_date: Option<String>,
    next_revision_date: Option<String>,
    xp_earned: u32,
}

impl ItemRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            subject: row.get(2)?,
            difficulty: row.get(3)?,
            date_learned: row.get(4)?,
            ease_factor: row.get(5)?,
            revision_cycle: row.get(6)?,
            status: row.get(7)?,
            streak: row.get(8)?,
            last_revision_date: row.get(9)?,
            next_revision_date: row.get(10)?,
            xp_earned: row.get(11)?,
        })
    }

    fn into_item(self) -> Result<Item> {
        let invalid = |reason: String| DbError::InvalidData {
            id: self.id.clone(),
            reason,
        };
        let difficulty = Difficulty::from_str(&self.difficulty)
            .ok_or_else(|| invalid(format!("unknown difficulty '{}'", self.difficulty)))?;
        let status = Status::from_str(&self.status)
            .ok_or_else(|| invalid(format!("unknown status '{}'", self.status)))?;
        let date_learned = parse_date(&self.date_learned)
            .map_err(|e| invalid(format!("bad date_learned: {e}")))?;
        let last_revision_date = self
            .last_revision_date
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|e| invalid(format!("bad last_revision_date: {e}")))?;
        let next_revision_date = self
            .next_revision_date
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|e| invalid(format!("bad next_revision_date: {e}")))?;

        Ok(Item {
            id: self.id,
            name: self.name,
            subject: self.subject,
            difficulty,
            date_learned,
            ease_factor: self.ease_factor,
            revision_cycle: self.revision_cycle,
            status,
            streak: self.streak,
            last_revision_date,
            next_revision_date,
            xp_earned: self.xp_earned,
            revision_history: Vec::new(),
        })
    }
}

struct RevisionRow {
    revised_on: String,
    quality: u8,
    time_taken_minutes: u32,
    notes: String,
    cycle: u32,
}

impl RevisionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            revised_on: row.get(0)?,
            quality: row.get(1)?,
            time_taken_minutes: row.get(2)?,
            notes: row.get(3)?,
            cycle: row.get(4)?,
        })
    }

    fn into_record(self, item_id: &str) -> Result<RevisionRecord> {
        let date = parse_date(&self.revised_on).map_err(|e| DbError::InvalidData {
            id: item_id.to_string(),
            reason: format!("bad revision date: {e}"),
        })?;
        Ok(RevisionRecord {
            date,
            quality: Quality::new(self.quality),
            time_taken_minutes: self.time_taken_minutes,
            notes: self.notes,
            cycle: self.cycle,
        })
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    s.parse()
}
