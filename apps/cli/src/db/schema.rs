//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local tracker database.
pub const SCHEMA: &str = r#"
-- Learned items
CREATE TABLE IF NOT EXISTS items (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    subject TEXT NOT NULL,
    difficulty TEXT NOT NULL DEFAULT 'medium',
    date_learned TEXT NOT NULL,
    ease_factor REAL NOT NULL DEFAULT 2.5,
    revision_cycle INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'active',
    streak INTEGER NOT NULL DEFAULT 0,
    last_revision_date TEXT,
    next_revision_date TEXT,
    xp_earned INTEGER NOT NULL DEFAULT 0
);

-- Append-only revision history
CREATE TABLE IF NOT EXISTS revisions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    revised_on TEXT NOT NULL,
    quality INTEGER NOT NULL,
    time_taken_minutes INTEGER NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT '',
    cycle INTEGER NOT NULL
);

-- Activity feed
CREATE TABLE IF NOT EXISTS activity_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    logged_at TEXT NOT NULL,
    kind TEXT NOT NULL,
    text TEXT NOT NULL
);

-- XP earned per calendar day
CREATE TABLE IF NOT EXISTS daily_xp (
    date TEXT PRIMARY KEY,
    xp INTEGER NOT NULL DEFAULT 0
);

-- Lifetime counters
CREATE TABLE IF NOT EXISTS user_stats (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    total_revisions INTEGER NOT NULL DEFAULT 0
);

-- Scheduler settings (single row)
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    total_cycles INTEGER NOT NULL DEFAULT 15,
    daily_goal INTEGER NOT NULL DEFAULT 5,
    base_intervals TEXT NOT NULL DEFAULT '[0,1,3,7,14,21,30,45,60,90,120,150,180,210,240]'
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_items_next ON items(next_revision_date);
CREATE INDEX IF NOT EXISTS idx_items_subject ON items(subject);
CREATE INDEX IF NOT EXISTS idx_revisions_item ON revisions(item_id);
"#;

/// Initialize the settings row if not exists.
pub const INIT_SETTINGS: &str = r#"
INSERT OR IGNORE INTO settings (id) VALUES (1);
"#;

/// Initialize the lifetime counters row if not exists.
pub const INIT_USER_STATS: &str = r#"
INSERT OR IGNORE INTO user_stats (id, total_revisions) VALUES (1, 0);
"#;
