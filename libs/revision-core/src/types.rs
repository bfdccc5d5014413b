//! Core types for the revision tracker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item difficulty as rated when it was first logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

impl Difficulty {
    /// Base XP awarded per revision of an item at this difficulty.
    pub fn base_xp(self) -> u32 {
        match self {
            Self::Easy => 10,
            Self::Medium => 15,
            Self::Hard => 25,
        }
    }

    /// Weight used by the priority score.
    pub fn priority_weight(self) -> u32 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// Item lifecycle status.
///
/// `Mastered` is terminal: a mastered item drops out of every due/overdue
/// query and is never rescheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    NeedsRevision,
    Mastered,
}

impl Default for Status {
    fn default() -> Self {
        Self::Active
    }
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::NeedsRevision => "needs_revision",
            Self::Mastered => "mastered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "needs_revision" => Some(Self::NeedsRevision),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

/// Self-rated recall quality, clamped to 1..=5. A rating of 3 or better
/// counts as a successful recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    pub fn new(raw: u8) -> Self {
        Self(raw.clamp(1, 5))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_successful(self) -> bool {
        self.0 >= 3
    }
}

/// One completed revision, as appended to an item's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionRecord {
    pub date: NaiveDate,
    pub quality: Quality,
    pub time_taken_minutes: u32,
    pub notes: String,
    /// Revision cycle the item was moving into when this entry was written
    /// (old cycle + 1, even when the recall failed and the cycle regressed).
    pub cycle: u32,
}

/// A learned unit tracked by the scheduler: a question, topic, or chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub date_learned: NaiveDate,
    pub ease_factor: f64,
    pub revision_cycle: u32,
    pub status: Status,
    pub streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_revision_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_revision_date: Option<NaiveDate>,
    pub xp_earned: u32,
    pub revision_history: Vec<RevisionRecord>,
}

impl Item {
    pub fn is_mastered(&self) -> bool {
        self.status == Status::Mastered
    }
}

/// Input for logging a freshly learned item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub date_learned: NaiveDate,
}

/// User-editable scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Revision cycles required before an item counts as mastered.
    pub total_cycles: u32,
    /// Target revisions per day, feeds the productivity score.
    pub daily_goal: u32,
    /// Base interval (days) per cycle; cycles beyond the table extrapolate
    /// geometrically.
    pub base_intervals: Vec<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_cycles: 15,
            daily_goal: 5,
            base_intervals: vec![0, 1, 3, 7, 14, 21, 30, 45, 60, 90, 120, 150, 180, 210, 240],
        }
    }
}

/// Outcome of a completed revision.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionResult {
    pub item: Item,
    pub xp_earned: u32,
    pub new_cycle: u32,
    pub total_cycles: u32,
    pub mastered: bool,
}

/// Per-subject recall strength, weakest subjects first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStrength {
    pub subject: String,
    pub total: usize,
    pub mastered: usize,
    pub avg_ease: f64,
    pub avg_quality: f64,
    pub mastery_percent: u32,
    /// 0-100, average history quality over the maximum; 50 when the subject
    /// has no revision history yet.
    pub strength_score: u32,
}

/// A due item annotated with its urgency score.
#[derive(Debug, Clone, Serialize)]
pub struct PriorityItem {
    pub item: Item,
    pub priority_score: i64,
}
