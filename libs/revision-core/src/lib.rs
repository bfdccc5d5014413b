//! Core spaced-revision library shared by the tracker applications.
//!
//! Provides:
//! - Modified SM-2 scheduling math (interval table + ease-factor scaling)
//! - The revision engine driving item state transitions
//! - Due/overdue/priority queries over an item snapshot
//! - The store contract backends implement (`RevisionStore`)

pub mod engine;
pub mod queries;
pub mod scheduler;
pub mod store;
pub mod types;

pub use engine::RevisionEngine;
pub use scheduler::{
    calculate_next_date, calculate_revision_xp, extrapolate_interval, update_ease_factor,
    INITIAL_EASE, MINIMUM_EASE,
};
pub use store::{ActivityKind, MemoryStore, RevisionStore, StoreError, StoreResult};
pub use types::{
    Difficulty, Item, NewItem, PriorityItem, Quality, RevisionRecord, RevisionResult, Settings,
    Status, SubjectStrength,
};
