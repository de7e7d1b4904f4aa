//! # Domain Layer
//!
//! Values describing the effect of a store transition. Transitions that find
//! the row already advanced report it instead of failing.

use shared_types::TaskId;

/// Effect of deleting a forked tip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewindOutcome {
    pub blocks_deleted: u64,
    /// Pending events removed with their blocks.
    pub events_deleted: u64,
}

/// Effect of recomputing confirmation counts against a new tip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmationUpdate {
    /// Pending events whose count was rewritten.
    pub refreshed: u64,
    /// Events that crossed the threshold and became Confirmed.
    pub newly_confirmed: u64,
}

/// Effect of promoting one confirmed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// Event marked Promoted and a task inserted.
    Promoted { task_id: TaskId },
    /// Event marked Promoted; a task with this id already existed.
    DuplicateTask { task_id: TaskId },
    /// The event was no longer Confirmed. Nothing changed.
    NotConfirmed,
}
