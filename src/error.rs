// File: ./src/error.rs
//! Recoverable failures of the event core.
//!
//! Every store, undo and recurrence operation reports one of these; none of
//! them is fatal and none leaves a partial mutation behind.
use crate::model::Event;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// An identity-equal event is already stored.
    #[error("This event already exists in the scheduler: {event}{}", step_suffix(.step))]
    DuplicateEntity { event: Event, step: Option<usize> },

    /// The event's time range collides with another event on the same date.
    #[error("Another event already exists at the chosen time: {event}{}", step_suffix(.step))]
    OverlapConflict { event: Event, step: Option<usize> },

    #[error("End time {end} is earlier than start time {start}")]
    InvalidRange { start: NaiveTime, end: NaiveTime },

    #[error("Recurrence end date {end} is earlier than the event date {seed}")]
    InvalidRecurrenceEnd { seed: NaiveDate, end: NaiveDate },

    #[error("Event name must not be empty")]
    EmptyName,

    #[error("Event not found: {0}")]
    NotFound(Event),

    /// Zero-based `index` did not address the current view of `len` entries.
    #[error("The event index provided is invalid: {} (only {len} shown)", .index + 1)]
    IndexOutOfRange { index: usize, len: usize },

    #[error("There is no command to undo")]
    NothingToUndo,
}

/// Fieldless discriminant of [`SchedulerError`], for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateEntity,
    OverlapConflict,
    InvalidRange,
    InvalidRecurrenceEnd,
    EmptyName,
    NotFound,
    IndexOutOfRange,
    NothingToUndo,
}

impl SchedulerError {
    pub fn duplicate(event: Event) -> Self {
        Self::DuplicateEntity { event, step: None }
    }

    pub fn overlap(event: Event) -> Self {
        Self::OverlapConflict { event, step: None }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateEntity { .. } => ErrorKind::DuplicateEntity,
            Self::OverlapConflict { .. } => ErrorKind::OverlapConflict,
            Self::InvalidRange { .. } => ErrorKind::InvalidRange,
            Self::InvalidRecurrenceEnd { .. } => ErrorKind::InvalidRecurrenceEnd,
            Self::EmptyName => ErrorKind::EmptyName,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::NothingToUndo => ErrorKind::NothingToUndo,
        }
    }

    /// 1-based recurrence step that failed, if this came out of an expansion.
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::DuplicateEntity { step, .. } | Self::OverlapConflict { step, .. } => *step,
            _ => None,
        }
    }

    /// Tags a conflict with the recurrence step that produced it.
    pub fn at_step(self, n: usize) -> Self {
        match self {
            Self::DuplicateEntity { event, .. } => Self::DuplicateEntity {
                event,
                step: Some(n),
            },
            Self::OverlapConflict { event, .. } => Self::OverlapConflict {
                event,
                step: Some(n),
            },
            other => other,
        }
    }
}

fn step_suffix(step: &Option<usize>) -> String {
    match step {
        Some(n) => format!(" (recurrence step {})", n),
        None => String::new(),
    }
}
