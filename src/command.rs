// File: ./src/command.rs
//! Validated commands, as produced by the parser and consumed by the controller.
use crate::model::{Cadence, EventFilter};
use chrono::{NaiveDate, NaiveTime};

/// Optional field overrides for an edit. Unset fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDescriptor {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl EditDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
            || self.date.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_start_time(mut self, time: NaiveTime) -> Self {
        self.start_time = Some(time);
        self
    }

    pub fn with_end_time(mut self, time: NaiveTime) -> Self {
        self.end_time = Some(time);
        self
    }
}

/// Positions are zero-based indexes into the currently displayed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        name: String,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    Edit {
        index: usize,
        descriptor: EditDescriptor,
    },
    Delete {
        indexes: Vec<usize>,
    },
    Recur {
        index: usize,
        end_date: NaiveDate,
        cadence: Cadence,
    },
    Find(EventFilter),
    /// Upcoming events; `None` falls back to the configured default count.
    Next(Option<usize>),
    List,
    Clear,
    Undo,
    Help,
    Exit,
}

/// What the caller should show or do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    pub message: String,
    /// The store changed; the persistence layer should save.
    pub store_changed: bool,
    pub show_help: bool,
    pub exit: bool,
}

impl CommandOutcome {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            store_changed: true,
            ..Self::default()
        }
    }
}
