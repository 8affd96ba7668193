/*
 * schedly/src/undo.rs
 *
 * Single-step undo for mutating commands.
 *
 * The engine holds at most one record: the last successful mutating command
 * and the event snapshots needed to reverse it. Reversal is one routine that
 * interprets the record's tag; commands themselves carry no undo logic.
 */

use crate::error::{SchedulerError, SchedulerResult};
use crate::model::Event;
use crate::store::EventStore;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CommandKind {
    Add,
    Edit,
    Delete,
    Recur,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoRecord {
    Add(Event),
    /// Events in removal order, each with the store index it was removed from.
    Delete(Vec<(usize, Event)>),
    Edit { before: Event, after: Event },
    /// `seed` stays in the store; only `generated` is reverted.
    Recur { seed: Event, generated: Vec<Event> },
}

impl UndoRecord {
    pub fn kind(&self) -> CommandKind {
        match self {
            UndoRecord::Add(_) => CommandKind::Add,
            UndoRecord::Delete(_) => CommandKind::Delete,
            UndoRecord::Edit { .. } => CommandKind::Edit,
            UndoRecord::Recur { .. } => CommandKind::Recur,
        }
    }

    /// Snapshots touched by the command, oldest state first.
    pub fn affected_events(&self) -> Vec<Event> {
        match self {
            UndoRecord::Add(e) => vec![e.clone()],
            UndoRecord::Delete(removed) => removed.iter().map(|(_, e)| e.clone()).collect(),
            UndoRecord::Edit { before, after } => vec![before.clone(), after.clone()],
            UndoRecord::Recur { generated, .. } => generated.clone(),
        }
    }

    /// Applies the structural inverse. Business rules are not re-checked.
    fn revert(self, store: &mut EventStore) -> SchedulerResult<()> {
        match self {
            UndoRecord::Add(event) => {
                store.remove(&event)?;
            }
            UndoRecord::Delete(removed) => {
                // Reverse removal order so every recorded index is valid again.
                for (index, event) in removed.into_iter().rev() {
                    store.insert(index, event)?;
                }
            }
            UndoRecord::Edit { before, after } => {
                store.replace(&after, before)?;
            }
            UndoRecord::Recur { generated, .. } => {
                store.remove_all(&generated)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    Idle,
    Armed,
}

#[derive(Debug, Default)]
pub struct UndoEngine {
    record: Option<UndoRecord>,
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UndoState {
        if self.record.is_some() {
            UndoState::Armed
        } else {
            UndoState::Idle
        }
    }

    pub fn record(&self) -> Option<&UndoRecord> {
        self.record.as_ref()
    }

    /// Called after a command succeeded. Replaces any previous record.
    pub fn arm(&mut self, record: UndoRecord) {
        log::debug!("Undo armed for {}", record.kind());
        self.record = Some(record);
    }

    pub fn disarm(&mut self) {
        self.record = None;
    }

    /// Reverses the recorded command and returns to `Idle`.
    ///
    /// The record is consumed even if the reversal fails, so a stale record
    /// can never be replayed twice.
    pub fn undo(&mut self, store: &mut EventStore) -> SchedulerResult<CommandKind> {
        let record = self.record.take().ok_or(SchedulerError::NothingToUndo)?;
        let kind = record.kind();
        record.revert(store)?;
        log::info!("Undid {} command", kind);
        Ok(kind)
    }
}
