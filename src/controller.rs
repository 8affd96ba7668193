// File: src/controller.rs
//! Central logic controller for event operations.
//! Every front end (the command loop, tests, future views) goes through the
//! `Scheduler` so that validation, undo registration and the displayed list
//! behave the same way everywhere.
use crate::command::{Command, CommandOutcome, EditDescriptor};
use crate::config::Config;
use crate::error::{SchedulerError, SchedulerResult};
use crate::model::{Cadence, Event, EventFilter, RecurrenceEngine};
use crate::store::{EventStore, EventView, StoreChange};
use crate::undo::{CommandKind, UndoEngine, UndoRecord, UndoState};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;

/// Behaviour switches taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// When false (default) `add` rejects events overlapping an existing one.
    pub allow_overlapping_adds: bool,
    pub upcoming_default_count: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            allow_overlapping_adds: false,
            upcoming_default_count: 1,
        }
    }
}

impl From<&Config> for SchedulerOptions {
    fn from(config: &Config) -> Self {
        Self {
            allow_overlapping_adds: config.allow_overlapping_adds,
            upcoming_default_count: config.upcoming_default_count,
        }
    }
}

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// One user session: the event store, its undo record and the displayed list.
pub struct Scheduler {
    store: EventStore,
    undo: UndoEngine,
    filter: EventFilter,
    options: SchedulerOptions,
    clock: Clock,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("store", &self.store)
            .field("undo", &self.undo)
            .field("filter", &self.filter)
            .field("options", &self.options)
            .finish()
    }
}

impl Scheduler {
    pub fn new(store: EventStore, options: SchedulerOptions) -> Self {
        Self {
            store,
            undo: UndoEngine::new(),
            filter: EventFilter::All,
            options,
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    /// Replaces the wall clock used by `next`.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn undo_state(&self) -> UndoState {
        self.undo.state()
    }

    pub fn last_record(&self) -> Option<&UndoRecord> {
        self.undo.record()
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    pub fn subscribe(&mut self) -> Receiver<StoreChange> {
        self.store.subscribe()
    }

    // --- Read-only views ---

    /// The displayed list. Positions in edit/delete/recur index into this.
    pub fn list_filtered(&self) -> EventView {
        self.store.view(&self.filter)
    }

    pub fn list_all(&self) -> EventView {
        self.store.filtered_view(|_| true)
    }

    pub fn list_sorted_chronologically(&self) -> EventView {
        self.store.sorted_chronologically()
    }

    // --- Persistence hooks ---

    pub fn export_all(&self) -> Vec<Event> {
        self.store.export_all()
    }

    /// Bulk replacement from the storage layer. Drops any undo record.
    pub fn import_all(&mut self, events: Vec<Event>) -> SchedulerResult<()> {
        self.store.replace_all(events)?;
        self.undo.disarm();
        self.filter = EventFilter::All;
        Ok(())
    }

    // --- Mutating operations ---

    pub fn add_event(&mut self, event: Event) -> SchedulerResult<Event> {
        validate_fields(&event)?;

        if self.store.contains(&event) {
            return Err(SchedulerError::duplicate(event));
        }
        if !self.options.allow_overlapping_adds && self.store.exists_overlap(None, &event) {
            return Err(SchedulerError::overlap(event));
        }

        self.store.add(event.clone())?;
        self.undo.arm(UndoRecord::Add(event.clone()));
        log::debug!("Added {}", event);
        Ok(event)
    }

    /// Edits the event at `index` of the displayed list. Returns (before, after).
    pub fn edit_event(
        &mut self,
        index: usize,
        descriptor: &EditDescriptor,
    ) -> SchedulerResult<(Event, Event)> {
        let view = self.list_filtered();
        let target = view.get(index)?.clone();

        let edited = Event::new(
            descriptor.name.clone().unwrap_or_else(|| target.name.clone()),
            descriptor.date.unwrap_or(target.date),
            descriptor.start_time.unwrap_or(target.start_time),
            descriptor.end_time.unwrap_or(target.end_time),
        );

        validate_fields(&edited)?;
        if edited != target && self.store.contains(&edited) {
            return Err(SchedulerError::duplicate(edited));
        }
        if self.store.exists_overlap(Some(&target), &edited) {
            return Err(SchedulerError::overlap(edited));
        }

        self.store.replace(&target, edited.clone())?;
        self.undo.arm(UndoRecord::Edit {
            before: target.clone(),
            after: edited.clone(),
        });
        self.filter = EventFilter::All;
        log::debug!("Edited {} -> {}", target, edited);
        Ok((target, edited))
    }

    /// Deletes every addressed event of the displayed list, or none of them.
    pub fn delete_events(&mut self, indexes: &[usize]) -> SchedulerResult<Vec<Event>> {
        let view = self.list_filtered();

        // Validate all positions before touching the store.
        let unique: BTreeSet<usize> = indexes.iter().copied().collect();
        let mut targets = Vec::with_capacity(unique.len());
        for index in unique {
            targets.push(view.get(index)?.clone());
        }

        let mut removed: Vec<(usize, Event)> = Vec::with_capacity(targets.len());
        for event in targets {
            match self.store.remove(&event) {
                Ok(at) => removed.push((at, event)),
                Err(e) => {
                    for (at, restored) in removed.into_iter().rev() {
                        if let Err(rollback) = self.store.insert(at, restored) {
                            log::error!("Delete rollback could not restore an event: {}", rollback);
                        }
                    }
                    return Err(e);
                }
            }
        }

        let deleted: Vec<Event> = removed.iter().map(|(_, e)| e.clone()).collect();
        self.undo.arm(UndoRecord::Delete(removed));
        log::debug!("Deleted {} event(s)", deleted.len());
        Ok(deleted)
    }

    /// Repeats the event at `index` every `cadence` until `end_date` (inclusive).
    /// Returns the generated events; the seed is left as is.
    pub fn recur_event(
        &mut self,
        index: usize,
        end_date: NaiveDate,
        cadence: Cadence,
    ) -> SchedulerResult<Vec<Event>> {
        let view = self.list_filtered();
        let seed = view.get(index)?.clone();

        let series = RecurrenceEngine::expand(&seed, cadence, end_date)?;
        RecurrenceEngine::insert_series(&mut self.store, &series, true)?;

        self.undo.arm(UndoRecord::Recur {
            seed: seed.clone(),
            generated: series.clone(),
        });
        log::debug!(
            "Recurred {} every {} until {}: {} new event(s)",
            seed,
            cadence,
            end_date,
            series.len()
        );
        Ok(series)
    }

    /// Empties the store. Not undoable; drops any undo record.
    pub fn clear(&mut self) {
        self.store.clear();
        self.undo.disarm();
        self.filter = EventFilter::All;
    }

    pub fn undo(&mut self) -> SchedulerResult<CommandKind> {
        self.undo.undo(&mut self.store)
    }

    // --- Command dispatch ---

    pub fn execute(&mut self, command: Command) -> SchedulerResult<CommandOutcome> {
        match command {
            Command::Add {
                name,
                date,
                start_time,
                end_time,
            } => {
                let event = self.add_event(Event::new(name, date, start_time, end_time))?;
                Ok(CommandOutcome::changed(format!("New event added: {}", event)))
            }
            Command::Edit { index, descriptor } => {
                let (_, edited) = self.edit_event(index, &descriptor)?;
                Ok(CommandOutcome::changed(format!("Edited Event: {}", edited)))
            }
            Command::Delete { indexes } => {
                let deleted = self.delete_events(&indexes)?;
                let lines: Vec<String> = deleted.iter().map(|e| e.to_string()).collect();
                Ok(CommandOutcome::changed(format!(
                    "Deleted Event(s): {}",
                    lines.join("; ")
                )))
            }
            Command::Recur {
                index,
                end_date,
                cadence,
            } => {
                let generated = self.recur_event(index, end_date, cadence)?;
                let seed = self.undo.record().and_then(|r| match r {
                    UndoRecord::Recur { seed, .. } => Some(seed.to_string()),
                    _ => None,
                });
                Ok(CommandOutcome::changed(format!(
                    "Recurring event added: {} ({} new occurrence(s))",
                    seed.unwrap_or_default(),
                    generated.len()
                )))
            }
            Command::Find(filter) => {
                self.filter = filter;
                Ok(CommandOutcome::message(format!(
                    "{} events listed!",
                    self.list_filtered().len()
                )))
            }
            Command::Next(count) => {
                let limit = count.unwrap_or(self.options.upcoming_default_count);
                self.filter = EventFilter::Upcoming {
                    from: (self.clock)(),
                    limit,
                };
                Ok(CommandOutcome::message(format!(
                    "Showing the next {} upcoming event(s)",
                    self.list_filtered().len()
                )))
            }
            Command::List => {
                self.filter = EventFilter::All;
                // Stored order is persisted, so sorting counts as a change.
                self.store.sort_chronologically();
                Ok(CommandOutcome::changed("Listed all events"))
            }
            Command::Clear => {
                self.clear();
                Ok(CommandOutcome::changed("Scheduler has been cleared!"))
            }
            Command::Undo => {
                let kind = self.undo()?;
                Ok(CommandOutcome::changed(format!(
                    "Undid the last {} command",
                    kind
                )))
            }
            Command::Help => Ok(CommandOutcome {
                show_help: true,
                ..CommandOutcome::message("Opened help")
            }),
            Command::Exit => Ok(CommandOutcome {
                exit: true,
                ..CommandOutcome::message("Exiting scheduler as requested ...")
            }),
        }
    }
}

fn validate_fields(event: &Event) -> SchedulerResult<()> {
    if event.name.trim().is_empty() {
        return Err(SchedulerError::EmptyName);
    }
    if !event.has_valid_range() {
        return Err(SchedulerError::InvalidRange {
            start: event.start_time,
            end: event.end_time,
        });
    }
    Ok(())
}
