// File: src/store.rs
use crate::error::{SchedulerError, SchedulerResult};
use crate::model::{Event, EventFilter};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};

/// What changed in the store. Sent to every subscriber after the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Added { index: usize, event: Event },
    Removed { index: usize, event: Event },
    Replaced { index: usize, old: Event, new: Event },
    Reset { len: usize },
    Sorted,
}

/// The authoritative, ordered list of events.
///
/// Identity uniqueness is enforced here on every insert. Temporal overlap is
/// only reported through [`EventStore::exists_overlap`]: callers decide which
/// event, if any, to exclude from the check.
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
    subscribers: Vec<Sender<StoreChange>>,
}

/// Snapshot of a selection of events, taken at call time.
///
/// Later store mutations are not reflected; ask the store for a new view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventView {
    events: Vec<Event>,
}

impl EventView {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Zero-based lookup; out-of-range positions are a user error, not a panic.
    pub fn get(&self, index: usize) -> SchedulerResult<&Event> {
        self.events
            .get(index)
            .ok_or(SchedulerError::IndexOutOfRange {
                index,
                len: self.events.len(),
            })
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }
}

impl<'a> IntoIterator for &'a EventView {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl IntoIterator for EventView {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a snapshot, rejecting identity duplicates.
    pub fn from_events(events: Vec<Event>) -> SchedulerResult<Self> {
        let mut store = Self::new();
        store.replace_all(events)?;
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    // --- Change Notification ---

    /// Registers a listener for content changes.
    /// Dropping the receiver unsubscribes it on the next change.
    pub fn subscribe(&mut self) -> Receiver<StoreChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, change: StoreChange) {
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }

    // --- Queries ---

    pub fn contains(&self, event: &Event) -> bool {
        self.events.iter().any(|e| e == event)
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }

    /// True if any stored event other than `excluding` overlaps `candidate`.
    pub fn exists_overlap(&self, excluding: Option<&Event>, candidate: &Event) -> bool {
        self.events
            .iter()
            .filter(|e| Some(*e) != excluding)
            .any(|e| e.overlaps(candidate))
    }

    /// The first stored event other than `excluding` that overlaps `candidate`.
    pub fn find_overlap(&self, excluding: Option<&Event>, candidate: &Event) -> Option<&Event> {
        self.events
            .iter()
            .filter(|e| Some(*e) != excluding)
            .find(|e| e.overlaps(candidate))
    }

    // --- Mutations ---

    /// Appends `event`. Insertion order is kept until an explicit sort.
    pub fn add(&mut self, event: Event) -> SchedulerResult<()> {
        let index = self.events.len();
        self.insert(index, event)
    }

    /// Inserts at `index` (clamped to the end). Used to put events back where they were.
    pub fn insert(&mut self, index: usize, event: Event) -> SchedulerResult<()> {
        if self.contains(&event) {
            return Err(SchedulerError::duplicate(event));
        }
        let index = index.min(self.events.len());
        self.events.insert(index, event.clone());
        self.notify(StoreChange::Added { index, event });
        Ok(())
    }

    /// Swaps `target` for `replacement` in place, keeping its position.
    pub fn replace(&mut self, target: &Event, replacement: Event) -> SchedulerResult<()> {
        let index = self
            .position(target)
            .ok_or_else(|| SchedulerError::NotFound(target.clone()))?;

        if *target != replacement && self.contains(&replacement) {
            return Err(SchedulerError::duplicate(replacement));
        }

        let old = std::mem::replace(&mut self.events[index], replacement.clone());
        self.notify(StoreChange::Replaced {
            index,
            old,
            new: replacement,
        });
        Ok(())
    }

    /// Removes the single exactly-equal event and returns the index it held.
    pub fn remove(&mut self, event: &Event) -> SchedulerResult<usize> {
        let index = self
            .position(event)
            .ok_or_else(|| SchedulerError::NotFound(event.clone()))?;
        let removed = self.events.remove(index);
        self.notify(StoreChange::Removed {
            index,
            event: removed,
        });
        Ok(index)
    }

    /// Appends a batch, or nothing if any entry is already stored or repeated.
    ///
    /// On failure the error names the 1-based position of the offending entry.
    /// Identity is checked against a hash set, so the cost is linear in
    /// store size plus batch size.
    pub fn extend(&mut self, batch: &[Event]) -> SchedulerResult<()> {
        let mut seen: HashSet<&Event> = self.events.iter().collect();
        for (i, event) in batch.iter().enumerate() {
            if !seen.insert(event) {
                return Err(SchedulerError::duplicate(event.clone()).at_step(i + 1));
            }
        }

        for event in batch {
            let index = self.events.len();
            self.events.push(event.clone());
            self.notify(StoreChange::Added {
                index,
                event: event.clone(),
            });
        }
        Ok(())
    }

    /// Removes every event of `targets`, or nothing if one is missing.
    pub fn remove_all(&mut self, targets: &[Event]) -> SchedulerResult<()> {
        let wanted: HashSet<&Event> = targets.iter().collect();
        let present: HashSet<&Event> = self.events.iter().filter(|e| wanted.contains(e)).collect();
        if let Some(missing) = targets.iter().find(|e| !present.contains(e)) {
            return Err(SchedulerError::NotFound(missing.clone()));
        }

        let mut removed = Vec::with_capacity(targets.len());
        let mut kept = Vec::with_capacity(self.events.len());
        for event in std::mem::take(&mut self.events) {
            if wanted.contains(&event) {
                removed.push((kept.len(), event));
            } else {
                kept.push(event);
            }
        }
        self.events = kept;

        // Indexes are positions in the list as it was after earlier removals.
        for (index, event) in removed {
            self.notify(StoreChange::Removed { index, event });
        }
        Ok(())
    }

    /// Drops every event.
    pub fn clear(&mut self) {
        self.events.clear();
        self.notify(StoreChange::Reset { len: 0 });
    }

    /// Replaces the whole collection (bulk load).
    /// The incoming list must not contain identity duplicates.
    pub fn replace_all(&mut self, events: Vec<Event>) -> SchedulerResult<()> {
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(event) {
                return Err(SchedulerError::duplicate(event.clone()));
            }
        }

        let len = events.len();
        self.events = events;
        self.notify(StoreChange::Reset { len });
        Ok(())
    }

    /// Full snapshot for the persistence layer, in stored order.
    pub fn export_all(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// Reorders the stored events by date and start time. This one mutates.
    pub fn sort_chronologically(&mut self) {
        self.events.sort();
        self.notify(StoreChange::Sorted);
    }

    // --- Views ---

    /// Chronologically ordered snapshot; stored order is left untouched.
    pub fn sorted_chronologically(&self) -> EventView {
        let mut events = self.events.clone();
        events.sort();
        EventView { events }
    }

    /// Snapshot of the events matching `predicate`, in stored order.
    pub fn filtered_view<P>(&self, predicate: P) -> EventView
    where
        P: Fn(&Event) -> bool,
    {
        EventView {
            events: self.events.iter().filter(|e| predicate(e)).cloned().collect(),
        }
    }

    /// The displayed list for `filter`: matching events, chronologically, capped
    /// by the filter's limit.
    pub fn view(&self, filter: &EventFilter) -> EventView {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort();
        if let Some(limit) = filter.limit() {
            events.truncate(limit);
        }
        EventView { events }
    }
}
