// File: ./src/model/recurrence.rs
use crate::error::{SchedulerError, SchedulerResult};
use crate::model::Event;
use crate::store::EventStore;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// Step unit of a recurrence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Day,
    Week,
    Month,
}

impl Cadence {
    /// Date of the `n`-th occurrence after `seed` (n = 1 is the first follow-up).
    ///
    /// Months are counted from the seed, not chained, and clamp to the last day
    /// of a shorter month: Jan 31 gives Feb 28/29, then Mar 31, then Apr 30.
    pub fn nth_after(self, seed: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Cadence::Day => seed.checked_add_days(Days::new(n as u64)),
            Cadence::Week => seed.checked_add_days(Days::new(7 * n as u64)),
            Cadence::Month => seed.checked_add_months(Months::new(n)),
        }
    }
}

pub struct RecurrenceEngine;

impl RecurrenceEngine {
    /// Follow-up events for `seed`, one per cadence step, up to and including `end`.
    ///
    /// The seed itself is not part of the output. Only the date changes; name
    /// and times are copied.
    pub fn expand(seed: &Event, cadence: Cadence, end: NaiveDate) -> SchedulerResult<Vec<Event>> {
        if end < seed.date {
            return Err(SchedulerError::InvalidRecurrenceEnd {
                seed: seed.date,
                end,
            });
        }

        let mut series = Vec::new();
        let mut n = 1;
        while let Some(date) = cadence.nth_after(seed.date, n) {
            if date > end {
                break;
            }
            series.push(seed.on_date(date));
            n += 1;
        }
        Ok(series)
    }

    /// Inserts a whole series or nothing.
    ///
    /// Every step follows the add rule: an identity twin of a stored event is a
    /// duplicate, and with `check_overlap` any same-date overlap is a conflict.
    /// The first failing step aborts before the store changes, and the error
    /// names that 1-based step.
    ///
    /// Stored events are indexed by date once, so each step only looks at its
    /// own day. Steps never collide with each other because no two share a date.
    pub fn insert_series(
        store: &mut EventStore,
        series: &[Event],
        check_overlap: bool,
    ) -> SchedulerResult<()> {
        let span = series.first().zip(series.last()).map(|(a, b)| a.date..=b.date);
        let mut by_date: HashMap<NaiveDate, Vec<&Event>> = HashMap::new();
        if let Some(span) = &span {
            for stored in store.iter().filter(|e| span.contains(&e.date)) {
                by_date.entry(stored.date).or_default().push(stored);
            }
        }

        for (i, event) in series.iter().enumerate() {
            let same_day = by_date.get(&event.date).map(Vec::as_slice).unwrap_or(&[]);

            let rejected = if same_day.contains(&event) {
                Some(SchedulerError::duplicate(event.clone()))
            } else if check_overlap && same_day.iter().any(|e| e.overlaps(event)) {
                Some(SchedulerError::overlap(event.clone()))
            } else {
                None
            };

            if let Some(e) = rejected {
                log::debug!("Recurrence rejected at step {}: {}", i + 1, e);
                return Err(e.at_step(i + 1));
            }
        }

        store.extend(series)
    }
}
