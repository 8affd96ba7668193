// File: ./src/model/event.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// One calendar entry.
///
/// There is no surrogate key: two events with the same name, date, start and
/// end are the same event. `PartialEq` is therefore both the identity check
/// used for duplicate rejection and the exact match used for removal.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            name: name.into(),
            date,
            start_time,
            end_time,
        }
    }

    pub fn is_same_event(&self, other: &Event) -> bool {
        self == other
    }

    /// Same date and intersecting `[start, end)` ranges. Names are ignored.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    /// End may equal start (zero-duration entry) but never precede it.
    pub fn has_valid_range(&self) -> bool {
        self.end_time >= self.start_time
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    /// Copy of this event moved to another day.
    pub fn on_date(&self, date: NaiveDate) -> Event {
        Event {
            date,
            ..self.clone()
        }
    }

    /// Case-insensitive whole-word match against any of `keywords`.
    pub fn name_matches_any(&self, keywords: &[String]) -> bool {
        let words: Vec<String> = self
            .name
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        keywords.iter().any(|kw| {
            let kw = kw.to_lowercase();
            words.iter().any(|w| *w == kw)
        })
    }

    pub fn format_time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format(TIME_FORMAT),
            self.end_time.format(TIME_FORMAT)
        )
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Chronological: date, then start, then end. Name only breaks ties so the
/// order stays total and consistent with `Eq`.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.start_time.cmp(&other.start_time))
            .then_with(|| self.end_time.cmp(&other.end_time))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} {}",
            self.name,
            self.date.format(DATE_FORMAT),
            self.format_time_range()
        )
    }
}

/// Stores times as "HH:MM". Accepts "HH:MM:SS" on read for hand-edited files.
mod hhmm {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
