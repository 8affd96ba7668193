// File: ./src/model/filter.rs
use crate::model::Event;
use chrono::{NaiveDate, NaiveDateTime};

/// Predicate behind the currently displayed event list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    OnDate(NaiveDate),
    /// Any keyword matches a whole word of the name (case-insensitive).
    NameKeywords(Vec<String>),
    /// Both criteria must hold when both are given.
    Find {
        keywords: Option<Vec<String>>,
        date: Option<NaiveDate>,
    },
    /// The `limit` earliest events starting at or after `from`.
    Upcoming { from: NaiveDateTime, limit: usize },
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::OnDate(date) => event.date == *date,
            EventFilter::NameKeywords(keywords) => event.name_matches_any(keywords),
            EventFilter::Find { keywords, date } => {
                if let Some(kw) = keywords
                    && !event.name_matches_any(kw)
                {
                    return false;
                }
                if let Some(d) = date
                    && event.date != *d
                {
                    return false;
                }
                true
            }
            EventFilter::Upcoming { from, .. } => event.starts_at() >= *from,
        }
    }

    /// Cap on the number of entries shown, applied after chronological sorting.
    pub fn limit(&self) -> Option<usize> {
        match self {
            EventFilter::Upcoming { limit, .. } => Some(*limit),
            _ => None,
        }
    }
}
