// File: ./src/model/mod.rs
pub mod event;
pub mod filter;
pub mod parser;
pub mod recurrence;

pub use event::{DATE_FORMAT, Event, TIME_FORMAT};
pub use filter::EventFilter;
pub use recurrence::{Cadence, RecurrenceEngine};
