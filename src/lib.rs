// Crate root library declaration and module exports.
pub mod cli;
pub mod command;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod undo;

pub use command::{Command, CommandOutcome, EditDescriptor};
pub use controller::{Scheduler, SchedulerOptions};
pub use error::{ErrorKind, SchedulerError, SchedulerResult};
pub use model::{Cadence, Event, EventFilter};
pub use store::{EventStore, EventView, StoreChange};
pub use undo::{CommandKind, UndoRecord, UndoState};
