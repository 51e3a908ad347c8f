//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use advent_calendar::prelude::*;
//! ```

// Core
pub use crate::core::clock::CurrentDay;
pub use crate::core::config::Config;
pub use crate::core::errors::{AdventError, Result};

// Calendar
pub use crate::calendar::catalog::ContentCatalog;
pub use crate::calendar::gating::{GatingPolicy, UnlockBand};
pub use crate::calendar::selection::SelectionController;
pub use crate::calendar::session::{CalendarSnapshot, CellView, Session};
pub use crate::calendar::state::{CalendarState, Cell, OpenOutcome};

// Producer
pub use crate::producer::command::CommandProducer;
pub use crate::producer::scripted::ScriptedProducer;
pub use crate::producer::{ContentProducer, ProducerError};

// Journal
pub use crate::logger::journal::{ActivityEvent, JournalHandle, spawn_journal};
