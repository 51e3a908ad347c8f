#![forbid(unsafe_code)]

//! Advent calendar core: a fixed run of numbered cells, each holding a piece of
//! text, revealed according to a day-based unlock policy.
//!
//! The moving parts:
//! 1. **Gating policy**: pure `(day, current day) → locked` over an ordered
//!    table of batch-release bands
//! 2. **Cell state**: one-way `opened` flags plus per-cell content
//! 3. **Selection**: at most one active cell, set only by a successful open
//! 4. **Content producer**: optional background regeneration of cell text,
//!    falling back to the curated catalog on any failure
//!
//! # Library usage
//!
//! ```rust,no_run
//! use advent_calendar::prelude::*;
//!
//! let config = Config::load(None)?;
//! let today = CurrentDay::from_clock(config.calendar.event_month);
//! let mut session = Session::from_config(&config, today)?;
//! if session.select(3).is_ok() {
//!     println!("{}", session.active_cell().map_or("", |c| c.content()));
//! }
//! # Ok::<(), AdventError>(())
//! ```

pub mod prelude;

pub mod calendar;
pub mod core;
pub mod logger;
pub mod producer;
