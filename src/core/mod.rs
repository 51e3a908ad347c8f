//! Core types: errors, configuration, the current-day snapshot.

pub mod clock;
pub mod config;
pub mod errors;
