//! Session journal: append-only JSONL written by a background thread.

pub mod journal;
pub mod jsonl;
