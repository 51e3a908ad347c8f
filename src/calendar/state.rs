//! Per-cell records and the fixed-size calendar collection.

#![allow(missing_docs)]

use serde::Serialize;

use crate::calendar::catalog::ContentCatalog;
use crate::calendar::gating::GatingPolicy;
use crate::core::clock::CurrentDay;
use crate::core::errors::{AdventError, Result};

/// One calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    index: u32,
    opened: bool,
    content: String,
    content_is_generated: bool,
}

impl Cell {
    fn new(index: u32, content: String) -> Self {
        Self {
            index,
            opened: false,
            content,
            content_is_generated: false,
        }
    }

    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub const fn is_opened(&self) -> bool {
        self.opened
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn content_is_generated(&self) -> bool {
        self.content_is_generated
    }
}

/// Result of a successful open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The cell went from closed to opened.
    Opened,
    /// The cell was already open; nothing changed.
    AlreadyOpen,
}

/// Ordered, dense collection of cells `1..=total_days`.
///
/// Created once per session; never resized or reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarState {
    cells: Vec<Cell>,
}

impl CalendarState {
    /// Seed `total_days` closed cells from the catalog.
    #[must_use]
    pub fn initialize(total_days: u32, catalog: &ContentCatalog) -> Self {
        let cells = (1..=total_days)
            .map(|day| Cell::new(day, catalog.content_for(day).to_string()))
            .collect();
        Self { cells }
    }

    #[must_use]
    pub fn total_days(&self) -> u32 {
        u32::try_from(self.cells.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Look up a cell by its 1-based day.
    pub fn cell(&self, day: u32) -> Result<&Cell> {
        let slot = self.slot(day)?;
        Ok(&self.cells[slot])
    }

    /// Open `day` if the policy allows it on `current`.
    ///
    /// Locked requests leave the state untouched. Opening an open cell is a
    /// no-op success.
    pub fn open_cell(
        &mut self,
        day: u32,
        current: CurrentDay,
        policy: &GatingPolicy,
    ) -> Result<OpenOutcome> {
        let slot = self.slot(day)?;
        if policy.is_locked(day, current) {
            return Err(AdventError::Locked {
                day,
                unlocks_on: policy.unlocks_on(day),
                current_day: current.get(),
            });
        }
        let cell = &mut self.cells[slot];
        if cell.opened {
            return Ok(OpenOutcome::AlreadyOpen);
        }
        cell.opened = true;
        Ok(OpenOutcome::Opened)
    }

    /// Replace a cell's text with producer output and mark it generated.
    pub fn apply_generated_content(&mut self, day: u32, content: String) -> Result<()> {
        let slot = self.slot(day)?;
        let cell = &mut self.cells[slot];
        cell.content = content;
        cell.content_is_generated = true;
        Ok(())
    }

    fn slot(&self, day: u32) -> Result<usize> {
        day.checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|i| *i < self.cells.len())
            .ok_or(AdventError::NotFound {
                day,
                total_days: self.total_days(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::catalog::DEFAULT_FALLBACK_CONTENT;

    fn fresh() -> CalendarState {
        CalendarState::initialize(25, &ContentCatalog::default())
    }

    #[test]
    fn initialize_creates_dense_closed_cells() {
        let state = fresh();
        assert_eq!(state.total_days(), 25);
        for (i, cell) in state.cells().iter().enumerate() {
            assert_eq!(cell.index() as usize, i + 1);
            assert!(!cell.is_opened());
            assert!(!cell.content_is_generated());
        }
        assert_eq!(
            state.cell(3).unwrap().content(),
            ContentCatalog::default().content_for(3)
        );
    }

    #[test]
    fn cells_past_catalog_get_fallback_text() {
        let state = CalendarState::initialize(27, &ContentCatalog::default());
        assert_eq!(state.cell(26).unwrap().content(), DEFAULT_FALLBACK_CONTENT);
        assert_eq!(state.cell(27).unwrap().content(), DEFAULT_FALLBACK_CONTENT);
    }

    #[test]
    fn cell_lookup_rejects_out_of_range() {
        let state = fresh();
        for day in [0, 26, u32::MAX] {
            let err = state.cell(day).unwrap_err();
            assert!(matches!(err, AdventError::NotFound { total_days: 25, .. }));
        }
    }

    #[test]
    fn open_unlocked_cell() {
        let mut state = fresh();
        let policy = GatingPolicy::default();
        let outcome = state.open_cell(5, CurrentDay::new(1), &policy).unwrap();
        assert_eq!(outcome, OpenOutcome::Opened);
        assert!(state.cell(5).unwrap().is_opened());
    }

    #[test]
    fn open_is_idempotent() {
        let mut state = fresh();
        let policy = GatingPolicy::default();
        state.open_cell(13, CurrentDay::new(13), &policy).unwrap();
        let once = state.clone();
        let outcome = state.open_cell(13, CurrentDay::new(13), &policy).unwrap();
        assert_eq!(outcome, OpenOutcome::AlreadyOpen);
        assert_eq!(state, once);
    }

    #[test]
    fn open_locked_cell_fails_without_mutation() {
        let mut state = fresh();
        let before = state.clone();
        let err = state
            .open_cell(13, CurrentDay::new(1), &GatingPolicy::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AdventError::Locked {
                day: 13,
                unlocks_on: 13,
                current_day: 1
            }
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn open_out_of_range_is_not_found() {
        let mut state = fresh();
        let err = state
            .open_cell(26, CurrentDay::new(31), &GatingPolicy::default())
            .unwrap_err();
        assert_eq!(err.code(), "ADV-2002");
    }

    #[test]
    fn opened_cell_stays_open_when_day_goes_backwards() {
        let mut state = fresh();
        let policy = GatingPolicy::default();
        state.open_cell(20, CurrentDay::new(20), &policy).unwrap();
        assert_eq!(
            state.open_cell(20, CurrentDay::new(20), &policy).unwrap(),
            OpenOutcome::AlreadyOpen
        );
        // No re-locking: the flag is never cleared, even though a re-open
        // against an earlier day is rejected.
        assert!(state.open_cell(20, CurrentDay::new(1), &policy).is_err());
        assert!(state.cell(20).unwrap().is_opened());
    }

    #[test]
    fn generated_content_sets_provenance() {
        let mut state = fresh();
        state
            .apply_generated_content(7, "Hill sprints".to_string())
            .unwrap();
        let cell = state.cell(7).unwrap();
        assert_eq!(cell.content(), "Hill sprints");
        assert!(cell.content_is_generated());
        assert!(!cell.is_opened());
    }

    #[test]
    fn generated_content_for_unknown_day_rejected() {
        let mut state = fresh();
        assert!(state.apply_generated_content(0, String::new()).is_err());
    }
}
