//! Single active-cell selection.
//!
//! Two states: Idle and Active(day). Only a successful open moves into
//! Active, a second successful open re-targets directly, and `deselect`
//! returns to Idle. Locked or unknown days leave the selection where it was.

#![allow(missing_docs)]

use crate::calendar::gating::GatingPolicy;
use crate::calendar::state::{CalendarState, Cell, OpenOutcome};
use crate::core::clock::CurrentDay;
use crate::core::errors::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    active: Option<u32>,
}

impl SelectionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn active_index(&self) -> Option<u32> {
        self.active
    }

    /// Open `day` and make it the active cell.
    pub fn select(
        &mut self,
        state: &mut CalendarState,
        day: u32,
        current: CurrentDay,
        policy: &GatingPolicy,
    ) -> Result<OpenOutcome> {
        let outcome = state.open_cell(day, current, policy)?;
        self.active = Some(day);
        Ok(outcome)
    }

    /// Clear the selection. Returns the previously active day.
    pub fn deselect(&mut self) -> Option<u32> {
        self.active.take()
    }

    /// The active cell, if any still resolves.
    #[must_use]
    pub fn active_cell<'a>(&self, state: &'a CalendarState) -> Option<&'a Cell> {
        self.active.and_then(|day| state.cell(day).ok())
    }
}
