//! One calendar session: the state, the selection, and the day snapshot they
//! are evaluated against, plus the optional journal and content worker.
//!
//! All mutation happens through `&mut self`, one event at a time. Producer
//! results come back through [`Session::apply_completions`] and address a cell
//! by its day, so they stay valid whatever the selection is by then.

#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::calendar::catalog::ContentCatalog;
use crate::calendar::gating::GatingPolicy;
use crate::calendar::selection::SelectionController;
use crate::calendar::state::{CalendarState, Cell, OpenOutcome};
use crate::core::clock::CurrentDay;
use crate::core::config::Config;
use crate::core::errors::{AdventError, Result};
use crate::logger::journal::{ActivityEvent, JournalHandle};
use crate::producer::ContentProducer;
use crate::producer::worker::{ContentCompletion, ContentWorker};

/// Read-only view of one cell for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub index: u32,
    pub opened: bool,
    pub locked: bool,
    pub unlocks_on: u32,
    pub content: String,
    pub content_is_generated: bool,
}

/// Read-only view of the whole calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSnapshot {
    pub current_day: CurrentDay,
    pub active_index: Option<u32>,
    pub cells: Vec<CellView>,
}

impl CalendarSnapshot {
    #[must_use]
    pub fn opened_count(&self) -> usize {
        self.cells.iter().filter(|c| c.opened).count()
    }

    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.locked).count()
    }
}

pub struct Session {
    policy: GatingPolicy,
    state: CalendarState,
    selection: SelectionController,
    current_day: CurrentDay,
    config_hash: String,
    journal: Option<JournalHandle>,
    worker: Option<ContentWorker>,
    in_flight: BTreeSet<u32>,
}

impl Session {
    /// Seed a session of `total_days` cells from `catalog`.
    #[must_use]
    pub fn new(
        policy: GatingPolicy,
        catalog: &ContentCatalog,
        total_days: u32,
        current_day: CurrentDay,
    ) -> Self {
        Self {
            policy,
            state: CalendarState::initialize(total_days, catalog),
            selection: SelectionController::new(),
            current_day,
            config_hash: String::from("-"),
            journal: None,
            worker: None,
            in_flight: BTreeSet::new(),
        }
    }

    /// Build a session from validated configuration.
    pub fn from_config(config: &Config, current_day: CurrentDay) -> Result<Self> {
        let mut session = Self::new(
            config.gating_policy()?,
            &config.catalog(),
            config.calendar.total_days,
            current_day,
        );
        session.config_hash = config.stable_hash()?;
        Ok(session)
    }

    /// Attach a journal and record the session start.
    #[must_use]
    pub fn with_journal(mut self, journal: JournalHandle) -> Self {
        journal.send(ActivityEvent::SessionStarted {
            total_days: self.state.total_days(),
            current_day: self.current_day.get(),
            config_hash: self.config_hash.clone(),
        });
        self.journal = Some(journal);
        self
    }

    /// Run `producer` on a background worker for content regeneration.
    pub fn with_producer(
        mut self,
        producer: Arc<dyn ContentProducer>,
        queue_capacity: usize,
    ) -> Result<Self> {
        self.worker = Some(ContentWorker::spawn(producer, queue_capacity)?);
        Ok(self)
    }

    // ──────────────────── queries ────────────────────

    #[must_use]
    pub const fn current_day(&self) -> CurrentDay {
        self.current_day
    }

    #[must_use]
    pub fn policy(&self) -> &GatingPolicy {
        &self.policy
    }

    #[must_use]
    pub fn total_days(&self) -> u32 {
        self.state.total_days()
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        self.state.cells()
    }

    pub fn cell(&self, day: u32) -> Result<&Cell> {
        self.state.cell(day)
    }

    /// Lock state of `day` against this session's snapshot.
    #[must_use]
    pub fn is_locked(&self, day: u32) -> bool {
        self.policy.is_locked(day, self.current_day)
    }

    #[must_use]
    pub const fn active_index(&self) -> Option<u32> {
        self.selection.active_index()
    }

    #[must_use]
    pub fn active_cell(&self) -> Option<&Cell> {
        self.selection.active_cell(&self.state)
    }

    /// Whether a producer worker is attached.
    #[must_use]
    pub const fn has_producer(&self) -> bool {
        self.worker.is_some()
    }

    /// Days with a content request still outstanding.
    #[must_use]
    pub fn pending_requests(&self) -> Vec<u32> {
        self.in_flight.iter().copied().collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> CalendarSnapshot {
        let cells = self
            .state
            .cells()
            .iter()
            .map(|cell| CellView {
                index: cell.index(),
                opened: cell.is_opened(),
                locked: self.is_locked(cell.index()),
                unlocks_on: self.policy.unlocks_on(cell.index()),
                content: cell.content().to_string(),
                content_is_generated: cell.content_is_generated(),
            })
            .collect();
        CalendarSnapshot {
            current_day: self.current_day,
            active_index: self.active_index(),
            cells,
        }
    }

    // ──────────────────── user actions ────────────────────

    /// Open `day` and make it active. Errors leave state and selection as they were.
    pub fn select(&mut self, day: u32) -> Result<OpenOutcome> {
        match self
            .selection
            .select(&mut self.state, day, self.current_day, &self.policy)
        {
            Ok(outcome) => {
                self.log(ActivityEvent::CellOpened {
                    day,
                    current_day: self.current_day.get(),
                    first_open: outcome == OpenOutcome::Opened,
                });
                Ok(outcome)
            }
            Err(err) => {
                self.log(ActivityEvent::OpenRejected {
                    day,
                    current_day: self.current_day.get(),
                    active: self.selection.active_index(),
                    error_code: err.code().to_string(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Clear the selection. Returns the previously active day.
    pub fn deselect(&mut self) -> Option<u32> {
        let previous = self.selection.deselect();
        self.log(ActivityEvent::SelectionCleared { previous });
        previous
    }

    // ──────────────────── content regeneration ────────────────────

    /// Ask the producer for new text for `day`.
    ///
    /// Returns `Ok(true)` when a request was queued, `Ok(false)` when nothing
    /// was sent (no producer, already in flight, or the queue rejected it).
    /// Only an unknown day is an error.
    pub fn request_content(&mut self, day: u32) -> Result<bool> {
        self.state.cell(day)?;
        let Some(worker) = self.worker.as_ref() else {
            return Ok(false);
        };
        if self.in_flight.contains(&day) {
            return Ok(false);
        }
        match worker.submit(day) {
            Ok(()) => {
                self.in_flight.insert(day);
                self.log(ActivityEvent::ContentRequested { day });
                Ok(true)
            }
            Err(err) => {
                self.log_fallback(day, &err);
                Ok(false)
            }
        }
    }

    /// Apply every completion that is already available. Returns how many.
    pub fn apply_completions(&mut self) -> usize {
        let ready = self
            .worker
            .as_mut()
            .map(ContentWorker::drain_ready)
            .unwrap_or_default();
        self.apply_all(ready)
    }

    /// Block up to `timeout` for outstanding requests, applying what arrives.
    pub fn wait_for_completions(&mut self, timeout: Duration) -> usize {
        let pending = self.in_flight.len();
        if pending == 0 {
            return 0;
        }
        let ready = self
            .worker
            .as_mut()
            .map(|w| w.wait(pending, timeout))
            .unwrap_or_default();
        self.apply_all(ready)
    }

    /// Record the end of the session and stop the worker.
    ///
    /// The journal thread is left running; its owner shuts it down.
    pub fn finish(mut self) -> CalendarSnapshot {
        let snapshot = self.snapshot();
        self.log(ActivityEvent::SessionEnded {
            opened: snapshot.opened_count(),
            generated: snapshot
                .cells
                .iter()
                .filter(|c| c.content_is_generated)
                .count(),
        });
        if let Some(worker) = self.worker.take() {
            worker.shutdown();
        }
        snapshot
    }

    fn apply_all(&mut self, ready: Vec<ContentCompletion>) -> usize {
        let count = ready.len();
        for done in ready {
            self.apply_completion(done);
        }
        if self.worker.as_ref().is_some_and(ContentWorker::is_disconnected) {
            self.abandon_worker();
        }
        count
    }

    /// The worker thread is gone: requests still in flight will never
    /// complete, so they fall back and the producer is detached.
    fn abandon_worker(&mut self) {
        self.worker = None;
        let lost = std::mem::take(&mut self.in_flight);
        let err = AdventError::ChannelClosed {
            component: "producer",
        };
        for day in lost {
            self.log_fallback(day, &err);
        }
    }

    fn apply_completion(&mut self, done: ContentCompletion) {
        let ContentCompletion { day, outcome } = done;
        self.in_flight.remove(&day);
        match outcome {
            Ok(text) => {
                let chars = text.chars().count();
                match self.state.apply_generated_content(day, text) {
                    Ok(()) => self.log(ActivityEvent::ContentGenerated { day, chars }),
                    Err(err) => self.log_fallback(day, &err),
                }
            }
            Err(err) => {
                let err = AdventError::Producer {
                    day,
                    details: err.to_string(),
                };
                self.log_fallback(day, &err);
            }
        }
    }

    fn log_fallback(&self, day: u32, err: &AdventError) {
        self.log(ActivityEvent::ContentFallback {
            day,
            error_code: err.code().to_string(),
            message: err.to_string(),
        });
    }

    fn log(&self, event: ActivityEvent) {
        if let Some(journal) = &self.journal {
            journal.send(event);
        }
    }
}
