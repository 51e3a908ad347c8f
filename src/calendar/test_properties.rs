//! Property-based tests for the unlock policy and selection invariants.
//!
//! Uses `proptest` to check the band rules over every day/current-day pair and
//! to drive arbitrary select/deselect sequences through a session, verifying
//! one-way opening, at-most-one active cell, and no effect from locked requests.

use proptest::prelude::*;

use super::catalog::ContentCatalog;
use super::gating::GatingPolicy;
use super::session::Session;
use crate::core::clock::CurrentDay;

#[derive(Debug, Clone)]
enum Action {
    Select(u32),
    Deselect,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0u32..=27).prop_map(Action::Select),
        1 => Just(Action::Deselect),
    ]
}

fn arb_current_day() -> impl Strategy<Value = CurrentDay> {
    (0u32..=40).prop_map(CurrentDay::new)
}

fn fresh_session(today: CurrentDay) -> Session {
    Session::new(GatingPolicy::default(), &ContentCatalog::default(), 25, today)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn early_days_never_lock(day in 1u32..=12, today in any::<u32>()) {
        prop_assert!(!GatingPolicy::default().is_locked(day, CurrentDay::new(today)));
    }

    #[test]
    fn first_batch_follows_day_thirteen(day in 13u32..=18, today in any::<u32>()) {
        prop_assert_eq!(
            GatingPolicy::default().is_locked(day, CurrentDay::new(today)),
            today < 13
        );
    }

    #[test]
    fn second_batch_follows_day_nineteen(day in 19u32..=24, today in any::<u32>()) {
        prop_assert_eq!(
            GatingPolicy::default().is_locked(day, CurrentDay::new(today)),
            today < 19
        );
    }

    #[test]
    fn final_day_follows_day_twenty_five(today in any::<u32>()) {
        prop_assert_eq!(
            GatingPolicy::default().is_locked(25, CurrentDay::new(today)),
            today < 25
        );
    }

    #[test]
    fn lock_state_is_monotone_in_current_day(day in 1u32..=40, a in 0u32..=40, b in 0u32..=40) {
        let policy = GatingPolicy::default();
        let (early, late) = (a.min(b), a.max(b));
        if !policy.is_locked(day, CurrentDay::new(early)) {
            prop_assert!(!policy.is_locked(day, CurrentDay::new(late)));
        }
    }

    /// Opened flags only go false → true, and only for days unlocked today.
    #[test]
    fn opening_is_one_way_and_gated(
        today in arb_current_day(),
        actions in prop::collection::vec(arb_action(), 1..60)
    ) {
        let mut session = fresh_session(today);
        let mut ever_opened = vec![false; 26];
        for action in actions {
            match action {
                Action::Select(day) => { let _ = session.select(day); }
                Action::Deselect => { session.deselect(); }
            }
            for cell in session.cells() {
                let i = cell.index() as usize;
                if ever_opened[i] {
                    prop_assert!(cell.is_opened(), "day {} re-closed", i);
                }
                if cell.is_opened() {
                    ever_opened[i] = true;
                    prop_assert!(!session.is_locked(cell.index()));
                }
            }
        }
    }

    /// The active day is always an opened, unlocked cell, or nothing.
    #[test]
    fn active_cell_is_always_open(
        today in arb_current_day(),
        actions in prop::collection::vec(arb_action(), 1..60)
    ) {
        let mut session = fresh_session(today);
        for action in actions {
            let before = session.active_index();
            match action {
                Action::Select(day) => {
                    let opened_before = session.cell(day).map(|c| c.is_opened()).ok();
                    match session.select(day) {
                        Ok(_) => prop_assert_eq!(session.active_index(), Some(day)),
                        Err(_) => {
                            prop_assert_eq!(session.active_index(), before);
                            prop_assert_eq!(
                                session.cell(day).map(|c| c.is_opened()).ok(),
                                opened_before
                            );
                        }
                    }
                }
                Action::Deselect => {
                    session.deselect();
                    prop_assert!(session.active_cell().is_none());
                }
            }
            if let Some(cell) = session.active_cell() {
                prop_assert!(cell.is_opened());
                prop_assert_eq!(Some(cell.index()), session.active_index());
            }
        }
    }

    /// Selecting the same unlocked day twice leaves the same state as once.
    #[test]
    fn repeated_select_is_idempotent(day in 1u32..=25, today in arb_current_day()) {
        let mut once = fresh_session(today);
        let mut twice = fresh_session(today);
        let first = once.select(day).is_ok();
        let _ = twice.select(day);
        let _ = twice.select(day);
        prop_assert_eq!(once.snapshot(), twice.snapshot());
        prop_assert_eq!(first, !once.is_locked(day));
    }
}
