//! Batch-release unlock policy.
//!
//! Days are grouped into bands that share one unlock threshold, so a whole
//! batch becomes available on the same day instead of one cell per real day:
//!
//! | days   | unlocked when        |
//! |--------|----------------------|
//! | 1..=12 | always               |
//! | 13..=18| current day >= 13    |
//! | 19..=24| current day >= 19    |
//! | 25     | current day >= 25    |
//!
//! Bands are checked in order. A day covered by no band falls back to
//! "unlocked on or after its own day".

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::core::clock::CurrentDay;
use crate::core::errors::{AdventError, Result};

/// A contiguous run of days sharing one unlock threshold.
///
/// A threshold of 0 means the band is never locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockBand {
    pub first: u32,
    pub last: u32,
    pub threshold: u32,
}

impl UnlockBand {
    #[must_use]
    pub const fn new(first: u32, last: u32, threshold: u32) -> Self {
        Self {
            first,
            last,
            threshold,
        }
    }

    #[must_use]
    pub const fn contains(&self, day: u32) -> bool {
        day >= self.first && day <= self.last
    }

    const fn overlaps(&self, other: &Self) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

/// The default band table.
#[must_use]
pub fn default_bands() -> Vec<UnlockBand> {
    vec![
        UnlockBand::new(1, 12, 0),
        UnlockBand::new(13, 18, 13),
        UnlockBand::new(19, 24, 19),
        UnlockBand::new(25, 25, 25),
    ]
}

/// Pure lock-state function over an ordered band table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatingPolicy {
    bands: Vec<UnlockBand>,
}

impl Default for GatingPolicy {
    fn default() -> Self {
        Self {
            bands: default_bands(),
        }
    }
}

impl GatingPolicy {
    /// Build a policy from a band table, rejecting malformed or overlapping bands.
    pub fn new(bands: Vec<UnlockBand>) -> Result<Self> {
        validate_bands(&bands)?;
        Ok(Self { bands })
    }

    #[must_use]
    pub fn bands(&self) -> &[UnlockBand] {
        &self.bands
    }

    /// Day on which `day` becomes available. 0 means always available.
    #[must_use]
    pub fn unlocks_on(&self, day: u32) -> u32 {
        self.bands
            .iter()
            .find(|band| band.contains(day))
            .map_or(day, |band| band.threshold)
    }

    /// Whether `day` is still locked on `current`.
    #[must_use]
    pub fn is_locked(&self, day: u32, current: CurrentDay) -> bool {
        current.get() < self.unlocks_on(day)
    }

    /// Days in `1..=total_days` that are locked on `current`.
    #[must_use]
    pub fn locked_days(&self, total_days: u32, current: CurrentDay) -> Vec<u32> {
        (1..=total_days)
            .filter(|day| self.is_locked(*day, current))
            .collect()
    }
}

/// Check band shape and pairwise disjointness.
pub fn validate_bands(bands: &[UnlockBand]) -> Result<()> {
    for (i, band) in bands.iter().enumerate() {
        if band.first == 0 || band.first > band.last {
            return Err(AdventError::InvalidConfig {
                details: format!(
                    "gating.bands[{i}] must satisfy 1 <= first <= last, got {}..={}",
                    band.first, band.last
                ),
            });
        }
        if let Some((j, other)) = bands[..i]
            .iter()
            .enumerate()
            .find(|(_, other)| other.overlaps(band))
        {
            return Err(AdventError::InvalidConfig {
                details: format!(
                    "gating.bands[{i}] ({}..={}) overlaps gating.bands[{j}] ({}..={})",
                    band.first, band.last, other.first, other.last
                ),
            });
        }
    }
    Ok(())
}
