//! Curated content list, one entry per day, with a fixed fallback.

#![allow(missing_docs)]

/// Text shown for a day with no curated entry.
pub const DEFAULT_FALLBACK_CONTENT: &str = "Rest Day";

/// The default 25-day training programme.
pub const DEFAULT_ENTRIES: [&str; 25] = [
    "2.5km - 2.5 points - walk/ 5 points - run",
    "20 minute bums and tums workout workout - 5 points",
    "5km run - 10 points",
    "Leg strength workout - 5 points per 15 mins",
    "Speed session - 10 points",
    "20 min yoga/stretch - 7 points",
    "7km long run - 10 points",
    "3km - 3 points - walk/ 7 points - run",
    "20 mins upper body workout - 5 points",
    "5km run - 10 points",
    "Leg strength workout - 5 points per 15 mins",
    "Speed session - 10 points",
    "20 min yoga/stretch - 7 points",
    "7km long run - 10 points",
    "3.5km - 3.5 points - walk/ 8 points - run",
    "20 mins HIIT workout - 5 points",
    "5km run - 10 points",
    "Leg strength workout - 5 points per 15 mins",
    "Speed session - 10 points",
    "20 min yoga/stretch - 7 points",
    "7.5km long run - 10 points",
    "5km - 10 points",
    "1000 rep challenge - 50 points",
    "10km run - 50 points",
    "Christmas Day run - distance = your choice - 50 points",
];

/// Immutable day → text mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCatalog {
    entries: Vec<String>,
    fallback: String,
}

impl Default for ContentCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_ENTRIES.iter().map(ToString::to_string).collect(),
            DEFAULT_FALLBACK_CONTENT,
        )
    }
}

impl ContentCatalog {
    #[must_use]
    pub fn new(entries: Vec<String>, fallback: impl Into<String>) -> Self {
        Self {
            entries,
            fallback: fallback.into(),
        }
    }

    /// Curated text for `day` (1-based), or the fallback when there is none.
    ///
    /// Blank entries count as missing.
    #[must_use]
    pub fn content_for(&self, day: u32) -> &str {
        day.checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.entries.get(i))
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(&self.fallback)
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
