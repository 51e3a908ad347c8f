//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::catalog::{ContentCatalog, DEFAULT_ENTRIES, DEFAULT_FALLBACK_CONTENT};
use crate::calendar::gating::{GatingPolicy, UnlockBand, default_bands, validate_bands};
use crate::core::clock::CurrentDay;
use crate::core::errors::{AdventError, Result};
use crate::logger::journal::JournalConfig;
use crate::logger::jsonl::JsonlConfig;
use crate::producer::worker::DEFAULT_QUEUE_CAPACITY;

/// Highest day-of-month any calendar month has.
const MAX_DAY_OF_MONTH: u32 = 31;

/// Full calendar configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub gating: GatingConfig,
    pub catalog: CatalogConfig,
    pub producer: ProducerConfig,
    pub journal: JournalSettings,
    pub paths: PathsConfig,
}

/// Calendar shape and the current-day snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CalendarConfig {
    pub total_days: u32,
    /// Month (1-12) in which real dates count toward unlocking.
    pub event_month: u32,
    /// Text for days with no curated entry.
    pub fallback_content: String,
    /// Fixed day-of-month replacing the clock snapshot (0 = before the event).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today: Option<u32>,
}

/// Ordered unlock bands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatingConfig {
    pub bands: Vec<UnlockBand>,
}

/// Curated content, one entry per day in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    pub entries: Vec<String>,
}

/// Optional external content producer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProducerConfig {
    pub enabled: bool,
    /// Program and arguments; `{day}` is replaced with the requested day.
    pub command: Vec<String>,
    pub queue_capacity: usize,
    /// Longer output counts as a malformed response.
    pub max_chars: usize,
}

/// Session journal output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JournalSettings {
    pub enabled: bool,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_path: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by the calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            total_days: 25,
            event_month: 12,
            fallback_content: DEFAULT_FALLBACK_CONTENT.to_string(),
            today: None,
        }
    }
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            bands: default_bands(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: Vec::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_chars: 280,
        }
    }
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: data_dir().join("journal.jsonl"),
            fallback_path: Some(env::temp_dir().join("advent-journal.jsonl")),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: home_dir()
                .join(".config")
                .join("advent")
                .join("config.toml"),
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[ADV-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("advent")
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// A missing file at the default path means defaults; a missing explicit
    /// path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| AdventError::io(&path_buf, source))?;
            Self::from_toml(&raw)?
        } else if path.is_some() {
            return Err(AdventError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document without env overrides or validation.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Deterministic FNV-1a hash of the effective config for the journal.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Build the unlock policy from the band table.
    pub fn gating_policy(&self) -> Result<GatingPolicy> {
        GatingPolicy::new(self.gating.bands.clone())
    }

    /// Build the content catalog.
    #[must_use]
    pub fn catalog(&self) -> ContentCatalog {
        ContentCatalog::new(
            self.catalog.entries.clone(),
            self.calendar.fallback_content.clone(),
        )
    }

    /// Snapshot for `today`, honoring the `calendar.today` override.
    #[must_use]
    pub fn resolve_current_day(&self, today: NaiveDate) -> CurrentDay {
        self.calendar.today.map_or_else(
            || CurrentDay::snapshot(today, self.calendar.event_month),
            CurrentDay::new,
        )
    }

    /// Journal thread options.
    #[must_use]
    pub fn journal_config(&self) -> JournalConfig {
        JournalConfig {
            jsonl: JsonlConfig {
                path: self.journal.path.clone(),
                fallback_path: self.journal.fallback_path.clone(),
                max_size_bytes: self.journal.max_size_bytes,
                max_rotated_files: self.journal.max_rotated_files,
            },
            ..JournalConfig::default()
        }
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("ADVENT_CALENDAR_TOTAL_DAYS") {
            self.calendar.total_days = parse_env_u32("ADVENT_CALENDAR_TOTAL_DAYS", &raw)?;
        }
        if let Some(raw) = lookup("ADVENT_CALENDAR_EVENT_MONTH") {
            self.calendar.event_month = parse_env_u32("ADVENT_CALENDAR_EVENT_MONTH", &raw)?;
        }
        if let Some(raw) = lookup("ADVENT_CALENDAR_FALLBACK_CONTENT") {
            self.calendar.fallback_content = raw;
        }
        if let Some(raw) = lookup("ADVENT_TODAY") {
            self.calendar.today = Some(parse_env_u32("ADVENT_TODAY", &raw)?);
        }
        if let Some(raw) = lookup("ADVENT_PRODUCER_ENABLED") {
            self.producer.enabled = parse_env_bool("ADVENT_PRODUCER_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("ADVENT_JOURNAL_ENABLED") {
            self.journal.enabled = parse_env_bool("ADVENT_JOURNAL_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("ADVENT_JOURNAL_PATH") {
            self.journal.path = PathBuf::from(raw);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.calendar.total_days == 0 {
            return Err(AdventError::InvalidConfig {
                details: "calendar.total_days must be >= 1".to_string(),
            });
        }
        if !(1..=12).contains(&self.calendar.event_month) {
            return Err(AdventError::InvalidConfig {
                details: format!(
                    "calendar.event_month must be in [1, 12], got {}",
                    self.calendar.event_month
                ),
            });
        }
        if let Some(today) = self.calendar.today
            && today > MAX_DAY_OF_MONTH
        {
            return Err(AdventError::InvalidConfig {
                details: format!("calendar.today must be in [0, {MAX_DAY_OF_MONTH}], got {today}"),
            });
        }

        validate_bands(&self.gating.bands)?;

        if self.producer.enabled && self.producer.command.is_empty() {
            return Err(AdventError::InvalidConfig {
                details: "producer.enabled requires a non-empty producer.command".to_string(),
            });
        }
        if self.producer.queue_capacity == 0 {
            return Err(AdventError::InvalidConfig {
                details: "producer.queue_capacity must be >= 1".to_string(),
            });
        }
        if self.producer.max_chars == 0 {
            return Err(AdventError::InvalidConfig {
                details: "producer.max_chars must be >= 1".to_string(),
            });
        }
        if self.journal.max_size_bytes == 0 {
            return Err(AdventError::InvalidConfig {
                details: "journal.max_size_bytes must be >= 1".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u32(name: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|error| AdventError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim()
        .parse::<bool>()
        .map_err(|error| AdventError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
