//! ADV-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, AdventError>;

/// Top-level error type for the advent calendar.
#[derive(Debug, Error)]
pub enum AdventError {
    #[error("[ADV-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[ADV-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[ADV-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[ADV-2001] day {day} is locked until day {unlocks_on} (current day {current_day})")]
    Locked {
        day: u32,
        unlocks_on: u32,
        current_day: u32,
    },

    #[error("[ADV-2002] day {day} is outside the calendar (1..={total_days})")]
    NotFound { day: u32, total_days: u32 },

    #[error("[ADV-2101] content producer failed for day {day}: {details}")]
    Producer { day: u32, details: String },

    #[error("[ADV-2201] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[ADV-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[ADV-3002] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[ADV-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl AdventError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "ADV-1001",
            Self::MissingConfig { .. } => "ADV-1002",
            Self::ConfigParse { .. } => "ADV-1003",
            Self::Locked { .. } => "ADV-2001",
            Self::NotFound { .. } => "ADV-2002",
            Self::Producer { .. } => "ADV-2101",
            Self::Serialization { .. } => "ADV-2201",
            Self::Io { .. } => "ADV-3001",
            Self::ChannelClosed { .. } => "ADV-3002",
            Self::Runtime { .. } => "ADV-3900",
        }
    }

    /// Whether the session carries on unchanged after this error.
    ///
    /// Locked requests are expected user noise and producer failures fall back
    /// to catalog text. Everything else points at a caller or environment bug.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Locked { .. } | Self::Producer { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for AdventError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for AdventError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
