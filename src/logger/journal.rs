//! Session journal: a dedicated thread owns the [`JsonlWriter`].
//!
//! Sessions send [`ActivityEvent`]s through a bounded crossbeam channel with
//! `try_send()`, so a slow disk never delays opening or selecting a cell.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::core::errors::{AdventError, Result};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

/// Default bounded channel capacity for journal events.
const CHANNEL_CAPACITY: usize = 256;

/// Events recorded by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    SessionStarted {
        total_days: u32,
        current_day: u32,
        config_hash: String,
    },
    CellOpened {
        day: u32,
        current_day: u32,
        first_open: bool,
    },
    OpenRejected {
        day: u32,
        current_day: u32,
        active: Option<u32>,
        error_code: String,
        message: String,
    },
    SelectionCleared {
        previous: Option<u32>,
    },
    ContentRequested {
        day: u32,
    },
    ContentGenerated {
        day: u32,
        chars: usize,
    },
    ContentFallback {
        day: u32,
        error_code: String,
        message: String,
    },
    SessionEnded {
        opened: usize,
        generated: usize,
    },
    /// Sentinel asking the journal thread to flush and exit.
    Shutdown,
}

/// Cheaply-cloneable handle for sending journal events.
#[derive(Clone)]
pub struct JournalHandle {
    tx: Sender<ActivityEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl JournalHandle {
    /// Send an event. Non-blocking; a full channel drops the event.
    pub fn send(&self, event: ActivityEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Events dropped due to back-pressure.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Ask the journal thread to flush and stop.
    pub fn shutdown(&self) {
        let _ = self.tx.send(ActivityEvent::Shutdown);
    }
}

/// Options for the journal thread.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    pub jsonl: JsonlConfig,
    pub channel_capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            jsonl: JsonlConfig::default(),
            channel_capacity: CHANNEL_CAPACITY,
        }
    }
}

/// Spawn the journal thread.
///
/// It runs until `shutdown()` is called or every handle is dropped.
pub fn spawn_journal(config: JournalConfig) -> Result<(JournalHandle, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded::<ActivityEvent>(config.channel_capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    let dropped_clone = Arc::clone(&dropped);

    let handle = JournalHandle {
        tx,
        dropped_events: dropped,
    };

    let join = thread::Builder::new()
        .name("advent-journal".to_string())
        .spawn(move || journal_thread_main(&rx, config.jsonl, &dropped_clone))
        .map_err(|e| AdventError::Runtime {
            details: format!("failed to spawn journal thread: {e}"),
        })?;

    Ok((handle, join))
}

fn journal_thread_main(rx: &Receiver<ActivityEvent>, jsonl: JsonlConfig, dropped: &AtomicU64) {
    let mut writer = JsonlWriter::open(jsonl);

    while let Ok(event) = rx.recv() {
        let d = dropped.swap(0, Ordering::Relaxed);
        if d > 0 {
            let mut warn = LogEntry::new(EventType::Error, Severity::Warning);
            warn.details = Some(format!("{d} journal events dropped due to back-pressure"));
            writer.write_entry(&warn);
        }

        if matches!(event, ActivityEvent::Shutdown) {
            break;
        }
        writer.write_entry(&event_to_log_entry(&event));
    }

    writer.flush();
    writer.sync();
}

// ──────────────────── event conversion ────────────────────

fn event_to_log_entry(event: &ActivityEvent) -> LogEntry {
    match event {
        ActivityEvent::SessionStarted {
            total_days,
            current_day,
            config_hash,
        } => {
            let mut e = LogEntry::new(EventType::SessionStart, Severity::Info);
            e.current_day = Some(*current_day);
            e.details = Some(format!("total_days={total_days} config_hash={config_hash}"));
            e.ok = Some(true);
            e
        }
        ActivityEvent::CellOpened {
            day,
            current_day,
            first_open,
        } => {
            let mut e = LogEntry::new(EventType::CellOpen, Severity::Info);
            e.day = Some(*day);
            e.current_day = Some(*current_day);
            e.active = Some(*day);
            e.ok = Some(true);
            if !first_open {
                e.details = Some("already open".to_string());
            }
            e
        }
        ActivityEvent::OpenRejected {
            day,
            current_day,
            active,
            error_code,
            message,
        } => {
            let mut e = LogEntry::new(EventType::OpenRejected, Severity::Warning);
            e.day = Some(*day);
            e.current_day = Some(*current_day);
            e.active = *active;
            e.ok = Some(false);
            e.error_code = Some(error_code.clone());
            e.error_message = Some(message.clone());
            e
        }
        ActivityEvent::SelectionCleared { previous } => {
            let mut e = LogEntry::new(EventType::SelectionClear, Severity::Info);
            e.day = *previous;
            e
        }
        ActivityEvent::ContentRequested { day } => {
            let mut e = LogEntry::new(EventType::ContentRequest, Severity::Info);
            e.day = Some(*day);
            e
        }
        ActivityEvent::ContentGenerated { day, chars } => {
            let mut e = LogEntry::new(EventType::ContentGenerated, Severity::Info);
            e.day = Some(*day);
            e.ok = Some(true);
            e.details = Some(format!("chars={chars}"));
            e
        }
        ActivityEvent::ContentFallback {
            day,
            error_code,
            message,
        } => {
            let mut e = LogEntry::new(EventType::ContentFallback, Severity::Warning);
            e.day = Some(*day);
            e.ok = Some(false);
            e.error_code = Some(error_code.clone());
            e.error_message = Some(message.clone());
            e
        }
        ActivityEvent::SessionEnded { opened, generated } => {
            let mut e = LogEntry::new(EventType::SessionEnd, Severity::Info);
            e.details = Some(format!("opened={opened} generated={generated}"));
            e.ok = Some(true);
            e
        }
        ActivityEvent::Shutdown => LogEntry::new(EventType::SessionEnd, Severity::Info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn events_land_in_order_after_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let config = JournalConfig {
            jsonl: JsonlConfig {
                path: path.clone(),
                ..JsonlConfig::default()
            },
            channel_capacity: 16,
        };
        let (handle, join) = spawn_journal(config).unwrap();

        handle.send(ActivityEvent::CellOpened {
            day: 3,
            current_day: 1,
            first_open: true,
        });
        handle.send(ActivityEvent::OpenRejected {
            day: 13,
            current_day: 1,
            active: Some(3),
            error_code: "ADV-2001".to_string(),
            message: "locked".to_string(),
        });
        handle.shutdown();
        join.join().unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "cell_open");
        assert_eq!(lines[0]["day"], 3);
        assert_eq!(lines[1]["event"], "open_rejected");
        assert_eq!(lines[1]["error_code"], "ADV-2001");
        assert_eq!(lines[1]["active"], 3);
        assert_eq!(handle.dropped_events(), 0);
    }

    #[test]
    fn thread_exits_when_handles_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig {
            jsonl: JsonlConfig {
                path: dir.path().join("j.jsonl"),
                ..JsonlConfig::default()
            },
            channel_capacity: 4,
        };
        let (handle, join) = spawn_journal(config).unwrap();
        handle.send(ActivityEvent::ContentRequested { day: 2 });
        drop(handle);
        join.join().unwrap();
    }

    #[test]
    fn fallback_event_is_a_warning() {
        let entry = event_to_log_entry(&ActivityEvent::ContentFallback {
            day: 7,
            error_code: "ADV-2101".to_string(),
            message: "quota".to_string(),
        });
        assert_eq!(entry.event, EventType::ContentFallback);
        assert_eq!(entry.severity, Severity::Warning);
        assert_eq!(entry.ok, Some(false));
    }

    #[test]
    fn reopening_is_annotated() {
        let entry = event_to_log_entry(&ActivityEvent::CellOpened {
            day: 5,
            current_day: 5,
            first_open: false,
        });
        assert_eq!(entry.details.as_deref(), Some("already open"));
    }
}
