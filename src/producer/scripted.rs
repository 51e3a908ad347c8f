//! Deterministic in-memory producer.

#![allow(missing_docs)]

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::producer::{ContentProducer, ProducerError};

/// Answers from a fixed per-day script and records every request.
///
/// Days without a scripted answer fail with [`ProducerError::Unavailable`].
#[derive(Debug, Default)]
pub struct ScriptedProducer {
    script: HashMap<u32, Result<String, ProducerError>>,
    calls: Mutex<Vec<u32>>,
}

impl ScriptedProducer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_content(mut self, day: u32, text: impl Into<String>) -> Self {
        self.script.insert(day, Ok(text.into()));
        self
    }

    #[must_use]
    pub fn with_failure(mut self, day: u32, error: ProducerError) -> Self {
        self.script.insert(day, Err(error));
        self
    }

    /// Days requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().clone()
    }
}

impl ContentProducer for ScriptedProducer {
    fn request_content(&self, day: u32) -> Result<String, ProducerError> {
        self.calls.lock().push(day);
        self.script.get(&day).cloned().unwrap_or_else(|| {
            Err(ProducerError::Unavailable(format!(
                "no scripted content for day {day}"
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_from_script_and_records_calls() {
        let producer = ScriptedProducer::new()
            .with_content(3, "Plank ladder")
            .with_failure(4, ProducerError::Failed("quota".into()));

        assert_eq!(producer.request_content(3).unwrap(), "Plank ladder");
        assert_eq!(
            producer.request_content(4).unwrap_err(),
            ProducerError::Failed("quota".into())
        );
        assert!(matches!(
            producer.request_content(5),
            Err(ProducerError::Unavailable(_))
        ));
        assert_eq!(producer.calls(), vec![3, 4, 5]);
    }
}
