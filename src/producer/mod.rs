//! Optional content regeneration: the producer contract and its plumbing.
//!
//! The core only knows [`ContentProducer`]. Requests run on a background
//! [`worker::ContentWorker`] thread so opening and selecting cells never wait
//! on a producer.

pub mod command;
pub mod scripted;
pub mod worker;

use thiserror::Error;

/// Opaque failure from a content producer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProducerError {
    /// The producer could not be reached or started.
    #[error("producer unavailable: {0}")]
    Unavailable(String),
    /// The producer answered with something unusable.
    #[error("malformed producer response: {0}")]
    Malformed(String),
    /// The producer ran and reported failure.
    #[error("producer failed: {0}")]
    Failed(String),
}

/// Source of replacement text for a calendar day.
///
/// Implementations may block; callers run them on a worker thread.
pub trait ContentProducer: Send + Sync {
    /// Produce display text for `day`. One attempt, no retry.
    fn request_content(&self, day: u32) -> Result<String, ProducerError>;
}

impl<F> ContentProducer for F
where
    F: Fn(u32) -> Result<String, ProducerError> + Send + Sync,
{
    fn request_content(&self, day: u32) -> Result<String, ProducerError> {
        self(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_producers() {
        let producer = |day: u32| Ok::<_, ProducerError>(format!("day {day} drill"));
        assert_eq!(producer.request_content(4).unwrap(), "day 4 drill");
    }

    #[test]
    fn error_display_keeps_detail() {
        let err = ProducerError::Malformed("empty".to_string());
        assert_eq!(err.to_string(), "malformed producer response: empty");
    }
}
