//! Background worker that runs producer requests off the caller's thread.
//!
//! Architecture: a dedicated thread owns the producer. Requests arrive over a
//! bounded crossbeam channel; completions go back over an unbounded one. The
//! submitting side never blocks: a full queue rejects the request and the
//! caller keeps catalog text.
//!
//! Shutdown never waits on a producer that is still busy: the thread gets a
//! short grace period and is otherwise left to finish on its own.

#![allow(missing_docs)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{
    Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError, bounded, unbounded,
};

use crate::core::errors::{AdventError, Result};
use crate::producer::{ContentProducer, ProducerError};

/// Default bounded capacity for pending requests.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// How long shutdown waits for an idle thread to exit before detaching it.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);
const SHUTDOWN_POLL: Duration = Duration::from_millis(5);

/// Finished request for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCompletion {
    pub day: u32,
    pub outcome: std::result::Result<String, ProducerError>,
}

enum WorkerMessage {
    Request(u32),
    Shutdown,
}

/// Handle to a running content worker.
pub struct ContentWorker {
    tx: Sender<WorkerMessage>,
    completions: Receiver<ContentCompletion>,
    join: Option<thread::JoinHandle<()>>,
    disconnected: bool,
}

impl ContentWorker {
    /// Spawn the worker thread around `producer`.
    pub fn spawn(producer: Arc<dyn ContentProducer>, queue_capacity: usize) -> Result<Self> {
        let (tx, rx) = bounded::<WorkerMessage>(queue_capacity.max(1));
        let (done_tx, done_rx) = unbounded::<ContentCompletion>();

        let join = thread::Builder::new()
            .name("advent-producer".to_string())
            .spawn(move || worker_thread_main(&rx, &done_tx, producer.as_ref()))
            .map_err(|e| AdventError::Runtime {
                details: format!("failed to spawn producer thread: {e}"),
            })?;

        Ok(Self {
            tx,
            completions: done_rx,
            join: Some(join),
            disconnected: false,
        })
    }

    /// Queue a request for `day`. Non-blocking.
    pub fn submit(&self, day: u32) -> Result<()> {
        match self.tx.try_send(WorkerMessage::Request(day)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(AdventError::Producer {
                day,
                details: "request queue full".to_string(),
            }),
            Err(TrySendError::Disconnected(_)) => Err(AdventError::ChannelClosed {
                component: "producer",
            }),
        }
    }

    /// Completions that are already available.
    pub fn drain_ready(&mut self) -> Vec<ContentCompletion> {
        let mut ready = Vec::new();
        loop {
            match self.completions.try_recv() {
                Ok(done) => ready.push(done),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        ready
    }

    /// Wait up to `timeout` for at most `max` completions.
    pub fn wait(&mut self, max: usize, timeout: Duration) -> Vec<ContentCompletion> {
        let deadline = Instant::now() + timeout;
        let mut ready = Vec::new();
        while ready.len() < max {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completions.recv_timeout(remaining) {
                Ok(done) => ready.push(done),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        ready
    }

    /// True once the thread has gone away (it exited or its producer panicked)
    /// and every completion it sent has been received.
    pub const fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Stop accepting requests. Joins the thread if it exits within a short
    /// grace period; a thread still inside the producer is detached.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.tx.try_send(WorkerMessage::Shutdown);
        let Some(join) = self.join.take() else {
            return;
        };
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while !join.is_finished() && Instant::now() < deadline {
            thread::sleep(SHUTDOWN_POLL);
        }
        if join.is_finished() {
            let _ = join.join();
        }
    }
}

impl Drop for ContentWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_thread_main(
    rx: &Receiver<WorkerMessage>,
    done: &Sender<ContentCompletion>,
    producer: &dyn ContentProducer,
) {
    while let Ok(message) = rx.recv() {
        let WorkerMessage::Request(day) = message else {
            break;
        };
        let outcome = producer.request_content(day);
        if done.send(ContentCompletion { day, outcome }).is_err() {
            // Receiver gone: nobody will apply further results.
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::scripted::ScriptedProducer;

    #[test]
    fn completions_come_back_in_request_order() {
        let producer = Arc::new(
            ScriptedProducer::new()
                .with_content(1, "one")
                .with_content(2, "two"),
        );
        let mut worker = ContentWorker::spawn(producer.clone(), 8).unwrap();
        worker.submit(1).unwrap();
        worker.submit(2).unwrap();

        let done = worker.wait(2, Duration::from_secs(5));
        assert_eq!(done.len(), 2);
        assert_eq!(done[0].day, 1);
        assert_eq!(done[0].outcome.as_deref(), Ok("one"));
        assert_eq!(done[1].outcome.as_deref(), Ok("two"));
        assert_eq!(producer.calls(), vec![1, 2]);
    }

    #[test]
    fn failures_are_delivered_not_swallowed() {
        let producer = Arc::new(ScriptedProducer::new());
        let mut worker = ContentWorker::spawn(producer, 8).unwrap();
        worker.submit(7).unwrap();
        let done = worker.wait(1, Duration::from_secs(5));
        assert_eq!(done.len(), 1);
        assert!(matches!(done[0].outcome, Err(ProducerError::Unavailable(_))));
    }

    #[test]
    fn wait_times_out_when_nothing_pending() {
        let mut worker = ContentWorker::spawn(Arc::new(ScriptedProducer::new()), 8).unwrap();
        let started = Instant::now();
        assert!(worker.wait(1, Duration::from_millis(50)).is_empty());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(worker.drain_ready().is_empty());
    }

    #[test]
    fn full_queue_rejects_without_blocking() {
        let (release_tx, release_rx) = bounded::<()>(0);
        let gate = move |_day: u32| {
            let _ = release_rx.recv();
            Ok::<_, ProducerError>("late".to_string())
        };
        let worker = ContentWorker::spawn(Arc::new(gate), 1).unwrap();
        worker.submit(1).unwrap();

        // The worker holds request 1 inside the producer; keep filling until
        // the single queue slot is taken and the next submit bounces.
        let mut rejected = None;
        for day in 2..10 {
            if let Err(err) = worker.submit(day) {
                rejected = Some(err);
                break;
            }
        }
        let err = rejected.expect("queue of one must fill");
        assert_eq!(err.code(), "ADV-2101");

        drop(release_tx);
        worker.shutdown();
    }

    #[test]
    fn shutdown_does_not_wait_for_a_busy_producer() {
        let (release_tx, release_rx) = bounded::<()>(0);
        let gate = move |_day: u32| {
            let _ = release_rx.recv();
            Ok::<_, ProducerError>("late".to_string())
        };
        let worker = ContentWorker::spawn(Arc::new(gate), 1).unwrap();
        worker.submit(1).unwrap();
        // Fill the queue so a blocking shutdown send would hang too.
        while worker.submit(2).is_ok() {}

        let started = Instant::now();
        worker.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
        drop(release_tx);
    }

    #[test]
    fn idle_worker_is_joined_on_shutdown() {
        let worker = ContentWorker::spawn(Arc::new(ScriptedProducer::new()), 4).unwrap();
        let started = Instant::now();
        worker.shutdown();
        assert!(started.elapsed() < SHUTDOWN_GRACE + Duration::from_secs(1));
    }

    #[test]
    fn panicking_producer_marks_worker_disconnected() {
        let crash = |day: u32| -> std::result::Result<String, ProducerError> {
            panic!("producer crashed on day {day}")
        };
        let mut worker = ContentWorker::spawn(Arc::new(crash), 4).unwrap();
        worker.submit(9).unwrap();
        assert!(worker.wait(1, Duration::from_secs(5)).is_empty());
        assert!(worker.is_disconnected());
    }
}
