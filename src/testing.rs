//! Testing utilities for code built on [`Backoff`](crate::Backoff).
//!
//! - [`FnLogger`]: a scripted operation that fails a fixed number of times,
//!   honours cancellation, and records what happened on each call
//! - [`RecordingTimer`]: a [`Timer`] that records every requested pause before
//!   sleeping for it
//!
//! # Example
//!
//! ```rust
//! use rebound::testing::{Event, FnLogger, RecordingTimer};
//! use rebound::{Backoff, Exponential};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let timer = RecordingTimer::new();
//! let logger = FnLogger::new(Duration::ZERO, 1);
//! let mut backoff = Backoff::new(Exponential {
//!     base: Duration::from_millis(2),
//!     unit: Duration::from_millis(1),
//!     initial: Duration::from_millis(1),
//!     max: Duration::from_millis(20),
//! })
//! .with_timer(timer.clone());
//!
//! backoff
//!     .retry(&CancellationToken::new(), 3, logger.completable())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(timer.waits(), vec![Duration::from_millis(1)]);
//! assert_eq!(
//!     logger.events(),
//!     vec![Event::Elapsed, Event::ReturnFalse, Event::Elapsed, Event::ReturnTrue]
//! );
//! # });
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::backoff::Timer;

/// Something that happened during one call of an [`FnLogger`] operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// The call observed the cancellation token before its delay elapsed.
    Cancelled,
    /// The call's delay elapsed without cancellation.
    Elapsed,
    /// The call reported failure.
    ReturnFalse,
    /// The call reported success.
    ReturnTrue,
}

#[derive(Debug, Default)]
struct LoggerState {
    failures: usize,
    events: Vec<Event>,
}

/// Scripted operation for exercising retry loops.
///
/// Each call waits `delay` (or until cancelled), then returns `false` for the
/// first `true_after` calls that were not cancelled and `true` afterwards.
/// A cancelled call always returns `false`.
///
/// Clones share the same log.
#[derive(Debug, Clone)]
pub struct FnLogger {
    delay: Duration,
    true_after: usize,
    state: Arc<Mutex<LoggerState>>,
}

impl FnLogger {
    /// Create a logger that succeeds once `true_after` calls have failed.
    pub fn new(delay: Duration, true_after: usize) -> Self {
        Self {
            delay,
            true_after,
            state: Arc::default(),
        }
    }

    /// Events recorded so far, in call order.
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Elapsed | Event::Cancelled))
            .count()
    }

    /// The operation to hand to [`Backoff::retry`](crate::Backoff::retry).
    pub fn completable(&self) -> impl FnMut(CancellationToken) -> BoxFuture<'static, bool> {
        let logger = self.clone();
        move |cancel: CancellationToken| -> BoxFuture<'static, bool> {
            Box::pin(logger.call(cancel))
        }
    }

    fn call(&self, cancel: CancellationToken) -> impl Future<Output = bool> + Send + 'static {
        let logger = self.clone();
        async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    logger.record(&[Event::Cancelled, Event::ReturnFalse]);
                    false
                }
                _ = tokio::time::sleep(logger.delay) => {
                    let mut state = logger.lock();
                    state.events.push(Event::Elapsed);
                    if state.failures >= logger.true_after {
                        state.events.push(Event::ReturnTrue);
                        true
                    } else {
                        state.failures += 1;
                        state.events.push(Event::ReturnFalse);
                        false
                    }
                }
            }
        }
    }

    fn record(&self, events: &[Event]) {
        self.lock().events.extend_from_slice(events);
    }

    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`Timer`] that records each requested pause, then sleeps for it with
/// [`tokio::time::sleep`].
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingTimer {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingTimer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pauses requested so far, in order.
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Timer for RecordingTimer {
    fn after(&self, wait: Duration) -> BoxFuture<'static, ()> {
        self.waits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(wait);
        Box::pin(tokio::time::sleep(wait))
    }
}

#[cfg(test)]
mod testing_tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_logger_fails_then_succeeds() {
        let logger = FnLogger::new(Duration::ZERO, 2);
        let mut op = logger.completable();
        let cancel = CancellationToken::new();

        assert!(!op(cancel.clone()).await);
        assert!(!op(cancel.clone()).await);
        assert!(op(cancel.clone()).await);
        assert!(op(cancel).await);

        assert_eq!(logger.calls(), 4);
        assert_eq!(
            logger.events(),
            vec![
                Event::Elapsed,
                Event::ReturnFalse,
                Event::Elapsed,
                Event::ReturnFalse,
                Event::Elapsed,
                Event::ReturnTrue,
                Event::Elapsed,
                Event::ReturnTrue,
            ]
        );
    }

    #[tokio::test]
    async fn test_fn_logger_cancelled_call_does_not_count_as_failure() {
        let logger = FnLogger::new(Duration::ZERO, 0);
        let mut op = logger.completable();

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        assert!(!op(cancelled).await);
        assert!(op(CancellationToken::new()).await);

        assert_eq!(
            logger.events(),
            vec![
                Event::Cancelled,
                Event::ReturnFalse,
                Event::Elapsed,
                Event::ReturnTrue
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_timer_records_and_sleeps() {
        let timer = RecordingTimer::new();
        let start = tokio::time::Instant::now();

        timer.after(Duration::from_millis(5)).await;
        timer.clone().after(Duration::from_millis(7)).await;

        assert_eq!(
            timer.waits(),
            vec![Duration::from_millis(5), Duration::from_millis(7)]
        );
        assert!(start.elapsed() >= Duration::from_millis(12));
    }
}
