//! The retry loop.
//!
//! [`Backoff`] calls an operation until it reports success, pausing between
//! attempts for as long as its [`Intervals`] policy says:
//!
//! ```text
//! loop {
//!   ├─► op(cancel) ── true ──► Ok(())
//!   ├─► budget spent?        ──► Err(AllTriesFailed)
//!   ├─► cancel fired?        ──► Err(ContextTimeoutExceeded)
//!   ├─► wait = intervals.next(iteration, wait)
//!   └─► select {
//!         cancel.cancelled() ──► Err(ContextTimeoutExceeded)
//!         timer.after(wait)  ──► iteration += 1 (saturating), continue
//!       }
//! }
//! ```
//!
//! The operation receives the same [`CancellationToken`] the loop waits on, so
//! one `cancel()` unblocks both. The loop never inspects why an attempt failed;
//! only the boolean outcome matters.

mod error;
mod timer;

pub use error::BackoffError;
pub use timer::{Timer, TokioTimer};

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::intervals::Intervals;

/// Try budget meaning "no limit": keep trying until the operation succeeds or
/// the cancellation token fires.
///
/// Also the ceiling of the iteration counter, which saturates here instead of
/// wrapping.
pub const INFINITE_TRIES: i8 = i8::MAX;

/// Retry loop driving an operation with pauses from an [`Intervals`] policy.
///
/// A `Backoff` holds no per-session state besides whatever its policy keeps,
/// so it can run several sessions one after another. [`Backoff::retry`] takes
/// `&mut self`; concurrent sessions need their own instances.
///
/// # Examples
///
/// ```rust
/// use rebound::{Backoff, Exponential};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let mut backoff = Backoff::new(Exponential {
///     base: Duration::from_millis(2),
///     unit: Duration::from_millis(1),
///     initial: Duration::from_millis(1),
///     max: Duration::from_millis(10),
/// });
///
/// let calls = AtomicU32::new(0);
/// let cancel = CancellationToken::new();
///
/// backoff
///     .retry(&cancel, 5, |_cancel| {
///         let n = calls.fetch_add(1, Ordering::SeqCst);
///         async move { n >= 2 }
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Backoff<I, T = TokioTimer> {
    intervals: I,
    timer: T,
}

impl<I: Intervals> Backoff<I> {
    /// Create a retry loop pausing with [`tokio::time::sleep`].
    pub fn new(intervals: I) -> Self {
        Self {
            intervals,
            timer: TokioTimer,
        }
    }
}

impl<I: Intervals, T: Timer> Backoff<I, T> {
    /// Replace the timer used for pauses.
    pub fn with_timer<U: Timer>(self, timer: U) -> Backoff<I, U> {
        Backoff {
            intervals: self.intervals,
            timer,
        }
    }

    /// The interval policy.
    pub fn intervals(&self) -> &I {
        &self.intervals
    }

    /// Mutable access to the interval policy.
    pub fn intervals_mut(&mut self) -> &mut I {
        &mut self.intervals
    }

    /// Call `op` until it returns `true`.
    ///
    /// `tries` bounds the number of calls; pass [`INFINITE_TRIES`] to rely on
    /// success or cancellation alone. A budget of zero or less still makes
    /// one call.
    ///
    /// # Errors
    ///
    /// - [`BackoffError::AllTriesFailed`] once `tries` calls returned `false`
    /// - [`BackoffError::ContextTimeoutExceeded`] if `cancel` fires before a
    ///   call succeeds, either during a pause or during a call that observed
    ///   the token and gave up
    pub async fn retry<F, Fut>(
        &mut self,
        cancel: &CancellationToken,
        tries: i8,
        op: F,
    ) -> Result<(), BackoffError>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = bool>,
    {
        self.retry_from(cancel, tries, op, 0, Duration::ZERO).await
    }

    /// Like [`Backoff::retry`], but also gives up once `timeout` has elapsed.
    ///
    /// The operation receives a child of `cancel` that fires when either
    /// `cancel` is cancelled or the timeout expires; both surface as
    /// [`BackoffError::ContextTimeoutExceeded`].
    pub async fn retry_with_timeout<F, Fut>(
        &mut self,
        cancel: &CancellationToken,
        timeout: Duration,
        tries: i8,
        op: F,
    ) -> Result<(), BackoffError>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = bool>,
    {
        let child = cancel.child_token();
        let session = self.retry_from(&child, tries, op, 0, Duration::ZERO);
        tokio::pin!(session);

        tokio::select! {
            result = &mut session => result,
            _ = tokio::time::sleep(timeout) => {
                child.cancel();
                session.await
            }
        }
    }

    /// Start the loop at a given point of the series.
    ///
    /// `retry` starts at iteration `0` with a zero previous pause.
    pub(crate) async fn retry_from<F, Fut>(
        &mut self,
        cancel: &CancellationToken,
        tries: i8,
        mut op: F,
        init_iteration: i8,
        init_wait: Duration,
    ) -> Result<(), BackoffError>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut iteration = init_iteration;
        let mut wait = init_wait;

        loop {
            if op(cancel.clone()).await {
                #[cfg(feature = "tracing")]
                tracing::debug!(iteration, "operation succeeded");
                return Ok(());
            }

            if i16::from(iteration) + 1 >= i16::from(tries) && tries != INFINITE_TRIES {
                #[cfg(feature = "tracing")]
                tracing::debug!(iteration, tries, "all tries failed");
                return Err(BackoffError::AllTriesFailed);
            }

            if cancel.is_cancelled() {
                #[cfg(feature = "tracing")]
                tracing::debug!(iteration, "cancelled during attempt");
                return Err(BackoffError::ContextTimeoutExceeded);
            }

            wait = self.intervals.next(iteration, wait);
            #[cfg(feature = "tracing")]
            tracing::debug!(iteration, ?wait, "attempt failed, backing off");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(iteration, ?wait, "cancelled during backoff pause");
                    return Err(BackoffError::ContextTimeoutExceeded);
                }
                _ = self.timer.after(wait) => {
                    if iteration < INFINITE_TRIES {
                        iteration += 1;
                    }
                }
            }
        }
    }
}
