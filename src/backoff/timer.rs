//! Timer seam used by the retry loop to pause between attempts.

use std::time::Duration;

use futures::future::BoxFuture;

/// Suspends for a given duration.
///
/// The retry loop races the returned future against the cancellation token and
/// drops it if cancellation wins, so implementations must not rely on being
/// polled to completion.
///
/// Any `Fn(Duration) -> BoxFuture<'static, ()>` is a timer:
///
/// ```rust
/// use futures::FutureExt;
/// use rebound::{Backoff, Exponential};
/// use std::time::Duration;
///
/// let backoff = Backoff::new(Exponential::default_binary())
///     .with_timer(|wait: Duration| tokio::time::sleep(wait / 10).boxed());
/// # let _ = backoff;
/// ```
pub trait Timer {
    /// Returns a future that resolves once `wait` has elapsed.
    fn after(&self, wait: Duration) -> BoxFuture<'static, ()>;
}

/// Default timer backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn after(&self, wait: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(wait))
    }
}

impl<F> Timer for F
where
    F: Fn(Duration) -> BoxFuture<'static, ()>,
{
    fn after(&self, wait: Duration) -> BoxFuture<'static, ()> {
        self(wait)
    }
}
