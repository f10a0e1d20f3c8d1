//! Error types for the retry loop.

/// Terminal error returned by [`Backoff::retry`](crate::Backoff::retry).
///
/// The two variants are mutually exclusive: a retry session ends either
/// because the try budget ran out or because the cancellation token fired.
///
/// # Examples
///
/// ```rust
/// use rebound::{Backoff, BackoffError, Exponential};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let mut backoff = Backoff::new(Exponential {
///     base: Duration::from_millis(2),
///     unit: Duration::from_millis(1),
///     initial: Duration::from_millis(1),
///     max: Duration::from_millis(4),
/// });
///
/// let cancel = CancellationToken::new();
/// let err = backoff
///     .retry(&cancel, 2, |_| async { false })
///     .await
///     .unwrap_err();
///
/// assert_eq!(err, BackoffError::AllTriesFailed);
/// assert_eq!(err.to_string(), "all tries failed");
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackoffError {
    /// Every permitted attempt reported failure.
    AllTriesFailed,
    /// The cancellation token fired before an attempt succeeded.
    ContextTimeoutExceeded,
}

impl BackoffError {
    /// Returns true if the try budget was exhausted.
    pub fn is_all_tries_failed(&self) -> bool {
        matches!(self, Self::AllTriesFailed)
    }

    /// Returns true if the session was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::ContextTimeoutExceeded)
    }
}

impl std::fmt::Display for BackoffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllTriesFailed => write!(f, "all tries failed"),
            Self::ContextTimeoutExceeded => write!(f, "backoff context timeout exceeded"),
        }
    }
}

impl std::error::Error for BackoffError {}
