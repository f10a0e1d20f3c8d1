//! # Rebound
//!
//! Cooperative retry with exponential backoff for flaky async operations.
//!
//! Wrap a remote call (HTTP, RPC, polling) in a [`Backoff`] loop: it calls the
//! operation until it reports success, pausing between attempts for a growing
//! interval so the remote side is not overwhelmed. A session ends on success,
//! when the try budget runs out, or when a [`CancellationToken`] fires.
//!
//! ## Quick Example
//!
//! ```rust
//! use rebound::{Backoff, BackoffError, Exponential};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let mut backoff = Backoff::new(Exponential {
//!     base: Duration::from_millis(2),
//!     unit: Duration::from_millis(1),
//!     initial: Duration::from_millis(1),
//!     max: Duration::from_millis(10),
//! });
//!
//! let cancel = CancellationToken::new();
//! let mut responses = vec![200, 429, 503].into_iter();
//!
//! let result = backoff
//!     .retry(&cancel, 5, |_cancel| {
//!         let status = responses.next_back().unwrap_or(200);
//!         async move { status == 200 }
//!     })
//!     .await;
//!
//! assert_eq!(result, Ok(()));
//!
//! let result = backoff.retry(&cancel, 2, |_| async { false }).await;
//! assert_eq!(result, Err(BackoffError::AllTriesFailed));
//! # });
//! ```
//!
//! ## Interval policies
//!
//! - [`Exponential`]: `initial × (base / unit)^iteration`, capped at `max`;
//!   [`Exponential::default_binary`] yields 0.5s, 1s, 2s, 4s, 8s, 16s, 20s, ...
//! - [`ExponentialJitter`]: the same series with a random offset of up to
//!   `±jitter_max`, seeded from the OS (`jitter` feature, on by default)
//! - anything implementing [`Intervals`], or a closure via
//!   [`intervals::from_fn`]
//!
//! ## Optional features
//!
//! - `jitter` (default): [`ExponentialJitter`], backed by `rand`
//! - `tracing`: `debug!` events for every failed attempt and terminal outcome
//! - `serde`: `Serialize`/`Deserialize` for [`Exponential`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod backoff;
pub mod intervals;
pub mod testing;

// Re-exports
pub use backoff::{Backoff, BackoffError, Timer, TokioTimer, INFINITE_TRIES};
pub use intervals::{Exponential, Intervals};
#[cfg(feature = "jitter")]
pub use intervals::{ExponentialJitter, SeedError};
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backoff::{Backoff, BackoffError, Timer, INFINITE_TRIES};
    #[cfg(feature = "jitter")]
    pub use crate::intervals::ExponentialJitter;
    pub use crate::intervals::{Exponential, Intervals};
    pub use tokio_util::sync::CancellationToken;
}
