//! Interval policies: how long to pause before the next attempt.
//!
//! A policy maps an iteration index (and the previous pause) to the next
//! pause. Policies are plain data: they never sleep, so they are easy to test
//! and inspect.
//!
//! - [`Exponential`]: `initial × (base / unit)^iteration`, capped at `max`
//! - [`ExponentialJitter`]: [`Exponential`] plus a random offset in
//!   `±jitter_max` (requires the `jitter` feature, enabled by default)
//! - [`from_fn`]: any closure with the [`Intervals::next`] signature
//!
//! # Series
//!
//! ```rust
//! use rebound::{Exponential, Intervals};
//! use std::time::Duration;
//!
//! let mut policy = Exponential::default_binary();
//! let series: Vec<_> = (0..8)
//!     .map(|i| policy.next(i, Duration::ZERO).as_millis())
//!     .collect();
//!
//! assert_eq!(series, [500, 1_000, 2_000, 4_000, 8_000, 16_000, 20_000, 20_000]);
//! ```

mod exponential;
#[cfg(feature = "jitter")]
mod jitter;

pub use exponential::Exponential;
#[cfg(feature = "jitter")]
pub use jitter::{ExponentialJitter, SeedError};

use std::time::Duration;

/// Computes the pause before the next attempt.
///
/// `iteration` is the zero-based index of the attempt that just failed. It
/// stays small in practice; with an unlimited budget it saturates at
/// [`INFINITE_TRIES`](crate::INFINITE_TRIES) and stays there. `last` is the
/// pause returned for the previous iteration, or zero on the first call.
///
/// `next` takes `&mut self` so stateful policies (a seeded random source, for
/// instance) need no interior mutability. A policy instance therefore serves
/// one retry session at a time.
pub trait Intervals {
    /// Returns the pause for `iteration`.
    fn next(&mut self, iteration: i8, last: Duration) -> Duration;
}

impl<I: Intervals + ?Sized> Intervals for &mut I {
    fn next(&mut self, iteration: i8, last: Duration) -> Duration {
        (**self).next(iteration, last)
    }
}

impl<I: Intervals + ?Sized> Intervals for Box<I> {
    fn next(&mut self, iteration: i8, last: Duration) -> Duration {
        (**self).next(iteration, last)
    }
}

/// Interval policy backed by a closure.
///
/// Created by [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").field("f", &"<function>").finish()
    }
}

impl<F> Intervals for FromFn<F>
where
    F: FnMut(i8, Duration) -> Duration,
{
    fn next(&mut self, iteration: i8, last: Duration) -> Duration {
        (self.f)(iteration, last)
    }
}

/// Build an interval policy from a closure.
///
/// # Example
///
/// ```rust
/// use rebound::intervals::{from_fn, Intervals};
/// use std::time::Duration;
///
/// // Linear: 100ms, 200ms, 300ms, ...
/// let mut linear = from_fn(|i, _last| Duration::from_millis(100) * (i as u32 + 1));
///
/// assert_eq!(linear.next(0, Duration::ZERO), Duration::from_millis(100));
/// assert_eq!(linear.next(2, Duration::ZERO), Duration::from_millis(300));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(i8, Duration) -> Duration,
{
    FromFn { f }
}

#[cfg(test)]
mod intervals_tests {
    use super::*;

    #[test]
    fn test_from_fn_receives_last_wait() {
        let mut doubling = from_fn(|_, last: Duration| {
            if last.is_zero() {
                Duration::from_millis(10)
            } else {
                last * 2
            }
        });

        let first = doubling.next(0, Duration::ZERO);
        let second = doubling.next(1, first);
        let third = doubling.next(2, second);

        assert_eq!(
            [first, second, third],
            [
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(40)
            ]
        );
    }

    #[test]
    fn test_boxed_policy_delegates() {
        let mut boxed: Box<dyn Intervals> = Box::new(Exponential::default_binary());
        assert_eq!(boxed.next(1, Duration::ZERO), Duration::from_secs(1));
    }

    #[test]
    fn test_borrowed_policy_delegates() {
        fn third<I: Intervals>(mut policy: I) -> Duration {
            policy.next(2, Duration::ZERO)
        }

        let mut policy = Exponential::default_binary();
        assert_eq!(third(&mut policy), Duration::from_secs(2));
        assert_eq!(third(policy), Duration::from_secs(2));
    }
}
