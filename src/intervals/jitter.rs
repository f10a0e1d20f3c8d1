//! Exponential interval policy with random jitter.

use std::time::Duration;

use rand::rngs::{OsRng, SmallRng};
use rand::{Rng, SeedableRng, TryRngCore};

use super::{Exponential, Intervals};

/// Error returned when the OS random source cannot provide a seed.
///
/// Jittered policies refuse to fall back to a predictable seed, so this is
/// surfaced from the constructor instead.
#[derive(Debug)]
pub struct SeedError {
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl SeedError {
    fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to seed jitter source: {}", self.source)
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// [`Exponential`] with a random offset in `[-jitter_max, +jitter_max]` added
/// to every pause.
///
/// The random source is a [`SmallRng`] seeded once, at construction, from the
/// operating system's cryptographically secure generator. Draws after that are
/// cheap and never reseed.
///
/// # Range
///
/// The jittered pause is **not** clamped back to `exponential.max`: pauses
/// near the ceiling may exceed it by up to `jitter_max`. Pauses are never
/// negative; an offset larger than the undecorated pause yields zero. A
/// jittered series therefore lies in `[0, max + jitter_max]`.
///
/// # Independent retriers
///
/// The type is deliberately not `Clone`: a copied generator would replay the
/// same offsets and concurrent retriers would pause in lockstep. Build each
/// retrier's policy with [`ExponentialJitter::new`], or derive one from an
/// existing policy with [`ExponentialJitter::fork`].
///
/// # Examples
///
/// ```rust
/// use rebound::{ExponentialJitter, Intervals};
/// use std::time::Duration;
///
/// let mut policy = ExponentialJitter::default_binary().expect("OS entropy");
///
/// let pause = policy.next(1, Duration::ZERO);
/// assert!(pause >= Duration::from_millis(500));
/// assert!(pause <= Duration::from_millis(1_500));
/// ```
#[derive(Debug)]
pub struct ExponentialJitter {
    /// Undecorated series.
    pub exponential: Exponential,
    /// Largest offset added to or subtracted from each pause.
    pub jitter_max: Duration,
    rng: SmallRng,
}

impl ExponentialJitter {
    /// Wrap `exponential`, seeding the random source from the OS.
    pub fn new(exponential: Exponential, jitter_max: Duration) -> Result<Self, SeedError> {
        Self::seeded_from(exponential, jitter_max, &mut OsRng)
    }

    fn seeded_from<R>(
        exponential: Exponential,
        jitter_max: Duration,
        source: &mut R,
    ) -> Result<Self, SeedError>
    where
        R: TryRngCore,
        R::Error: std::error::Error + Send + Sync + 'static,
    {
        let seed = source.try_next_u64().map_err(|err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %err, "random source unavailable for jitter seed");
            SeedError::new(err)
        })?;
        Ok(Self::from_seed(exponential, jitter_max, seed))
    }

    /// Wrap `exponential` with an explicit seed.
    ///
    /// Two policies built from the same seed produce the same series, which is
    /// useful for reproducing a schedule. Prefer [`ExponentialJitter::new`]
    /// for concurrent retriers, since equal seeds retry in lockstep.
    pub fn from_seed(exponential: Exponential, jitter_max: Duration, seed: u64) -> Self {
        Self {
            exponential,
            jitter_max,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Same configuration with a random stream of its own.
    ///
    /// The new generator is seeded from this one, so the two policies draw
    /// different offsets from here on.
    pub fn fork(&mut self) -> Self {
        Self {
            exponential: self.exponential,
            jitter_max: self.jitter_max,
            rng: SmallRng::from_rng(&mut self.rng),
        }
    }

    /// [`Exponential::default_binary`] with ±500ms of jitter.
    pub fn default_binary() -> Result<Self, SeedError> {
        Self::new(Exponential::default_binary(), Duration::from_millis(500))
    }

    fn offset(&mut self) -> i64 {
        let bound = i64::try_from(self.jitter_max.as_nanos()).unwrap_or(i64::MAX);
        self.rng.random_range(-bound..=bound)
    }
}

impl Intervals for ExponentialJitter {
    fn next(&mut self, iteration: i8, last: Duration) -> Duration {
        let base = self.exponential.next(iteration, last);
        let offset = self.offset();
        if offset >= 0 {
            base.saturating_add(Duration::from_nanos(offset.unsigned_abs()))
        } else {
            base.saturating_sub(Duration::from_nanos(offset.unsigned_abs()))
        }
    }
}
