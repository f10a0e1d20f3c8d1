//! Plain exponential interval policy.

use std::time::Duration;

use super::Intervals;

/// Exponential interval policy.
///
/// The pause for iteration `i` is `initial × (base / unit)^i`, capped at
/// `max`. `base / unit` is an integer division of the two durations, so
/// `base: 2s, unit: 1s` grows by a factor of 2 and the unit only strips the
/// time scale from the base. The product is computed in whole nanoseconds,
/// so every `Duration` up to [`Duration::MAX`] is reproduced exactly.
///
/// The `last` argument of [`Intervals::next`] is ignored: every pause is
/// recomputed from the iteration index, so a decorator such as
/// [`ExponentialJitter`](crate::ExponentialJitter) never feeds its random
/// offset back into the series.
///
/// # Edge cases
///
/// - iteration `0` always yields `initial` (capped at `max`)
/// - a zero `initial` yields zero for every iteration
/// - once `initial × factor^i` overflows or exceeds `max`, the result is `max`
/// - a zero `unit` is treated as an infinite factor: `initial`, then `max`
/// - a negative iteration is treated as `0`; the series never drops below
///   `initial` into fractions of it
///
/// # Examples
///
/// ```rust
/// use rebound::{Exponential, Intervals};
/// use std::time::Duration;
///
/// let mut policy = Exponential {
///     base: Duration::from_secs(3),
///     unit: Duration::from_secs(1),
///     initial: Duration::from_secs(1),
///     max: Duration::from_secs(30),
/// };
///
/// // 1s, 3s, 9s, 27s, 30s, 30s
/// assert_eq!(policy.next(3, Duration::ZERO), Duration::from_secs(27));
/// assert_eq!(policy.next(4, Duration::ZERO), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exponential {
    /// Growth base, expressed in `unit`s.
    pub base: Duration,
    /// Time scale stripped from `base` before exponentiation.
    pub unit: Duration,
    /// Pause after the first failed attempt.
    pub initial: Duration,
    /// Ceiling for every pause.
    pub max: Duration,
}

impl Exponential {
    /// Binary exponential series: 0.5s, 1s, 2s, 4s, 8s, 16s, 20s, 20s, ...
    pub fn default_binary() -> Self {
        Self {
            base: Duration::from_secs(2),
            unit: Duration::from_secs(1),
            initial: Duration::from_millis(500),
            max: Duration::from_secs(20),
        }
    }

    /// Growth factor applied per iteration (`base / unit`).
    ///
    /// Infinite when `unit` is zero.
    pub fn factor(&self) -> f64 {
        match self.unit.as_nanos() {
            0 => f64::INFINITY,
            unit => (self.base.as_nanos() / unit) as f64,
        }
    }

    /// Check the configuration for series that cannot grow as intended.
    ///
    /// [`Intervals::next`] never panics on these; this only reports them.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.unit.is_zero() {
            Err("Exponential unit must be non-zero")
        } else if self.base < self.unit {
            Err("Exponential base must be at least one unit, or the series shrinks to zero")
        } else if self.initial > self.max {
            Err("Exponential initial must not exceed max")
        } else {
            Ok(())
        }
    }
}

impl Default for Exponential {
    /// Returns [`Exponential::default_binary`].
    fn default() -> Self {
        Self::default_binary()
    }
}

impl Intervals for Exponential {
    fn next(&mut self, iteration: i8, _last: Duration) -> Duration {
        if self.initial.is_zero() {
            return Duration::ZERO;
        }

        let exponent = u32::try_from(iteration).unwrap_or(0);
        let Some(factor) = self.base.as_nanos().checked_div(self.unit.as_nanos()) else {
            // zero unit
            return if exponent == 0 {
                self.initial.min(self.max)
            } else {
                self.max
            };
        };

        factor
            .checked_pow(exponent)
            .and_then(|power| self.initial.as_nanos().checked_mul(power))
            .filter(|nanos| *nanos <= self.max.as_nanos())
            .and_then(from_nanos)
            .unwrap_or(self.max)
    }
}

fn from_nanos(nanos: u128) -> Option<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (nanos % NANOS_PER_SEC) as u32))
}

#[cfg(test)]
mod exponential_tests {
    use super::*;

    fn series(policy: &mut Exponential, len: i8) -> Vec<Duration> {
        let mut last = Duration::ZERO;
        (0..len)
            .map(|i| {
                last = policy.next(i, last);
                last
            })
            .collect()
    }

    #[test]
    fn test_default_binary_series() {
        let mut policy = Exponential::default_binary();

        assert_eq!(
            series(&mut policy, 8),
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(16),
                Duration::from_secs(20),
                Duration::from_secs(20),
            ]
        );
    }

    #[test]
    fn test_iteration_zero_ignores_last() {
        let mut policy = Exponential::default_binary();

        for last in [Duration::ZERO, Duration::from_millis(500), Duration::from_secs(60)] {
            assert_eq!(policy.next(0, last), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_iteration_max_is_ceiling() {
        let mut policy = Exponential::default_binary();
        assert_eq!(policy.next(i8::MAX, Duration::ZERO), policy.max);
    }

    #[test]
    fn test_base_three_series() {
        let mut policy = Exponential {
            base: Duration::from_secs(3),
            unit: Duration::from_secs(1),
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        };

        assert_eq!(
            series(&mut policy, 6),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(3),
                Duration::from_secs(9),
                Duration::from_secs(27),
                Duration::from_secs(30),
                Duration::from_secs(30),
            ]
        );
    }

    #[test]
    fn test_zero_initial_is_always_zero() {
        let mut policy = Exponential {
            base: Duration::from_secs(3),
            unit: Duration::from_secs(1),
            initial: Duration::ZERO,
            max: Duration::from_secs(30),
        };

        for i in 0..7 {
            assert_eq!(policy.next(i, Duration::ZERO), Duration::ZERO, "iteration {}", i);
        }
        assert_eq!(policy.next(i8::MAX, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_zero_base_collapses_after_initial() {
        let mut policy = Exponential {
            base: Duration::ZERO,
            unit: Duration::from_millis(1),
            initial: Duration::from_millis(200),
            max: Duration::from_millis(200),
        };

        assert_eq!(policy.next(0, Duration::ZERO), Duration::from_millis(200));
        assert_eq!(policy.next(1, Duration::from_millis(200)), Duration::ZERO);
    }

    #[test]
    fn test_zero_unit_jumps_to_max() {
        let mut policy = Exponential {
            base: Duration::from_secs(2),
            unit: Duration::ZERO,
            initial: Duration::from_millis(100),
            max: Duration::from_secs(5),
        };

        assert_eq!(policy.factor(), f64::INFINITY);
        assert_eq!(policy.next(0, Duration::ZERO), Duration::from_millis(100));
        assert_eq!(policy.next(1, Duration::ZERO), Duration::from_secs(5));
    }

    #[test]
    fn test_initial_above_max_is_capped() {
        let mut policy = Exponential {
            base: Duration::from_secs(2),
            unit: Duration::from_secs(1),
            initial: Duration::from_secs(10),
            max: Duration::from_secs(5),
        };

        assert_eq!(policy.next(0, Duration::ZERO), Duration::from_secs(5));
    }

    #[test]
    fn test_negative_iteration_is_treated_as_zero() {
        let mut policy = Exponential::default_binary();
        assert_eq!(policy.next(-3, Duration::ZERO), Duration::from_millis(500));
    }

    #[test]
    fn test_durations_beyond_u64_nanos_stay_exact() {
        const YEAR: u64 = 365 * 24 * 60 * 60;
        let mut policy = Exponential {
            base: Duration::from_secs(2),
            unit: Duration::from_secs(1),
            initial: Duration::from_secs(600 * YEAR),
            max: Duration::MAX,
        };

        assert_eq!(policy.next(0, Duration::ZERO), Duration::from_secs(600 * YEAR));
        assert_eq!(policy.next(1, Duration::ZERO), Duration::from_secs(1_200 * YEAR));
        assert_eq!(policy.next(i8::MAX, Duration::ZERO), Duration::MAX);
    }

    #[test]
    fn test_sub_second_precision_is_kept() {
        let mut policy = Exponential {
            base: Duration::from_secs(3),
            unit: Duration::from_secs(1),
            initial: Duration::new(1, 1),
            max: Duration::from_secs(3_600),
        };

        assert_eq!(policy.next(2, Duration::ZERO), Duration::new(9, 9));
    }

    #[test]
    fn test_sub_unit_base_truncates_factor() {
        let policy = Exponential {
            base: Duration::from_millis(2500),
            unit: Duration::from_secs(1),
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
        };

        assert_eq!(policy.factor(), 2.0);
    }

    #[test]
    fn test_validate() {
        assert!(Exponential::default_binary().validate().is_ok());

        let zero_unit = Exponential {
            unit: Duration::ZERO,
            ..Exponential::default_binary()
        };
        assert!(zero_unit.validate().is_err());

        let shrinking = Exponential {
            base: Duration::from_millis(500),
            ..Exponential::default_binary()
        };
        assert!(shrinking.validate().is_err());

        let inverted = Exponential {
            initial: Duration::from_secs(30),
            ..Exponential::default_binary()
        };
        assert!(inverted.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserializes_from_config() {
        let json = r#"{
            "base": {"secs": 3, "nanos": 0},
            "unit": {"secs": 1, "nanos": 0},
            "initial": {"secs": 1, "nanos": 0},
            "max": {"secs": 30, "nanos": 0}
        }"#;

        let mut policy: Exponential = serde_json::from_str(json).unwrap();
        assert_eq!(policy.next(2, Duration::ZERO), Duration::from_secs(9));
    }
}
