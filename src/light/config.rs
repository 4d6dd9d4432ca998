//! Cycle-duration configuration.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when building a [`CycleConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cycle durations must be greater than zero")]
    ZeroDuration,

    #[error("Minimum cycle duration {min:?} exceeds maximum {max:?}")]
    InvertedRange { min: Duration, max: Duration },

    #[error("Cycle duration {0:?} is longer than u64::MAX nanoseconds")]
    TooLong(Duration),
}

/// Bounded range each phase's duration is drawn from.
///
/// Every phase lasts a duration drawn uniformly from `min..=max`. The
/// default range is 4 to 6 seconds. The serialized form is in whole
/// milliseconds.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use stoplight::CycleConfig;
///
/// let config = CycleConfig::new(Duration::from_millis(40), Duration::from_millis(60))
///     .unwrap()
///     .with_seed(7);
///
/// assert_eq!(config.min(), Duration::from_millis(40));
/// assert_eq!(config.seed(), Some(7));
///
/// assert!(CycleConfig::new(Duration::from_secs(6), Duration::from_secs(4)).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCycleConfig", into = "RawCycleConfig")]
pub struct CycleConfig {
    min: Duration,
    max: Duration,
    seed: Option<u64>,
}

impl CycleConfig {
    pub const DEFAULT_MIN: Duration = Duration::from_secs(4);
    pub const DEFAULT_MAX: Duration = Duration::from_secs(6);
    /// Longest duration `draw` can represent: `u64::MAX` nanoseconds.
    pub const LONGEST: Duration = Duration::from_nanos(u64::MAX);

    /// Create a range, rejecting empty or inverted ones.
    pub fn new(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min.is_zero() || max.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if min > max {
            return Err(ConfigError::InvertedRange { min, max });
        }
        if max > Self::LONGEST {
            return Err(ConfigError::TooLong(max));
        }
        Ok(Self {
            min,
            max,
            seed: None,
        })
    }

    /// Seed the cycling RNG, making the sequence of durations reproducible.
    ///
    /// Without a seed the RNG is seeded from the operating system.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Shortest cycle duration that can be drawn.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Longest cycle duration that can be drawn.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// RNG seed, if the durations are reproducible.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw the next cycle duration.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_nanos(rng.random_range(nanos(self.min)..=nanos(self.max)))
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
            seed: None,
        }
    }
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Serialized form of [`CycleConfig`]; validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawCycleConfig {
    min_millis: u64,
    max_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl TryFrom<RawCycleConfig> for CycleConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCycleConfig) -> Result<Self, Self::Error> {
        let config = Self::new(
            Duration::from_millis(raw.min_millis),
            Duration::from_millis(raw.max_millis),
        )?;
        Ok(match raw.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

impl From<CycleConfig> for RawCycleConfig {
    fn from(config: CycleConfig) -> Self {
        Self {
            min_millis: millis(config.min),
            max_millis: millis(config.max),
            seed: config.seed,
        }
    }
}
