//! Traffic light phases and the record of a phase change.
//!
//! A light only ever alternates between two phases, so flipping is the
//! whole transition function.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Phase of a traffic light.
///
/// Phases are plain values, copied on every read and publish.
///
/// # Example
///
/// ```rust
/// use stoplight::Phase;
///
/// let phase = Phase::default();
/// assert_eq!(phase, Phase::Red);
/// assert_eq!(phase.flipped(), Phase::Green);
/// assert_eq!(phase.flipped().flipped(), Phase::Red);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Phase {
    /// Traffic must stop.
    #[default]
    Red = 0,
    /// Traffic may proceed.
    Green = 1,
}

impl Phase {
    /// Get the phase name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
        }
    }

    /// The phase that follows this one.
    pub fn flipped(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Red,
        }
    }

    /// Whether traffic may proceed.
    pub fn is_green(self) -> bool {
        matches!(self, Self::Green)
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a value previously produced by `as_u8`.
    ///
    /// Anything other than the green discriminant decodes as red.
    pub(crate) fn from_u8(value: u8) -> Self {
        if value == Self::Green as u8 {
            Self::Green
        } else {
            Self::Red
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Record of a single phase flip.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use chrono::Utc;
/// use stoplight::{Phase, PhaseTransition};
///
/// let transition = PhaseTransition {
///     from: Phase::Red,
///     to: Phase::Green,
///     timestamp: Utc::now(),
///     cycle: 1,
///     duration: Duration::from_secs(5),
/// };
/// assert!(transition.to.is_green());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// The phase being left
    pub from: Phase,
    /// The phase being entered
    pub to: Phase,
    /// When the flip happened
    pub timestamp: DateTime<Utc>,
    /// 1-based count of flips performed by the light, this one included
    pub cycle: u64,
    /// How long the previous phase was held
    pub duration: Duration,
}
