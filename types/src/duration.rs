//! Boost window length.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a boost window in milliseconds.
///
/// Unsigned by construction; any `u32` is a valid window, including zero
/// (boost and immediately queue the release).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoostDuration(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDurationError {
    #[error("boost duration must not be empty")]
    Empty,
    #[error("boost duration must not be negative (got {0:?})")]
    Negative(String),
    #[error("boost duration must be a whole number of milliseconds (got {0:?})")]
    NotANumber(String),
    #[error("boost duration {0:?} exceeds {max} ms", max = u32::MAX)]
    OutOfRange(String),
}

impl BoostDuration {
    /// Window armed when the display wakes.
    pub const WAKE_DEFAULT: Self = Self(2000);

    #[must_use]
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0 as u64)
    }
}

impl FromStr for BoostDuration {
    type Err = ParseDurationError;

    /// Accepts a decimal integer with optional surrounding whitespace, so a
    /// value written with `echo` (trailing newline) parses.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseDurationError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(ParseDurationError::Negative(trimmed.to_string()));
        }
        trimmed.parse::<u32>().map(Self).map_err(|err| match err.kind() {
            IntErrorKind::PosOverflow => ParseDurationError::OutOfRange(trimmed.to_string()),
            _ => ParseDurationError::NotANumber(trimmed.to_string()),
        })
    }
}

impl fmt::Display for BoostDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
