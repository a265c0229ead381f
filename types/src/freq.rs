//! Frequency units and per-core policy bounds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Frequency in kHz, the unit cpufreq exposes through sysfs.
pub type FrequencyKhz = u32;

/// Logical CPU index as numbered by the kernel (`cpu0`, `cpu1`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreId(u32);

impl CoreId {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpu{}", self.0)
    }
}

/// The range a core's hardware can actually run at (`cpuinfo_{min,max}_freq`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareLimits {
    pub min: FrequencyKhz,
    pub max: FrequencyKhz,
}

impl HardwareLimits {
    #[must_use]
    pub const fn new(min: FrequencyKhz, max: FrequencyKhz) -> Self {
        Self { min, max }
    }

    /// Pull `bounds` inside the hardware range without inverting it.
    #[must_use]
    pub fn clamp(self, bounds: FreqBounds) -> FreqBounds {
        let max = bounds.max.clamp(self.min, self.max);
        let min = bounds.min.clamp(self.min, max);
        FreqBounds { min, max }
    }
}

/// The `{min, max}` range a core's governor is allowed to pick from.
///
/// Adjusters receive and return this by value; an inverted range is legal
/// while the chain runs and is repaired by [`HardwareLimits::clamp`] before
/// anything is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreqBounds {
    pub min: FrequencyKhz,
    pub max: FrequencyKhz,
}

impl FreqBounds {
    #[must_use]
    pub const fn new(min: FrequencyKhz, max: FrequencyKhz) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn is_inverted(self) -> bool {
        self.min > self.max
    }
}

impl From<HardwareLimits> for FreqBounds {
    fn from(limits: HardwareLimits) -> Self {
        Self::new(limits.min, limits.max)
    }
}

impl fmt::Display for FreqBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}] kHz", self.min, self.max)
    }
}
