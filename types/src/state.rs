//! Boost state machine vocabulary.

use std::fmt;

/// Lifecycle of a single wake boost.
///
/// ```text
/// Idle --(boost work)--> Boosted --(unboost work)--> Released --(next adjust)--> Idle
/// ```
///
/// The cycle has no terminal state. `Released` exists so the next policy
/// evaluation can pull the floor back down exactly once before going quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BoostState {
    /// No override installed; policy evaluation passes bounds through.
    #[default]
    Idle = 0,
    /// Override just ended; the next evaluation restores the hardware floor.
    Released = 1,
    /// Override active; the floor is pinned to the hardware ceiling.
    Boosted = 2,
}

impl BoostState {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a stored discriminant.
    ///
    /// Returns `None` for values no variant encodes; the caller owns the
    /// storage and decides what a corrupt value means.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Released),
            2 => Some(Self::Boosted),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Released => "released",
            Self::Boosted => "boosted",
        }
    }
}

impl fmt::Display for BoostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
