//! Display power transitions as delivered by the blank/unblank source.

use serde::{Deserialize, Serialize};

/// When, relative to the hardware transition, an event is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayPhase {
    /// Before the panel changes power state.
    Early,
    /// After the transition has been committed.
    Committed,
}

/// Requested panel power mode, mirroring the framebuffer blank levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankMode {
    Unblank,
    Normal,
    VsyncSuspend,
    HsyncSuspend,
    Powerdown,
}

impl BlankMode {
    /// Only `Unblank` lights the panel; every other level counts as off.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Unblank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayEvent {
    pub phase: DisplayPhase,
    pub mode: BlankMode,
}

impl DisplayEvent {
    #[must_use]
    pub const fn new(phase: DisplayPhase, mode: BlankMode) -> Self {
        Self { phase, mode }
    }

    #[must_use]
    pub const fn early(mode: BlankMode) -> Self {
        Self::new(DisplayPhase::Early, mode)
    }

    #[must_use]
    pub const fn committed(mode: BlankMode) -> Self {
        Self::new(DisplayPhase::Committed, mode)
    }
}
