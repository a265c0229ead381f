//! Core domain types for wakeboost.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the daemon.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod display;
mod duration;
mod freq;
mod state;

pub use display::{BlankMode, DisplayEvent, DisplayPhase};
pub use duration::{BoostDuration, ParseDurationError};
pub use freq::{CoreId, FreqBounds, FrequencyKhz, HardwareLimits};
pub use state::BoostState;
