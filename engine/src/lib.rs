//! Wake boost engine.
//!
//! When the display wakes, every online core's frequency floor is pinned to
//! its hardware ceiling for a short window, then handed back to normal
//! governance. A display-off before the window ends releases immediately.
//!
//! # Architecture
//!
//! ```text
//! DisplayNotifier -> BoostController -> WorkQueue (wake_boost / wake_unboost)
//!                          ^                  |
//!                          |                  v
//!                    adjust_bounds <- PolicyNotifier -> CpuFreqBackend
//! ```
//!
//! The controller is the only stateful piece. It is reached from three
//! directions (display events, the `wake_boost` parameter, and policy
//! evaluation), and every state change except the lazy `Released → Idle`
//! happens on the single-worker queue.

mod controller;
mod display;
mod init;
mod param;
mod policy;
mod sysfs;
mod workqueue;


pub use controller::{BoostController, BoostSettings, BoostStateCell};
pub use display::{DisplayListener, DisplayNotifier};
pub use init::{DISPLAY_PRIORITY, StartupError, WAKE_BOOST_QUEUE, WakeBoost};
pub use param::{BoostParam, ParamError};
pub use policy::{BoundsAdjuster, CpuFreqBackend, CpuFreqError, PolicyNotifier, RegisterError};
pub use sysfs::{SysfsCpuFreq, parse_cpu_list};
pub use workqueue::{DelayedWork, QueueError, Work, WorkQueue};

pub use wakeboost_types::{
    BlankMode, BoostDuration, BoostState, CoreId, DisplayEvent, DisplayPhase, FreqBounds,
    FrequencyKhz, HardwareLimits, ParseDurationError,
};
