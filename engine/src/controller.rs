//! Wake boost controller.
//!
//! Holds the boost state and the two work items that move it:
//!
//! - `wake_boost` pins every online core's floor to its hardware ceiling and
//!   arms `wake_unboost` for the current duration.
//! - `wake_unboost` marks the boost released and forces a re-evaluation so
//!   the floor drops back.
//!
//! Both run on the same [`WorkQueue`], so they are serialized. The only other
//! writer is [`BoundsAdjuster::adjust_bounds`], which may only move
//! `Released → Idle`, and does so with a compare-and-swap.
//!
//! A display-off that lands while `wake_boost` is still queued or running
//! finds no armed timer. It leaves a release request instead, which
//! `wake_boost` honours as soon as it has armed its timer.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use wakeboost_types::{
    BoostDuration, BoostState, CoreId, DisplayEvent, DisplayPhase, FreqBounds, HardwareLimits,
};

use crate::display::DisplayListener;
use crate::policy::{BoundsAdjuster, PolicyNotifier};
use crate::workqueue::{DelayedWork, Work, WorkQueue};

/// Durations the controller starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoostSettings {
    /// Armed on every display wake, overriding whatever was written before.
    pub wake_boost: BoostDuration,
    /// Stored duration before the first write or wake.
    pub initial_boost: BoostDuration,
}

impl Default for BoostSettings {
    fn default() -> Self {
        Self {
            wake_boost: BoostDuration::WAKE_DEFAULT,
            initial_boost: BoostDuration::default(),
        }
    }
}

/// Single-owner storage for [`BoostState`].
#[derive(Debug)]
pub struct BoostStateCell(AtomicU8);

impl BoostStateCell {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(BoostState::Idle.as_u8()))
    }

    #[must_use]
    pub fn get(&self) -> BoostState {
        // Only `set` and `release_to_idle` store, and both store valid variants.
        BoostState::from_u8(self.0.load(Ordering::Acquire)).unwrap_or_default()
    }

    fn set(&self, state: BoostState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    /// `Released → Idle`. Returns `false` if the state was anything else,
    /// including a boost that started after the caller looked.
    fn release_to_idle(&self) -> bool {
        self.0
            .compare_exchange(
                BoostState::Released.as_u8(),
                BoostState::Idle.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for BoostStateCell {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BoostController {
    state: BoostStateCell,
    duration: AtomicU32,
    release_requested: AtomicBool,
    wake_duration: BoostDuration,
    policy: Arc<PolicyNotifier>,
    queue: WorkQueue,
    boost: Arc<Work>,
    unboost: Arc<DelayedWork>,
}

impl BoostController {
    pub fn new(queue: WorkQueue, policy: Arc<PolicyNotifier>, settings: BoostSettings) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Self>| {
            let weak = this.clone();
            let boost = Work::new("wake_boost", move || {
                if let Some(controller) = weak.upgrade() {
                    controller.run_boost();
                }
            });

            let weak = this.clone();
            let unboost = DelayedWork::new(
                queue.clone(),
                Work::new("wake_unboost", move || {
                    if let Some(controller) = weak.upgrade() {
                        controller.run_unboost();
                    }
                }),
            );

            Self {
                state: BoostStateCell::new(),
                duration: AtomicU32::new(settings.initial_boost.as_millis()),
                release_requested: AtomicBool::new(false),
                wake_duration: settings.wake_boost,
                policy,
                queue,
                boost,
                unboost,
            }
        })
    }

    #[must_use]
    pub fn state(&self) -> BoostState {
        self.state.get()
    }

    /// Duration the next boost will arm.
    #[must_use]
    pub fn boost_duration(&self) -> BoostDuration {
        BoostDuration::from_millis(self.duration.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn wake_duration(&self) -> BoostDuration {
        self.wake_duration
    }

    /// An unboost timer is armed and has not fired.
    #[must_use]
    pub fn unboost_pending(&self) -> bool {
        self.unboost.is_pending()
    }

    #[must_use]
    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    #[must_use]
    pub fn policy(&self) -> &Arc<PolicyNotifier> {
        &self.policy
    }

    /// Display is coming on: boost for the wake duration.
    pub fn on_display_active(&self) {
        self.duration
            .store(self.wake_duration.as_millis(), Ordering::Release);
        self.queue_boost();
    }

    /// Display is going off: release now instead of waiting out the timer.
    ///
    /// Covers a boost that has not armed its timer yet as well.
    pub fn on_display_inactive(&self) {
        self.release_requested.store(true, Ordering::Release);
        if self.unboost.flush_now() {
            tracing::debug!("Display off, releasing boost early");
        }
    }

    /// Store a new duration and start a boost cycle with it.
    ///
    /// Timers armed by earlier cycles keep their original deadlines.
    pub fn set_boost_duration(&self, duration: BoostDuration) {
        self.duration.store(duration.as_millis(), Ordering::Release);
        tracing::info!(duration_ms = duration.as_millis(), "Boost duration set");
        self.queue_boost();
    }

    fn queue_boost(&self) {
        self.release_requested.store(false, Ordering::Release);
        self.queue.queue(&self.boost);
    }

    fn run_boost(&self) {
        self.state.set(BoostState::Boosted);
        let cores = self.policy.update_online_policies();

        let duration = self.boost_duration();
        self.unboost.queue_after(duration.as_duration());
        tracing::debug!(cores, duration_ms = duration.as_millis(), "Boosted");

        // Display went off while this boost was queued or running.
        if self.release_requested.swap(false, Ordering::AcqRel) && self.unboost.flush_now() {
            tracing::debug!("Display already off, releasing boost");
        }
    }

    fn run_unboost(&self) {
        self.state.set(BoostState::Released);
        let cores = self.policy.update_online_policies();
        tracing::debug!(cores, "Unboosted");
    }
}

impl BoundsAdjuster for BoostController {
    fn adjust_bounds(
        &self,
        core: CoreId,
        limits: HardwareLimits,
        mut bounds: FreqBounds,
    ) -> FreqBounds {
        match self.state.get() {
            BoostState::Idle => {}
            BoostState::Released => {
                bounds.min = limits.min;
                if self.state.release_to_idle() {
                    tracing::trace!(%core, "Boost state back to idle");
                }
            }
            BoostState::Boosted => {
                bounds.min = limits.max;
                if bounds.max < bounds.min {
                    bounds.max = bounds.min;
                }
            }
        }
        bounds
    }
}

impl DisplayListener for BoostController {
    fn on_display_event(&self, event: DisplayEvent) {
        // React before the panel changes state, never after.
        if event.phase != DisplayPhase::Early {
            return;
        }
        if event.mode.is_active() {
            self.on_display_active();
        } else {
            self.on_display_inactive();
        }
    }
}
