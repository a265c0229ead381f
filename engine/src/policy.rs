//! Per-core frequency policy evaluation.
//!
//! [`PolicyNotifier`] is the recompute path: for each core it starts from the
//! user policy, lets every registered [`BoundsAdjuster`] rewrite the bounds,
//! clamps the result into the hardware range, and hands it to the
//! [`CpuFreqBackend`].
//!
//! Starting from the user policy on every pass is what makes "do nothing"
//! a valid way to release an override: once no adjuster touches a core, its
//! next evaluation lands back on whatever the user asked for.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use thiserror::Error;
use wakeboost_types::{CoreId, FreqBounds, HardwareLimits};

/// Rewrites a core's proposed bounds during policy evaluation.
///
/// Called once per core per evaluation, possibly from several threads at
/// once. Implementations must be idempotent for a given internal state.
pub trait BoundsAdjuster: Send + Sync {
    fn adjust_bounds(&self, core: CoreId, limits: HardwareLimits, bounds: FreqBounds)
    -> FreqBounds;
}

/// Where frequency limits come from and where final bounds go.
pub trait CpuFreqBackend: Send + Sync {
    /// Online cores that have a frequency policy.
    fn online_cores(&self) -> Result<Vec<CoreId>, CpuFreqError>;

    fn hardware_limits(&self, core: CoreId) -> Result<HardwareLimits, CpuFreqError>;

    /// Bounds currently in force.
    fn current_bounds(&self, core: CoreId) -> Result<FreqBounds, CpuFreqError>;

    /// Install `bounds`. Callers pass a non-inverted range.
    fn apply_bounds(&self, core: CoreId, bounds: FreqBounds) -> Result<(), CpuFreqError>;
}

#[derive(Debug, Error)]
pub enum CpuFreqError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed value {value:?} in {}", path.display())]
    Malformed { path: PathBuf, value: String },
    #[error("{0} has no frequency policy")]
    UnknownCore(CoreId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("{0} is already registered")]
    Duplicate(&'static str),
}

/// Registry of bounds adjusters plus the evaluation loop.
///
/// Registrations are weak: the registrant owns its adjuster, and a dropped
/// adjuster silently falls out of the chain.
pub struct PolicyNotifier {
    backend: Arc<dyn CpuFreqBackend>,
    adjusters: RwLock<Vec<Weak<dyn BoundsAdjuster>>>,
    user_policies: Mutex<HashMap<CoreId, FreqBounds>>,
}

impl PolicyNotifier {
    pub fn new(backend: Arc<dyn CpuFreqBackend>) -> Self {
        Self {
            backend,
            adjusters: RwLock::new(Vec::new()),
            user_policies: Mutex::new(HashMap::new()),
        }
    }

    /// Append `adjuster` to the chain. Adjusters run in registration order.
    pub fn register(&self, adjuster: &Arc<dyn BoundsAdjuster>) -> Result<(), RegisterError> {
        let weak = Arc::downgrade(adjuster);
        let mut adjusters = self.adjusters.write().unwrap_or_else(PoisonError::into_inner);
        adjusters.retain(|existing| existing.strong_count() > 0);
        if adjusters.iter().any(|existing| Weak::ptr_eq(existing, &weak)) {
            return Err(RegisterError::Duplicate("bounds adjuster"));
        }
        adjusters.push(weak);
        Ok(())
    }

    /// Remove `adjuster` from the chain. Returns whether it was registered.
    pub fn unregister(&self, adjuster: &Arc<dyn BoundsAdjuster>) -> bool {
        let weak = Arc::downgrade(adjuster);
        let mut adjusters = self.adjusters.write().unwrap_or_else(PoisonError::into_inner);
        let before = adjusters.len();
        adjusters.retain(|existing| !Weak::ptr_eq(existing, &weak));
        adjusters.len() != before
    }

    /// Replace the user policy for `core` and re-evaluate it.
    pub fn set_user_bounds(
        &self,
        core: CoreId,
        bounds: FreqBounds,
    ) -> Result<FreqBounds, CpuFreqError> {
        self.user_policies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(core, bounds);
        self.update_policy(core)
    }

    /// The bounds `core` evaluates from before any adjuster runs.
    ///
    /// First use snapshots whatever the backend currently has in force.
    pub fn user_bounds(&self, core: CoreId) -> Result<FreqBounds, CpuFreqError> {
        let mut policies = self.user_policies.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bounds) = policies.get(&core) {
            return Ok(*bounds);
        }
        let bounds = self.backend.current_bounds(core)?;
        policies.insert(core, bounds);
        Ok(bounds)
    }

    /// Evaluate and apply the policy for one core.
    pub fn update_policy(&self, core: CoreId) -> Result<FreqBounds, CpuFreqError> {
        let limits = self.backend.hardware_limits(core)?;
        let user = self.user_bounds(core)?;

        let proposed = self
            .live_adjusters()
            .iter()
            .fold(user, |bounds, adjuster| adjuster.adjust_bounds(core, limits, bounds));
        let applied = limits.clamp(proposed);

        self.backend.apply_bounds(core, applied)?;
        tracing::debug!(%core, %applied, "Policy updated");
        Ok(applied)
    }

    /// Re-evaluate every online core.
    ///
    /// A core that fails is logged and skipped. Returns how many cores were
    /// updated.
    pub fn update_online_policies(&self) -> usize {
        let cores = match self.backend.online_cores() {
            Ok(cores) => cores,
            Err(e) => {
                tracing::warn!("Failed to enumerate online cores: {e}");
                return 0;
            }
        };

        let mut updated = 0;
        for core in cores {
            match self.update_policy(core) {
                Ok(_) => updated += 1,
                Err(e) => tracing::warn!(%core, "Failed to update policy: {e}"),
            }
        }
        updated
    }

    fn live_adjusters(&self) -> Vec<Arc<dyn BoundsAdjuster>> {
        self.adjusters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}
