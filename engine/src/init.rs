//! Startup wiring: queue, controller, and registrations.

use std::sync::Arc;

use thiserror::Error;

use crate::controller::{BoostController, BoostSettings};
use crate::display::{DisplayListener, DisplayNotifier};
use crate::param::BoostParam;
use crate::policy::{BoundsAdjuster, PolicyNotifier, RegisterError};
use crate::workqueue::{QueueError, WorkQueue};

/// Name of the worker that runs boost and unboost.
pub const WAKE_BOOST_QUEUE: &str = "wake_boost_wq";

/// The controller hears about display changes before any other listener.
pub const DISPLAY_PRIORITY: i32 = i32::MAX;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("failed to register with the policy notifier: {0}")]
    PolicyRegistration(#[source] RegisterError),
    #[error("failed to register with the display notifier: {0}")]
    DisplayRegistration(#[source] RegisterError),
}

/// A running wake boost instance.
///
/// Owning this keeps the controller registered; the notifiers only hold weak
/// references to it.
pub struct WakeBoost {
    controller: Arc<BoostController>,
    param: BoostParam,
}

impl WakeBoost {
    /// Create the work queue and controller, then hook the controller into
    /// the policy and display paths.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(
        settings: BoostSettings,
        policy: &Arc<PolicyNotifier>,
        display: &DisplayNotifier,
    ) -> Result<Self, StartupError> {
        let queue = WorkQueue::new(WAKE_BOOST_QUEUE)?;
        let controller = BoostController::new(queue, Arc::clone(policy), settings);

        let adjuster: Arc<dyn BoundsAdjuster> = controller.clone();
        policy
            .register(&adjuster)
            .map_err(StartupError::PolicyRegistration)?;

        let listener: Arc<dyn DisplayListener> = controller.clone();
        if let Err(e) = display.register(&listener, DISPLAY_PRIORITY) {
            policy.unregister(&adjuster);
            return Err(StartupError::DisplayRegistration(e));
        }

        tracing::info!(
            wake_boost_ms = settings.wake_boost.as_millis(),
            initial_boost_ms = settings.initial_boost.as_millis(),
            "Wake boost started"
        );

        let param = BoostParam::new(Arc::clone(&controller));
        Ok(Self { controller, param })
    }

    #[must_use]
    pub fn controller(&self) -> &Arc<BoostController> {
        &self.controller
    }

    #[must_use]
    pub fn param(&self) -> &BoostParam {
        &self.param
    }

    /// Wait until queued boost/unboost work has run.
    pub async fn flush(&self) {
        self.controller.queue().flush().await;
    }
}
