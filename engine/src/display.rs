//! Display blank/unblank fan-out.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use wakeboost_types::DisplayEvent;

use crate::policy::RegisterError;

pub trait DisplayListener: Send + Sync {
    fn on_display_event(&self, event: DisplayEvent);
}

struct Registration {
    priority: i32,
    listener: Weak<dyn DisplayListener>,
}

/// Delivers display events to listeners, highest priority first.
///
/// Equal priorities run in registration order. Like [`PolicyNotifier`],
/// registrations are weak.
///
/// [`PolicyNotifier`]: crate::PolicyNotifier
#[derive(Default)]
pub struct DisplayNotifier {
    listeners: RwLock<Vec<Registration>>,
}

impl DisplayNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        listener: &Arc<dyn DisplayListener>,
        priority: i32,
    ) -> Result<(), RegisterError> {
        let weak = Arc::downgrade(listener);
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|reg| reg.listener.strong_count() > 0);
        if listeners.iter().any(|reg| Weak::ptr_eq(&reg.listener, &weak)) {
            return Err(RegisterError::Duplicate("display listener"));
        }
        let position = listeners
            .iter()
            .position(|reg| reg.priority < priority)
            .unwrap_or(listeners.len());
        listeners.insert(
            position,
            Registration {
                priority,
                listener: weak,
            },
        );
        Ok(())
    }

    pub fn unregister(&self, listener: &Arc<dyn DisplayListener>) -> bool {
        let weak = Arc::downgrade(listener);
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|reg| !Weak::ptr_eq(&reg.listener, &weak));
        listeners.len() != before
    }

    /// Deliver `event` to every live listener. Returns how many were called.
    pub fn notify(&self, event: DisplayEvent) -> usize {
        let live: Vec<Arc<dyn DisplayListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|reg| reg.listener.upgrade())
            .collect();

        tracing::debug!(?event, listeners = live.len(), "Display event");
        for listener in &live {
            listener.on_display_event(event);
        }
        live.len()
    }
}
