//! Runtime `wake_boost` parameter.
//!
//! Mirrors a writable integer knob: reads report the stored duration, writes
//! validate, store, and start a boost cycle.

use std::sync::Arc;

use thiserror::Error;
use wakeboost_types::{BoostDuration, ParseDurationError};

use crate::controller::BoostController;

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        source: ParseDurationError,
    },
}

#[derive(Clone)]
pub struct BoostParam {
    controller: Arc<BoostController>,
}

impl BoostParam {
    pub const NAME: &'static str = "wake_boost";

    pub fn new(controller: Arc<BoostController>) -> Self {
        Self { controller }
    }

    #[must_use]
    pub fn get(&self) -> String {
        self.controller.boost_duration().to_string()
    }

    /// Parse and store `raw`, then arm a boost with it.
    ///
    /// Rejected input leaves the stored duration and the boost state as
    /// they were.
    pub fn set(&self, raw: &str) -> Result<(), ParamError> {
        let duration: BoostDuration = raw.parse().map_err(|source| {
            tracing::warn!(value = raw.trim(), "Rejected {} write: {source}", Self::NAME);
            ParamError::Invalid {
                name: Self::NAME,
                source,
            }
        })?;
        self.controller.set_boost_duration(duration);
        Ok(())
    }
}
