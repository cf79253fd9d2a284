use std::sync::{Arc, Mutex, PoisonError};

use serde::Deserialize;

/// Run-time tuning knobs sent by the client.
///
/// The values are stored and surfaced to the session but do not currently
/// alter any estimation threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    pub sensitivity: f64,
    pub motion_rejection: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sensitivity: 75.0,
            motion_rejection: 40.0,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(default)]
    pub sensitivity: Option<f64>,
    #[serde(default)]
    pub motion_rejection: Option<f64>,
}

impl SessionConfig {
    /// Applies the finite fields of `update`. Returns whether anything changed.
    pub fn apply(&mut self, update: &ConfigUpdate) -> bool {
        let before = *self;
        if let Some(v) = update.sensitivity.filter(|v| v.is_finite()) {
            self.sensitivity = v;
        }
        if let Some(v) = update.motion_rejection.filter(|v| v.is_finite()) {
            self.motion_rejection = v;
        }
        *self != before
    }
}

/// Shared, cheaply cloneable access to one session's [`SessionConfig`].
///
/// Updates take a short exclusive lock and never wait on frame processing.
#[derive(Clone, Debug, Default)]
pub struct ConfigHandle {
    inner: Arc<Mutex<SessionConfig>>,
}

impl ConfigHandle {
    pub fn get(&self) -> SessionConfig {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn configure(&self, update: &ConfigUpdate) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(update)
    }
}
