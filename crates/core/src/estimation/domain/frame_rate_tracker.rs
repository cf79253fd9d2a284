use crate::shared::estimator_config::FrameRateConfig;

const MIN_INTERVAL_SECS: f64 = 1e-6;

/// Exponential moving average of the observed frame rate.
#[derive(Clone, Debug)]
pub struct FrameRateTracker {
    config: FrameRateConfig,
    fps: f64,
    last_timestamp: Option<f64>,
}

impl FrameRateTracker {
    pub fn new(config: FrameRateConfig) -> Self {
        Self {
            fps: config.initial_fps,
            config,
            last_timestamp: None,
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Records a frame arrival at `timestamp` seconds and returns the
    /// updated rate. Intervals of a microsecond or less are ignored.
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        if let Some(previous) = self.last_timestamp {
            let dt = timestamp - previous;
            if dt > MIN_INTERVAL_SECS {
                let instant = (1.0 / dt).clamp(self.config.min_fps, self.config.max_fps);
                let alpha = self.config.smoothing;
                self.fps = (1.0 - alpha) * self.fps + alpha * instant;
            }
        }
        self.last_timestamp = Some(timestamp);
        self.fps
    }
}

impl Default for FrameRateTracker {
    fn default() -> Self {
        Self::new(FrameRateConfig::default())
    }
}
