use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::pipeline::vitals_result::SignalQuality;

/// Cross-cutting logger for session events.
///
/// Decouples the service from specific output mechanisms so callers can
/// observe per-frame behavior without changing the orchestration code.
pub trait SessionLogger: Send {
    /// Report that a frame produced a result with the given quality.
    fn frame(&mut self, index: usize, quality: SignalQuality);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. buffer length, queue depth).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// End-of-session report, if the logger keeps one.
    fn summary(&self) -> Option<String> {
        None
    }
}

/// Silent logger that discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _index: usize, _quality: SignalQuality) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger that tracks per-stage timing, metrics and quality counts, and
/// renders a summary when the session ends.
///
/// Progress output is throttled to every `throttle_frames` frames.
pub struct StatsSessionLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    qualities: BTreeMap<&'static str, usize>,
    start_time: Instant,
    frames: usize,
    messages: Vec<String>,
}

impl StatsSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            qualities: BTreeMap::new(),
            start_time: Instant::now(),
            frames: 0,
            messages: Vec::new(),
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    pub fn quality_count(&self, quality: SignalQuality) -> usize {
        self.qualities.get(quality.as_str()).copied().unwrap_or(0)
    }

    fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Session summary ({} frames, {:.1}s total):",
            self.frames,
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.2}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let avg = values.iter().sum::<f64>() / values.len().max(1) as f64;
            lines.push(format!("  {name}: avg {avg:.1}"));
        }

        for (label, count) in &self.qualities {
            lines.push(format!("  {label}: {count} frames"));
        }

        if self.frames > 0 && elapsed_ms > 0.0 {
            let fps = self.frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StatsSessionLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SessionLogger for StatsSessionLogger {
    fn frame(&mut self, index: usize, quality: SignalQuality) {
        self.frames += 1;
        *self.qualities.entry(quality.as_str()).or_default() += 1;
        if self.frames % self.throttle_frames == 0 {
            log::info!("Processed {} frames (frame {index}: {quality})", self.frames);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) -> Option<String> {
        self.summary_string()
    }
}
