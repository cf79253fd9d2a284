use std::time::Instant;

use crate::estimation::domain::adaptive_smoother::AdaptiveSmoother;
use crate::estimation::domain::frame_rate_tracker::FrameRateTracker;
use crate::estimation::domain::heart_rate_estimator::HeartRateEstimator;
use crate::estimation::domain::lighting_estimator::lighting_score;
use crate::estimation::domain::pos_projector;
use crate::estimation::domain::respiration_estimator::RespirationEstimator;
use crate::estimation::domain::spo2_estimator::Spo2Estimator;
use crate::estimation::domain::temporal_buffer::TemporalBuffer;
use crate::pipeline::session_logger::SessionLogger;
use crate::pipeline::vitals_result::{SignalQuality, VitalsResult};
use crate::sampling::domain::region_sampler::RegionSampler;
use crate::sampling::infrastructure::skin_region_sampler::SkinRegionSampler;
use crate::shared::estimator_config::{EstimatorConfig, QualityThresholds};
use crate::shared::face_region::FaceRegion;
use crate::shared::frame::Frame;

/// Where the session stood after its most recent frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No face in the last frame; nothing was buffered.
    NoFace,
    /// Face located but no sub-region could be sampled; nothing was buffered.
    RoiError,
    /// Face present, buffer still shorter than the estimation window.
    Sampling,
    /// Enough history for full estimation.
    Estimating,
}

/// All per-session estimation state: color history, smoother, Kalman state
/// and the tracked frame rate.
///
/// One session serves exactly one stream; calls must be serialized by the
/// owner. Dropping the session discards everything.
pub struct VitalsSession {
    sampler: Box<dyn RegionSampler>,
    buffer: TemporalBuffer,
    heart_rate: HeartRateEstimator,
    smoother: AdaptiveSmoother,
    spo2: Spo2Estimator,
    respiration: RespirationEstimator,
    frame_rate: FrameRateTracker,
    quality: QualityThresholds,
    min_window_secs: f64,
    state: SessionState,
}

impl VitalsSession {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self::with_sampler(config, Box::new(SkinRegionSampler::new(config.skin.clone())))
    }

    /// Session using a custom region sampling front end.
    pub fn with_sampler(config: &EstimatorConfig, sampler: Box<dyn RegionSampler>) -> Self {
        Self {
            sampler,
            buffer: TemporalBuffer::new(config.buffer_size),
            heart_rate: HeartRateEstimator::new(config.heart_rate.clone()),
            smoother: AdaptiveSmoother::new(config.smoothing.clone()),
            spo2: Spo2Estimator::new(config.spo2.clone()),
            respiration: RespirationEstimator::new(config.respiration.clone()),
            frame_rate: FrameRateTracker::new(config.frame_rate.clone()),
            quality: config.quality.clone(),
            min_window_secs: config.heart_rate.min_window_secs,
            state: SessionState::NoFace,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn fps(&self) -> f64 {
        self.frame_rate.fps()
    }

    pub fn smoother(&self) -> &AdaptiveSmoother {
        &self.smoother
    }

    /// Processes one decoded frame captured at `timestamp` seconds.
    ///
    /// `face` is the detector's output for this frame. The frame rate is
    /// updated for every call, including frames without a face.
    pub fn process(
        &mut self,
        frame: &Frame,
        face: Option<FaceRegion>,
        timestamp: f64,
        logger: &mut dyn SessionLogger,
    ) -> VitalsResult {
        let fps = self.frame_rate.tick(timestamp);
        logger.metric("fps", fps);

        let Some(face) = face else {
            self.transition(SessionState::NoFace);
            return VitalsResult::no_face();
        };
        let roi = face.forehead();

        let t0 = Instant::now();
        let sample = match self.sampler.sample(frame, &face) {
            Ok(sample) => sample,
            Err(e) => {
                log::warn!("Frame {}: {e}", frame.index());
                self.transition(SessionState::RoiError);
                return VitalsResult::roi_error(roi);
            }
        };
        self.buffer.push(sample);
        logger.timing("sample", t0.elapsed().as_secs_f64() * 1000.0);
        logger.metric("buffer_len", self.buffer.len() as f64);

        if (self.buffer.len() as f64) < self.min_window_secs * fps {
            self.transition(SessionState::Sampling);
            return VitalsResult {
                quality: SignalQuality::from_snr(0.0, &self.quality),
                roi: Some(roi),
                ..VitalsResult::no_face()
            };
        }

        self.transition(SessionState::Estimating);
        let t0 = Instant::now();
        let result = self.estimate(fps, roi);
        logger.timing("estimate", t0.elapsed().as_secs_f64() * 1000.0);
        result
    }

    fn estimate(&mut self, fps: f64, roi: FaceRegion) -> VitalsResult {
        let window = self.buffer.snapshot();

        let pulse = pos_projector::project(&window.red, &window.green, &window.blue);
        let raw = self.heart_rate.estimate(&pulse, fps);
        let bpm = self.smoother.update(raw);
        log::debug!(
            "raw {:.1} bpm (snr {:.1}) -> smoothed {bpm:.1} bpm",
            raw.bpm,
            raw.snr
        );

        VitalsResult {
            bpm,
            spo2: self.spo2.estimate(&window.red, &window.blue),
            respiration_rate: self.respiration.estimate(&window.green, fps),
            snr: raw.snr,
            lighting: lighting_score(&window.luminance, fps),
            quality: SignalQuality::from_snr(raw.snr, &self.quality),
            roi: Some(roi),
        }
        .rounded()
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            log::info!("Session state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

impl Default for VitalsSession {
    fn default() -> Self {
        Self::new(&EstimatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::session_logger::{NullSessionLogger, StatsSessionLogger};
    use crate::sampling::domain::color_sample::ColorSample;
    use crate::sampling::domain::region_sampler::SamplingError;
    use crate::shared::estimator_config::SmoothingMode;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const FACE: FaceRegion = FaceRegion {
        x: 0,
        y: 0,
        width: 64,
        height: 64,
    };

    /// Uniform frame whose color carries a 1.2 Hz pulse on the POS axis.
    fn pulse_frame(i: usize, fps: f64) -> Frame {
        let phase = (2.0 * PI * 1.2 * i as f64 / fps).sin();
        let rgb = [
            (170.0 + 2.0 * phase).round() as u8,
            (120.0 + 6.0 * phase).round() as u8,
            (100.0 + 2.0 * phase).round() as u8,
        ];
        Frame::filled(64, 64, rgb, i)
    }

    fn feed_at(
        session: &mut VitalsSession,
        frames: std::ops::Range<usize>,
        fps: f64,
        logger: &mut dyn SessionLogger,
    ) -> VitalsResult {
        let mut last = VitalsResult::no_face();
        for i in frames {
            last = session.process(&pulse_frame(i, fps), Some(FACE), i as f64 / fps, logger);
        }
        last
    }

    fn feed(session: &mut VitalsSession, frames: usize) -> VitalsResult {
        feed_at(session, 0..frames, 30.0, &mut NullSessionLogger)
    }

    /// Session whose tracked rate stays exactly at 32 fps when fed frames
    /// spaced 1/32 s apart (both values are exact in binary).
    fn session_at_32_fps() -> VitalsSession {
        let mut config = EstimatorConfig::default();
        config.frame_rate.initial_fps = 32.0;
        VitalsSession::new(&config)
    }

    struct FailingSampler;

    impl RegionSampler for FailingSampler {
        fn sample(&self, frame: &Frame, face: &FaceRegion) -> Result<ColorSample, SamplingError> {
            Err(SamplingError::NoUsableRegion {
                face: *face,
                width: frame.width(),
                height: frame.height(),
            })
        }
    }

    // ── Scenario A: synthetic pulse ───────────────────────────────

    #[test]
    fn test_recovers_injected_pulse() {
        let mut session = VitalsSession::default();
        let result = feed(&mut session, 200);

        assert_eq!(session.state(), SessionState::Estimating);
        assert!((result.bpm - 72.0).abs() <= 3.0, "bpm {}", result.bpm);
        assert!(
            matches!(result.quality, SignalQuality::Good | SignalQuality::Fair),
            "quality {}",
            result.quality
        );
        assert!((85.0..=100.0).contains(&result.spo2));
        assert_eq!(result.respiration_rate, 16.0);
        assert!((0.0..=100.0).contains(&result.lighting));
        assert_eq!(result.roi, Some(FaceRegion::new(16, 6, 32, 12)));
    }

    #[test]
    fn test_estimation_starts_at_six_seconds() {
        let mut session = session_at_32_fps();
        let mut logger = NullSessionLogger;

        feed_at(&mut session, 0..191, 32.0, &mut logger);
        assert_eq!(session.state(), SessionState::Sampling);

        feed_at(&mut session, 191..192, 32.0, &mut logger);
        assert_eq!(session.state(), SessionState::Estimating);
        assert_eq!(session.buffer_len(), 192);
        assert_eq!(session.fps(), 32.0);
    }

    #[test]
    fn test_results_are_rounded() {
        let mut session = VitalsSession::default();
        let result = feed(&mut session, 200);
        for v in [result.bpm, result.spo2, result.snr, result.lighting] {
            assert_relative_eq!(v * 10.0, (v * 10.0).round(), epsilon = 1e-6);
        }
    }

    // ── Scenario B: no face ───────────────────────────────────────

    #[test]
    fn test_no_face_returns_sentinel_and_keeps_buffer() {
        let mut session = VitalsSession::default();
        feed(&mut session, 50);
        let before = session.buffer_len();

        let result = session.process(&pulse_frame(50, 30.0), None, 50.0 / 30.0, &mut NullSessionLogger);

        assert_eq!(result, VitalsResult::no_face());
        assert_eq!(session.buffer_len(), before);
        assert_eq!(session.state(), SessionState::NoFace);
    }

    #[test]
    fn test_no_face_still_tracks_frame_rate() {
        let mut session = VitalsSession::default();
        let mut logger = NullSessionLogger;
        for i in 0..100 {
            session.process(&pulse_frame(i, 15.0), None, i as f64 / 15.0, &mut logger);
        }
        assert!(session.fps() < 16.0);
        assert_eq!(session.buffer_len(), 0);
    }

    // ── Scenario C: below the estimation window ───────────────────

    #[test]
    fn test_sampling_returns_zero_vitals() {
        let mut session = VitalsSession::default();
        let result = feed(&mut session, 60);

        assert_eq!(session.state(), SessionState::Sampling);
        assert_eq!(result.bpm, 0.0);
        assert_eq!(result.spo2, 0.0);
        assert_eq!(result.respiration_rate, 0.0);
        assert_eq!(result.snr, 0.0);
        assert_eq!(result.lighting, 0.0);
        assert_eq!(result.quality, SignalQuality::Poor);
        assert_eq!(result.roi, Some(FACE.forehead()));
        assert_eq!(session.buffer_len(), 60);
    }

    // ── Region errors ─────────────────────────────────────────────

    #[test]
    fn test_roi_error_does_not_push() {
        let mut session =
            VitalsSession::with_sampler(&EstimatorConfig::default(), Box::new(FailingSampler));
        let result = session.process(&pulse_frame(0, 30.0), Some(FACE), 0.0, &mut NullSessionLogger);

        assert_eq!(result.quality, SignalQuality::RoiError);
        assert_eq!(result.bpm, 0.0);
        assert_eq!(result.roi, Some(FACE.forehead()));
        assert_eq!(session.buffer_len(), 0);
    }

    #[test]
    fn test_face_outside_frame_is_roi_error() {
        let mut session = VitalsSession::default();
        let face = FaceRegion::new(1000, 1000, 50, 50);
        let result = session.process(&pulse_frame(0, 30.0), Some(face), 0.0, &mut NullSessionLogger);
        assert_eq!(result.quality, SignalQuality::RoiError);
        assert_eq!(session.buffer_len(), 0);
    }

    #[test]
    fn test_roi_error_updates_state_after_estimating() {
        let mut session = VitalsSession::default();
        feed(&mut session, 200);
        assert_eq!(session.state(), SessionState::Estimating);

        let outside = FaceRegion::new(1000, 1000, 50, 50);
        session.process(&pulse_frame(200, 30.0), Some(outside), 200.0 / 30.0, &mut NullSessionLogger);
        assert_eq!(session.state(), SessionState::RoiError);
        assert_eq!(session.buffer_len(), 200);

        feed_at(&mut session, 201..202, 30.0, &mut NullSessionLogger);
        assert_eq!(session.state(), SessionState::Estimating);
    }

    // ── Buffer bounds ─────────────────────────────────────────────

    #[test]
    fn test_buffer_never_exceeds_capacity() {
        let config = EstimatorConfig {
            buffer_size: 200,
            ..EstimatorConfig::default()
        };
        let mut session = VitalsSession::new(&config);
        let mut logger = NullSessionLogger;
        for i in 0..260 {
            feed_at(&mut session, i..i + 1, 30.0, &mut logger);
            assert!(session.buffer_len() <= 200);
        }
        assert_eq!(session.buffer_len(), 200);
    }

    // ── Smoothing modes ───────────────────────────────────────────

    #[test]
    fn test_kalman_mode_output_lags_toward_estimate() {
        let mut config = EstimatorConfig::default();
        config.smoothing.mode = SmoothingMode::Kalman;
        let mut session = VitalsSession::new(&config);

        let result = feed(&mut session, 200);

        // The Kalman state starts at 0 and converges over ~20 accepted steps.
        assert!(result.bpm > 0.0);
        let hull_max = session.smoother().history().fold(f64::MIN, f64::max);
        assert!(result.bpm <= hull_max + 0.05);
        assert!(session.smoother().kalman().estimate() > 0.0);
    }

    // ── Logging ───────────────────────────────────────────────────

    #[test]
    fn test_records_stage_timings() {
        let mut session = session_at_32_fps();
        let mut logger = StatsSessionLogger::new(1000);
        feed_at(&mut session, 0..200, 32.0, &mut logger);

        assert_eq!(logger.timings_for("sample").unwrap().len(), 200);
        // Buffer lengths 192..=200 reach the estimation window.
        assert_eq!(logger.timings_for("estimate").unwrap().len(), 9);
        assert_eq!(logger.metrics_for("fps").unwrap().len(), 200);
    }
}
