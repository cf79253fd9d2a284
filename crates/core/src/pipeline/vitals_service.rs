use std::time::Instant;

use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::control_message::{ControlMessage, ControlMessageError};
use crate::pipeline::session_config::{ConfigHandle, ConfigUpdate, SessionConfig};
use crate::pipeline::session_logger::SessionLogger;
use crate::pipeline::vitals_result::VitalsResult;
use crate::pipeline::vitals_session::VitalsSession;
use crate::shared::estimator_config::EstimatorConfig;
use crate::video::domain::frame_decoder::FrameDecoder;

/// Per-connection facade: decode → resize → detect → sample → estimate.
///
/// Owns one [`VitalsSession`]. Configuration may be changed from other
/// threads through the [`ConfigHandle`]; everything else requires `&mut`.
pub struct VitalsService {
    decoder: Box<dyn FrameDecoder>,
    detector: Box<dyn FaceDetector>,
    session: VitalsSession,
    config: ConfigHandle,
    applied_config: SessionConfig,
    logger: Box<dyn SessionLogger>,
    max_frame_width: u32,
    frames_decoded: usize,
    clock: Instant,
}

impl VitalsService {
    pub fn new(
        decoder: Box<dyn FrameDecoder>,
        detector: Box<dyn FaceDetector>,
        estimator_config: &EstimatorConfig,
        logger: Box<dyn SessionLogger>,
    ) -> Self {
        Self::with_session(
            decoder,
            detector,
            VitalsSession::new(estimator_config),
            estimator_config.max_frame_width,
            logger,
        )
    }

    pub fn with_session(
        decoder: Box<dyn FrameDecoder>,
        detector: Box<dyn FaceDetector>,
        session: VitalsSession,
        max_frame_width: u32,
        logger: Box<dyn SessionLogger>,
    ) -> Self {
        let config = ConfigHandle::default();
        Self {
            decoder,
            detector,
            session,
            applied_config: config.get(),
            config,
            logger,
            max_frame_width,
            frames_decoded: 0,
            clock: Instant::now(),
        }
    }

    pub fn config_handle(&self) -> ConfigHandle {
        self.config.clone()
    }

    pub fn configure(&self, update: &ConfigUpdate) {
        self.config.configure(update);
    }

    /// Applies a textual control message. Malformed messages leave the
    /// configuration untouched.
    pub fn handle_control_message(&self, text: &str) -> Result<(), ControlMessageError> {
        match ControlMessage::parse(text)? {
            ControlMessage::Configure(update) => self.configure(&update),
        }
        Ok(())
    }

    pub fn session(&self) -> &VitalsSession {
        &self.session
    }

    pub fn logger(&self) -> &dyn SessionLogger {
        self.logger.as_ref()
    }

    pub fn logger_mut(&mut self) -> &mut dyn SessionLogger {
        self.logger.as_mut()
    }

    /// Processes one encoded frame stamped with the service's monotonic clock.
    pub fn process_frame(&mut self, bytes: &[u8]) -> Option<VitalsResult> {
        let now = self.clock.elapsed().as_secs_f64();
        self.process_frame_at(bytes, now)
    }

    /// Processes one encoded frame captured at `timestamp` seconds.
    ///
    /// Returns `None` when the bytes cannot be decoded.
    pub fn process_frame_at(&mut self, bytes: &[u8], timestamp: f64) -> Option<VitalsResult> {
        let t0 = Instant::now();
        let frame = match self.decoder.decode(bytes, self.frames_decoded) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("Skipping frame message: {e}");
                return None;
            }
        };
        self.frames_decoded += 1;
        let frame = frame.limit_width(self.max_frame_width);
        self.logger.timing("decode", elapsed_ms(t0));

        self.refresh_config();

        let t0 = Instant::now();
        let face = match self.detector.detect(&frame) {
            Ok(face) => face,
            Err(e) => {
                log::warn!("Face detection failed on frame {}: {e}", frame.index());
                None
            }
        };
        self.logger.timing("detect", elapsed_ms(t0));

        let result = self
            .session
            .process(&frame, face, timestamp, self.logger.as_mut());
        self.logger.frame(frame.index(), result.quality);
        Some(result)
    }

    fn refresh_config(&mut self) {
        let current = self.config.get();
        if current != self.applied_config {
            self.logger.info(&format!(
                "Session configuration: sensitivity={}, motion_rejection={}",
                current.sensitivity, current.motion_rejection
            ));
            self.applied_config = current;
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
