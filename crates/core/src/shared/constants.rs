/// Frame rate assumed before any inter-frame interval has been observed.
pub const DEFAULT_FPS: f64 = 30.0;

/// Samples retained per channel (~10 seconds at 30 fps).
pub const DEFAULT_BUFFER_SIZE: usize = 300;

/// Decoded frames wider than this are downscaled before sampling.
pub const MAX_FRAME_WIDTH: u32 = 640;

/// Accepted heart-rate estimates kept for smoothing.
pub const HEART_RATE_HISTORY_LEN: usize = 5;

/// Reported by the SpO2 estimator while too few samples exist.
pub const SPO2_PLACEHOLDER: f64 = 98.0;

/// Reported by the respiration estimator while too few samples exist
/// or when its filter cannot be built.
pub const RESPIRATION_PLACEHOLDER: f64 = 16.0;

/// Frame files the CLI picks up from an input directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
