use crate::shared::frame::Frame;
use crate::video::domain::frame_decoder::{DecodeError, FrameDecoder};

/// Decodes any format enabled in the `image` crate (PNG, JPEG, ...) and
/// converts it to 8-bit RGB.
#[derive(Default)]
pub struct ImageFrameDecoder;

impl ImageFrameDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for ImageFrameDecoder {
    fn decode(&self, bytes: &[u8], index: usize) -> Result<Frame, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let rgb = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::Codec(e.to_string()))?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Frame::new(rgb.into_raw(), width, height, index))
    }
}
