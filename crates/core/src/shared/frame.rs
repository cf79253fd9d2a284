use image::{imageops, ImageBuffer, Rgb};
use ndarray::ArrayView3;

/// A single decoded video frame: contiguous RGB bytes in row-major order.
///
/// Frames are created per incoming message and never retained across
/// processing calls; only the color statistics sampled from them survive.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

pub const RGB_CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * RGB_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// Uniformly colored frame, handy for synthetic input.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Self {
        let pixels = (width as usize) * (height as usize);
        let data = rgb.iter().copied().cycle().take(pixels * RGB_CHANNELS).collect();
        Self::new(data, width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// `(height, width, channel)` view over the pixel data.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Downscales frames wider than `max_width` with area averaging,
    /// preserving the aspect ratio. Narrower frames are returned untouched.
    pub fn limit_width(self, max_width: u32) -> Frame {
        if max_width == 0 || self.width <= max_width {
            return self;
        }
        let scale = max_width as f64 / self.width as f64;
        let new_height = ((self.height as f64 * scale) as u32).max(1);

        let Some(view) =
            ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(self.width, self.height, &self.data[..])
        else {
            return self;
        };
        let resized = imageops::thumbnail(&view, max_width, new_height);
        Frame::new(resized.into_raw(), max_width, new_height, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, RGB_CHANNELS)
    }
}
