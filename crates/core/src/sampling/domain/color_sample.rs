/// Spatially fused color means of one frame plus their luminance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorSample {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub luminance: f64,
}

impl ColorSample {
    /// Builds a sample from RGB means, deriving Rec. 601 luma.
    pub fn from_rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            luminance: 0.299 * red + 0.587 * green + 0.114 * blue,
        }
    }
}
