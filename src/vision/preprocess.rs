use image::{imageops, GrayImage, Luma, RgbImage};
use ndarray::Array2;

/// Side length of the square classifier input
pub const SAMPLE_SIZE: u32 = 64;

/// Intensities at or above this value become white
pub const BINARY_THRESHOLD: u8 = 120;

/// Binarized, unit-range classifier input of `SAMPLE_SIZE`×`SAMPLE_SIZE`
/// rows × columns, one channel.
pub type Sample = Array2<f32>;

/// Converts hand-area crops into classifier samples
#[derive(Debug, Clone)]
pub struct Preprocessor {
    size: u32,
    threshold: u8,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(SAMPLE_SIZE, BINARY_THRESHOLD)
    }
}

impl Preprocessor {
    pub fn new(size: u32, threshold: u8) -> Self {
        Self { size, threshold }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Resize, reduce to intensity and threshold a crop.
    ///
    /// Pixels are either 0 or 255. An empty crop gives an all-black image.
    pub fn binarize(&self, roi: &RgbImage) -> GrayImage {
        let _span = tracing::debug_span!("binarize").entered();

        if roi.width() == 0 || roi.height() == 0 {
            return GrayImage::new(self.size, self.size);
        }

        let resized = if roi.dimensions() != (self.size, self.size) {
            imageops::resize(roi, self.size, self.size, imageops::FilterType::Triangle)
        } else {
            roi.clone()
        };

        GrayImage::from_fn(self.size, self.size, |x, y| {
            let pixel = resized.get_pixel(x, y);
            let intensity = luma(pixel[0], pixel[1], pixel[2]);
            if intensity >= self.threshold {
                Luma([u8::MAX])
            } else {
                Luma([0])
            }
        })
    }

    /// Full pipeline: [`binarize`](Self::binarize) then scale to [0, 1]
    pub fn preprocess(&self, roi: &RgbImage) -> Sample {
        let binary = self.binarize(roi);
        Self::normalize(&binary)
    }

    /// Scale an 8-bit single channel image to [0, 1]
    pub fn normalize(image: &GrayImage) -> Sample {
        let (width, height) = image.dimensions();
        Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            image.get_pixel(col as u32, row as u32)[0] as f32 / u8::MAX as f32
        })
    }

    /// Render a sample back to RGB for display
    pub fn sample_to_rgb(sample: &GrayImage) -> RgbImage {
        RgbImage::from_fn(sample.width(), sample.height(), |x, y| {
            let value = sample.get_pixel(x, y)[0];
            image::Rgb([value, value, value])
        })
    }
}

/// ITU-R BT.601 luma, rounded
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn output_is_square_single_channel_and_unit_range() {
        let pre = Preprocessor::default();
        for (w, h) in [(310, 310), (17, 90), (64, 64), (1, 1)] {
            let sample = pre.preprocess(&gradient(w, h));
            assert_eq!(sample.dim(), (64, 64));
            assert!(sample.iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }

    #[test]
    fn deterministic() {
        let pre = Preprocessor::default();
        let roi = gradient(200, 150);
        let a = pre.preprocess(&roi);
        let b = pre.preprocess(&roi);
        assert!(a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn threshold_is_inclusive() {
        let pre = Preprocessor::default();
        let at = RgbImage::from_pixel(64, 64, Rgb([120, 120, 120]));
        let below = RgbImage::from_pixel(64, 64, Rgb([119, 119, 119]));
        assert!(pre.preprocess(&at).iter().all(|&v| v == 1.0));
        assert!(pre.preprocess(&below).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn luma_weights_green_most() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(255, 0, 0), 76);
    }

    #[test]
    fn empty_crop_is_black() {
        let pre = Preprocessor::default();
        let sample = pre.preprocess(&RgbImage::new(0, 0));
        assert_eq!(sample.dim(), (64, 64));
        assert!(sample.iter().all(|&v| v == 0.0));
    }
}
