//! Overlay text rendered from an embedded TrueType face.

use super::OutputError;
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

const FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Heading size, in pixels
pub const TITLE_SIZE: f32 = 26.0;
/// Panel rows and hints
pub const BODY_SIZE: f32 = 18.0;
pub const SMALL_SIZE: f32 = 13.0;

/// The overlay typeface; cheap to construct, it borrows the embedded bytes
#[derive(Clone)]
pub struct Typeface {
    font: FontRef<'static>,
}

impl Typeface {
    pub fn embedded() -> Result<Self, OutputError> {
        let font = FontRef::try_from_slice(FONT_DATA)
            .map_err(|e| OutputError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Draw `text` with its top-left corner at (`x`, `y`), clipped to the image
    pub fn draw(&self, image: &mut RgbImage, text: &str, x: i32, y: i32, size: f32, color: Rgb<u8>) {
        draw_text_mut(image, color, x, y, PxScale::from(size), &self.font, text);
    }

    /// Width and height in pixels of `text` at `size`
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn typeface() -> Typeface {
        Typeface::embedded().expect("embedded font parses")
    }

    fn lit(image: &RgbImage) -> Vec<(u32, u32)> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [0, 0, 0])
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn text_stays_near_its_measured_box() {
        let face = typeface();
        let mut image = RgbImage::new(200, 60);
        face.draw(&mut image, "1. ZERO: 70.0%", 10, 10, BODY_SIZE, WHITE);

        let (w, h) = face.measure("1. ZERO: 70.0%", BODY_SIZE);
        let pixels = lit(&image);
        assert!(!pixels.is_empty());
        assert!(pixels
            .iter()
            .all(|&(x, y)| x + 2 >= 10 && x <= 14 + w && y + 2 >= 10 && y <= 14 + h));
    }

    #[test]
    fn larger_sizes_measure_larger() {
        let face = typeface();
        let (small_w, small_h) = face.measure("MODE: DIGITS", SMALL_SIZE);
        let (title_w, title_h) = face.measure("MODE: DIGITS", TITLE_SIZE);
        assert!(title_w > small_w);
        assert!(title_h > small_h);
    }

    #[test]
    fn clipping_does_not_panic() {
        let mut image = RgbImage::new(20, 10);
        typeface().draw(&mut image, "Creer Dossier", 15, 5, TITLE_SIZE, WHITE);
        typeface().draw(&mut image, "Jeu", -30, -30, TITLE_SIZE, WHITE);
    }
}
