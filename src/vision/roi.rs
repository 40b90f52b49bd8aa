use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Margin in pixels kept from the top and right edges of the frame
pub const ROI_MARGIN: u32 = 10;

/// Border color drawn around the hand area
pub const ROI_BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Rectangle of the frame treated as the hand-sign area.
///
/// `left..right` columns by `top..bottom` rows, always inside the frame it
/// was computed for. It may have zero area for very small frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Roi {
    /// Fixed geometry for a `width`×`height` frame: the right half, from the
    /// top margin down to row `width / 2`.
    ///
    /// The bottom edge follows the frame *width*, not its height. Edges are
    /// clamped to the frame the way array slicing would clamp them.
    pub fn for_frame(width: u32, height: u32) -> Self {
        let half_width = width / 2;

        let left = half_width;
        let right = width.saturating_sub(ROI_MARGIN).max(left);
        let top = ROI_MARGIN.min(height);
        let bottom = half_width.min(height).max(top);

        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Copy the region out of `frame`
    pub fn extract(&self, frame: &RgbImage) -> RgbImage {
        imageops::crop_imm(frame, self.left, self.top, self.width(), self.height()).to_image()
    }

    /// Draw a two pixel border just outside the region
    pub fn draw_border(&self, frame: &mut RgbImage) {
        for inset in 1..=2i32 {
            let x = self.left as i32 - inset;
            let y = self.top as i32 - inset;
            let w = self.width() + 2 * inset as u32;
            let h = self.height() + 2 * inset as u32;
            draw_hollow_rect_mut(frame, Rect::at(x, y).of_size(w, h), ROI_BORDER_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webcam_geometry() {
        let roi = Roi::for_frame(640, 480);
        assert_eq!(
            roi,
            Roi {
                left: 320,
                top: 10,
                right: 630,
                bottom: 320,
            }
        );
    }

    #[test]
    fn bottom_tracks_width_not_height() {
        // Same height, different widths: the bottom edge moves with the width
        assert_eq!(Roi::for_frame(400, 480).bottom, 200);
        assert_eq!(Roi::for_frame(600, 480).bottom, 300);
    }

    #[test]
    fn wide_frames_clamp_to_height() {
        let roi = Roi::for_frame(1920, 200);
        assert_eq!(roi.bottom, 200);
    }

    #[test]
    fn always_inside_the_frame() {
        for width in (21..400).step_by(7) {
            for height in (21..400).step_by(11) {
                let roi = Roi::for_frame(width, height);
                assert!(roi.left <= roi.right && roi.right <= width);
                assert!(roi.top <= roi.bottom && roi.bottom <= height);

                let frame = RgbImage::new(width, height);
                let crop = roi.extract(&frame);
                assert_eq!(crop.dimensions(), (roi.width(), roi.height()));
            }
        }
    }

    #[test]
    fn tiny_frames_are_degenerate_not_errors() {
        let roi = Roi::for_frame(4, 4);
        assert!(roi.is_empty());
        assert_eq!(roi.extract(&RgbImage::new(4, 4)).dimensions().0, 0);
    }

    #[test]
    fn border_is_drawn_outside_the_region() {
        let mut frame = RgbImage::new(100, 80);
        let roi = Roi::for_frame(100, 80);
        roi.draw_border(&mut frame);
        assert_eq!(*frame.get_pixel(roi.left - 1, roi.top + 5), ROI_BORDER_COLOR);
        assert_eq!(*frame.get_pixel(roi.left + 5, roi.top + 5), Rgb([0, 0, 0]));
    }
}
