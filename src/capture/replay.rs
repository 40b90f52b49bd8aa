use super::{CaptureError, CaptureSource};
use image::{imageops, ImageReader, RgbImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Plays back still images from a directory, in file name order.
///
/// Stands in for a webcam when running without a camera attached.
pub struct ReplayCapture {
    pending: VecDeque<PathBuf>,
    width: u32,
    height: u32,
    mirror: bool,
}

impl ReplayCapture {
    pub fn open<P: AsRef<Path>>(dir: P, mirror: bool) -> Result<Self, CaptureError> {
        let dir = dir.as_ref();
        tracing::info!("Replaying frames from {}", dir.display());

        let entries = std::fs::read_dir(dir)
            .map_err(|e| CaptureError::Open(format!("{}: {e}", dir.display())))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(CaptureError::Open(format!(
                "no images found in {}",
                dir.display()
            )));
        }

        tracing::info!("Found {} frames to replay", files.len());

        Ok(Self {
            pending: files.into(),
            width: 0,
            height: 0,
            mirror,
        })
    }

    /// Frames not yet played
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl CaptureSource for ReplayCapture {
    fn capture_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let path = self.pending.pop_front().ok_or(CaptureError::Exhausted)?;

        let decoded = ImageReader::open(&path)
            .map_err(|e| CaptureError::Read(format!("{}: {e}", path.display())))?
            .decode()
            .map_err(|e| CaptureError::Read(format!("{}: {e}", path.display())))?;

        let mut frame = decoded.to_rgb8();
        if self.mirror {
            imageops::flip_horizontal_in_place(&mut frame);
        }

        (self.width, self.height) = frame.dimensions();
        Ok(frame)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn plays_images_in_name_order_then_ends() {
        let dir = tempfile::tempdir().expect("tempdir");
        RgbImage::from_pixel(8, 4, Rgb([10, 0, 0]))
            .save(dir.path().join("b.png"))
            .expect("save");
        RgbImage::from_pixel(6, 6, Rgb([20, 0, 0]))
            .save(dir.path().join("a.png"))
            .expect("save");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let mut replay = ReplayCapture::open(dir.path(), false).expect("open");
        assert_eq!(replay.remaining(), 2);

        let first = replay.capture_frame().expect("first");
        assert_eq!(first.dimensions(), (6, 6));
        assert_eq!(replay.resolution(), (6, 6));

        let second = replay.capture_frame().expect("second");
        assert_eq!(second.dimensions(), (8, 4));

        assert!(matches!(replay.capture_frame(), Err(CaptureError::Exhausted)));
    }

    #[test]
    fn mirror_flips_columns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.save(dir.path().join("frame.png")).expect("save");

        let mut replay = ReplayCapture::open(dir.path(), true).expect("open");
        let frame = replay.capture_frame().expect("frame");
        assert_eq!(*frame.get_pixel(1, 0), Rgb([255, 0, 0]));
    }

    #[test]
    fn corrupt_file_is_a_transient_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("broken.jpg"), b"nope").expect("write");

        let mut replay = ReplayCapture::open(dir.path(), false).expect("open");
        assert!(matches!(replay.capture_frame(), Err(CaptureError::Read(_))));
    }

    #[test]
    fn empty_directory_fails_to_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            ReplayCapture::open(dir.path(), false),
            Err(CaptureError::Open(_))
        ));
    }
}
