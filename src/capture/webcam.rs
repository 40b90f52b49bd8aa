use super::{CaptureError, CaptureSource};
use image::{imageops, RgbImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

pub struct WebcamCapture {
    camera: Option<Camera>,
    width: u32,
    height: u32,
    mirror: bool,
}

impl WebcamCapture {
    /// Open and start streaming from camera `device_index`.
    ///
    /// With `mirror` set, frames are flipped horizontally so the preview
    /// behaves like a mirror.
    pub fn new(device_index: u32, mirror: bool) -> Result<Self, CaptureError> {
        tracing::info!("Initializing webcam {}", device_index);

        let index = CameraIndex::Index(device_index);
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);

        let mut camera = Camera::new(index, requested)
            .map_err(|e| CaptureError::Open(format!("camera {device_index}: {e}")))?;

        camera
            .open_stream()
            .map_err(|e| CaptureError::Open(format!("camera {device_index} stream: {e}")))?;

        let resolution = camera.resolution();
        let (width, height) = (resolution.width(), resolution.height());

        tracing::info!("Webcam initialized at {}x{}", width, height);

        Ok(Self {
            camera: Some(camera),
            width,
            height,
            mirror,
        })
    }
}

impl CaptureSource for WebcamCapture {
    fn capture_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let camera = self
            .camera
            .as_mut()
            .ok_or_else(|| CaptureError::Read("camera already released".to_string()))?;

        let frame = camera
            .frame()
            .map_err(|e| CaptureError::Read(e.to_string()))?;

        let mut decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Read(format!("decode: {e}")))?;

        if self.mirror {
            imageops::flip_horizontal_in_place(&mut decoded);
        }

        Ok(decoded)
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            tracing::info!("Releasing webcam");
            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Failed to stop camera stream: {}", e);
            }
        }
    }
}

impl Drop for WebcamCapture {
    fn drop(&mut self) {
        self.release();
    }
}
