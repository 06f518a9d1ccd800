//! Frame capture — from a real webcam or a synthetic backdrop.
//!
//! Consumers only see [`FrameSource`]; whether frames come from `nokhwa` or
//! from [`SimFrameSource`] is decided once at startup.

use crate::error::CaptureError;

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// One video frame, packed `0x00RRGGBB` row-major (the layout `minifb` takes).
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Frame { width, height, pixels: vec![color; width * height] }
    }

    /// Pack an RGB24 buffer.  Returns `None` if `rgb` is not exactly
    /// `width * height * 3` bytes.
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != width * height * 3 {
            return None;
        }
        let pixels = rgb
            .chunks_exact(3)
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
            .collect();
        Some(Frame { width, height, pixels })
    }

    /// Unpack to RGB24, the layout the hand detector expects.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            out.push(((p >> 16) & 0xFF) as u8);
            out.push(((p >>  8) & 0xFF) as u8);
            out.push(( p        & 0xFF) as u8);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that yields video frames.  A returned error ends the run.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — synthetic backdrop (always available)
// ════════════════════════════════════════════════════════════════════════════

const SIM_TOP:    u32 = 0x1A1A2E;
const SIM_BOTTOM: u32 = 0x0F3460;

/// Frame source for simulation mode: a static vertical gradient.
///
/// The frame is rendered once and cloned per call; it never fails.
pub struct SimFrameSource {
    backdrop: Frame,
}

impl SimFrameSource {
    pub fn new(width: usize, height: usize) -> Self {
        let mut backdrop = Frame::filled(width, height, SIM_TOP);
        for y in 0..height {
            let t = if height > 1 { y as f32 / (height - 1) as f32 } else { 0.0 };
            let row = lerp_rgb(SIM_TOP, SIM_BOTTOM, t);
            backdrop.pixels[y * width..(y + 1) * width].fill(row);
        }
        SimFrameSource { backdrop }
    }
}

impl FrameSource for SimFrameSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        Ok(self.backdrop.clone())
    }
}

fn lerp_rgb(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let ch = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        ((ca * (1.0 - t) + cb * t).round() as u32) << shift
    };
    ch(16) | ch(8) | ch(0)
}

// ════════════════════════════════════════════════════════════════════════════
// CameraSource — real webcam (feature = "camera")
// ════════════════════════════════════════════════════════════════════════════

/// Webcam frame source backed by `nokhwa`.
///
/// Requires the `camera` feature and a native capture backend
/// (V4L2 / AVFoundation / Media Foundation).
#[cfg(feature = "camera")]
pub struct CameraSource {
    camera: nokhwa::Camera,
}

#[cfg(feature = "camera")]
impl CameraSource {
    /// Open camera `index`, asking for the format closest to
    /// `width`×`height`, and start streaming.
    pub fn open(index: u32, width: usize, height: usize) -> Result<Self, CaptureError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat,
                            RequestedFormatType, Resolution};

        let open_err = |e: nokhwa::NokhwaError| CaptureError::Open { index, reason: e.to_string() };

        let wanted = CameraFormat::new(
            Resolution::new(width as u32, height as u32),
            FrameFormat::MJPEG,
            30,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(wanted));

        let mut camera = nokhwa::Camera::new(CameraIndex::Index(index), requested)
            .map_err(open_err)?;
        camera.open_stream().map_err(open_err)?;

        let res = camera.resolution();
        tracing::info!(
            index,
            width = res.width(),
            height = res.height(),
            "camera stream opened"
        );
        Ok(CameraSource { camera })
    }
}

#[cfg(feature = "camera")]
impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Decode(e.to_string()))?;

        let (w, h) = (image.width() as usize, image.height() as usize);
        Frame::from_rgb(w, h, image.as_raw())
            .ok_or_else(|| CaptureError::Decode(format!("short RGB buffer for {w}x{h} frame")))
    }
}

#[cfg(feature = "camera")]
impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!("failed to stop camera stream: {e}");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
