// SPDX-License-Identifier: GPL-3.0-only

//! Test-pattern cameras

use crate::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraDevice, PictureCallback,
};
use crate::pipelines::photo::{EncodingQuality, encode_jpeg};
use crate::request::{CameraType, FlashMode, Orientation};
use image::{Rgb, RgbImage, imageops};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::{debug, error, info, warn};

/// Test pattern resolution before rotation
const FRAME_WIDTH: u32 = 320;
const FRAME_HEIGHT: u32 = 240;

#[derive(Debug, Clone, Copy)]
struct FrameSettings {
    quality: EncodingQuality,
    rotation: Orientation,
}

/// A camera that renders a gradient test pattern
///
/// Frames are delivered on a dedicated thread, the way hardware picture
/// callbacks arrive.
pub struct VirtualCamera {
    camera: CameraType,
    settings: Mutex<FrameSettings>,
    previewing: AtomicBool,
    unlocked: AtomicBool,
    preview_starts: AtomicUsize,
}

impl VirtualCamera {
    pub fn new(camera: CameraType) -> Self {
        Self {
            camera,
            settings: Mutex::new(FrameSettings {
                quality: EncodingQuality::default(),
                rotation: Orientation::Portrait,
            }),
            previewing: AtomicBool::new(false),
            unlocked: AtomicBool::new(false),
            preview_starts: AtomicUsize::new(0),
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing.load(Ordering::SeqCst)
    }

    /// True while a media encoder drives the device
    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    /// Number of `start_preview` calls since the camera was opened
    pub fn preview_starts(&self) -> usize {
        self.preview_starts.load(Ordering::SeqCst)
    }

    pub fn quality(&self) -> EncodingQuality {
        self.frame_settings().quality
    }

    pub fn rotation(&self) -> Orientation {
        self.frame_settings().rotation
    }

    fn set_quality(&self, quality: EncodingQuality) {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .quality = quality;
    }

    fn set_rotation(&self, rotation: Orientation) {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rotation = rotation;
    }

    fn frame_settings(&self) -> FrameSettings {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CameraDevice for VirtualCamera {
    fn take_picture(&self, on_picture: PictureCallback) {
        let camera = self.camera;
        let settings = self.frame_settings();

        let spawned = thread::Builder::new()
            .name(format!("{}-shutter", camera))
            .spawn(move || {
                let frame = render_test_pattern(camera, settings.rotation);
                match encode_jpeg(&frame, settings.quality) {
                    Ok(data) => on_picture(data),
                    Err(e) => error!(camera = %camera, error = %e, "Failed to render frame"),
                }
            });

        if let Err(e) = spawned {
            error!(camera = %camera, error = %e, "Failed to spawn shutter thread");
        }
    }

    fn start_preview(&self) {
        self.previewing.store(true, Ordering::SeqCst);
        self.preview_starts.fetch_add(1, Ordering::SeqCst);
        debug!(camera = %self.camera, "Preview started");
    }

    fn stop_preview(&self) {
        self.previewing.store(false, Ordering::SeqCst);
        debug!(camera = %self.camera, "Preview stopped");
    }

    fn unlock(&self) -> BackendResult<()> {
        if self.unlocked.swap(true, Ordering::SeqCst) {
            return Err(BackendError::LockFailed(format!(
                "{} camera is already unlocked",
                self.camera
            )));
        }
        Ok(())
    }

    fn lock(&self) -> BackendResult<()> {
        if !self.unlocked.swap(false, Ordering::SeqCst) {
            return Err(BackendError::LockFailed(format!(
                "{} camera is not unlocked",
                self.camera
            )));
        }
        Ok(())
    }

    fn supported_flash_modes(&self) -> Vec<FlashMode> {
        match self.camera {
            CameraType::Back => vec![
                FlashMode::Off,
                FlashMode::On,
                FlashMode::Auto,
                FlashMode::Torch,
            ],
            CameraType::Front => Vec::new(),
        }
    }
}

/// Gradient tinted per camera, rotated to the requested orientation
fn render_test_pattern(camera: CameraType, rotation: Orientation) -> RgbImage {
    let tint = match camera {
        CameraType::Front => [40u8, 160, 220],
        CameraType::Back => [220, 120, 40],
    };

    let frame = RgbImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |x, y| {
        let fx = (x * 255 / FRAME_WIDTH) as u16;
        let fy = (y * 255 / FRAME_HEIGHT) as u16;
        Rgb([
            ((tint[0] as u16 + fx) / 2) as u8,
            ((tint[1] as u16 + fy) / 2) as u8,
            tint[2],
        ])
    });

    match rotation.degrees() {
        Some(90) => imageops::rotate90(&frame),
        Some(180) => imageops::rotate180(&frame),
        Some(270) => imageops::rotate270(&frame),
        _ => frame,
    }
}

/// Acquisition backend serving a fixed set of virtual cameras
pub struct VirtualBackend {
    available: Vec<CameraType>,
    open: HashMap<CameraType, Arc<VirtualCamera>>,
}

impl VirtualBackend {
    /// Front and back cameras
    pub fn new() -> Self {
        Self::with_cameras(&[CameraType::Front, CameraType::Back])
    }

    pub fn with_cameras(cameras: &[CameraType]) -> Self {
        Self {
            available: cameras.to_vec(),
            open: HashMap::new(),
        }
    }

    /// The open device for `camera`, for inspection
    pub fn device(&self, camera: CameraType) -> Option<Arc<VirtualCamera>> {
        self.open.get(&camera).cloned()
    }
}

impl Default for VirtualBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for VirtualBackend {
    fn open(&mut self, camera: CameraType) -> Option<Arc<dyn CameraDevice>> {
        if !self.available.contains(&camera) {
            warn!(camera = %camera, "No virtual camera for selector");
            return None;
        }

        let device = self
            .open
            .entry(camera)
            .or_insert_with(|| Arc::new(VirtualCamera::new(camera)))
            .clone();
        device.start_preview();
        info!(camera = %camera, "Virtual camera opened");
        Some(device)
    }

    fn close(&mut self, camera: CameraType) {
        if let Some(device) = self.open.remove(&camera) {
            device.stop_preview();
            info!(camera = %camera, "Virtual camera closed");
        }
    }

    fn set_capture_quality(&mut self, camera: CameraType, quality: &str) {
        let Some(device) = self.open.get(&camera) else {
            return;
        };
        match EncodingQuality::from_capture_quality(quality) {
            Some(encoding) => device.set_quality(encoding),
            None => debug!(camera = %camera, quality, "Ignoring unknown capture quality"),
        }
    }

    fn adjust_rotation(&mut self, camera: CameraType, orientation: Orientation) {
        if let Some(device) = self.open.get(&camera) {
            // Auto never reaches the backend; keep the previous rotation if it does
            if orientation != Orientation::Auto {
                device.set_rotation(orientation);
            }
        }
    }
}
