// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  CaptureDispatcher  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    CameraManager    │  ← single live CameraHandle, ownership hand-off
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← acquisition, quality, rotation
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraDevice Trait │  ← picture, preview, lock/unlock
//! └─────────────────────┘
//! ```

pub mod manager;
pub mod types;

pub use manager::{CameraHandle, CameraManager, EncoderLease};
pub use types::*;

use crate::request::{CameraType, FlashMode, Orientation};
use std::sync::Arc;

/// Camera acquisition subsystem
///
/// Opens physical devices and applies per-camera configuration. Calls are
/// serialized by [`CameraManager`].
pub trait CameraBackend: Send {
    /// Open the device for `camera`, or `None` if there is no such camera
    fn open(&mut self, camera: CameraType) -> Option<Arc<dyn CameraDevice>>;

    /// Close a previously opened device
    fn close(&mut self, camera: CameraType);

    /// Apply a capture quality tier to the camera configuration
    ///
    /// Unknown tiers are left to the backend to ignore.
    fn set_capture_quality(&mut self, camera: CameraType, quality: &str);

    /// Correct the camera rotation for the given device orientation
    fn adjust_rotation(&mut self, camera: CameraType, orientation: Orientation);
}

/// An opened camera device
///
/// Callbacks may run on threads owned by the platform.
pub trait CameraDevice: Send + Sync {
    /// Capture one frame; `on_picture` runs exactly once with the raw bytes
    fn take_picture(&self, on_picture: PictureCallback);

    fn start_preview(&self);

    fn stop_preview(&self);

    /// Release the device so a media encoder can drive it
    fn unlock(&self) -> BackendResult<()>;

    /// Take the device back from the media encoder
    fn lock(&self) -> BackendResult<()>;

    /// Flash modes the device supports (empty when it has no flash)
    fn supported_flash_modes(&self) -> Vec<FlashMode>;
}
