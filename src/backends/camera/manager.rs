// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend lifecycle manager
//!
//! The manager provides:
//! - A single live [`CameraHandle`] for the whole process
//! - Thread-safe access to the acquisition backend
//! - The preview/encoder ownership hand-off through [`EncoderLease`]

use super::types::*;
use super::{CameraBackend, CameraDevice};
use crate::errors::CaptureError;
use crate::request::{CameraType, FlashMode, Orientation};
use futures::channel::oneshot;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Exclusive logical ownership token for an opened camera
///
/// Clones share the same ownership state; there is only ever one underlying
/// device per handle.
#[derive(Clone)]
pub struct CameraHandle {
    camera: CameraType,
    device: Arc<dyn CameraDevice>,
    ownership: Arc<Mutex<Ownership>>,
}

impl CameraHandle {
    fn new(camera: CameraType, device: Arc<dyn CameraDevice>) -> Self {
        Self {
            camera,
            device,
            ownership: Arc::new(Mutex::new(Ownership::Preview)),
        }
    }

    pub fn camera(&self) -> CameraType {
        self.camera
    }

    pub fn ownership(&self) -> Ownership {
        *self.ownership_guard()
    }

    /// True when preview owns the device and a still capture may run
    pub fn is_preview_usable(&self) -> bool {
        self.ownership() == Ownership::Preview
    }

    pub fn supported_flash_modes(&self) -> Vec<FlashMode> {
        self.device.supported_flash_modes()
    }

    /// Capture a single frame and restart the preview as soon as it arrives
    ///
    /// The handle stays with preview for the whole capture.
    pub async fn take_picture(&self) -> Result<Vec<u8>, CaptureError> {
        if !self.is_preview_usable() {
            return Err(CaptureError::CameraBusy(format!(
                "{} camera is owned by the recorder",
                self.camera
            )));
        }

        let (sender, receiver) = oneshot::channel();
        let device = Arc::clone(&self.device);
        self.device.take_picture(Box::new(move |data| {
            device.stop_preview();
            device.start_preview();
            let _ = sender.send(data);
        }));

        let data = receiver
            .await
            .map_err(|_| crate::errors::PhotoError::NoFrameAvailable)?;
        debug!(camera = %self.camera, size = data.len(), "Frame received");
        Ok(data)
    }

    /// Hand the device to a media encoder
    ///
    /// Preview must not touch the device until the returned lease is given
    /// back or dropped.
    pub fn hand_to_encoder(&self) -> Result<EncoderLease, CaptureError> {
        let mut ownership = self.ownership_guard();
        if *ownership == Ownership::Encoder {
            return Err(CaptureError::CameraBusy(format!(
                "{} camera is already owned by the recorder",
                self.camera
            )));
        }

        self.device.unlock()?;
        *ownership = Ownership::Encoder;
        debug!(camera = %self.camera, "Camera handed to encoder");

        Ok(EncoderLease {
            handle: self.clone(),
            returned: false,
        })
    }

    fn ownership_guard(&self) -> MutexGuard<'_, Ownership> {
        self.ownership.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraHandle")
            .field("camera", &self.camera)
            .field("ownership", &self.ownership())
            .finish()
    }
}

/// Proof that a media encoder owns the camera
///
/// Giving it back (or dropping it) locks the device again and returns
/// ownership to preview.
pub struct EncoderLease {
    handle: CameraHandle,
    returned: bool,
}

impl EncoderLease {
    /// Device to attach to the encoder
    pub fn device(&self) -> Arc<dyn CameraDevice> {
        Arc::clone(&self.handle.device)
    }

    pub fn camera(&self) -> CameraType {
        self.handle.camera
    }

    /// Return the camera to preview ownership
    pub fn give_back(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.returned {
            return;
        }
        self.returned = true;

        if let Err(e) = self.handle.device.lock() {
            error!(camera = %self.handle.camera, error = %e, "Failed to lock camera after recording");
        }
        *self.handle.ownership_guard() = Ownership::Preview;
        debug!(camera = %self.handle.camera, "Camera returned to preview");
    }
}

impl Drop for EncoderLease {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Internal manager state
struct ManagerState {
    /// The acquisition backend
    backend: Box<dyn CameraBackend>,
    /// The one live handle, if any camera is open
    active: Option<CameraHandle>,
}

/// Camera backend manager
///
/// Owns the acquisition backend and the single live camera handle.
/// Thread-safe and can be shared across threads.
#[derive(Clone)]
pub struct CameraManager {
    state: Arc<Mutex<ManagerState>>,
}

impl CameraManager {
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManagerState {
                backend,
                active: None,
            })),
        }
    }

    /// Acquire the handle for `camera`
    ///
    /// Returns the live handle when it already belongs to `camera`. Switching
    /// to the other camera closes the current one first, which is refused
    /// while the encoder owns it.
    pub fn acquire(&self, camera: CameraType) -> Result<CameraHandle, CaptureError> {
        let mut state = self.lock_state();

        if let Some(active) = state.active.clone() {
            if active.camera() == camera {
                return Ok(active);
            }
            if active.ownership() == Ownership::Encoder {
                warn!(active = %active.camera(), requested = %camera, "Camera switch refused while recording");
                return Err(CaptureError::CameraBusy(format!(
                    "{} camera is recording",
                    active.camera()
                )));
            }

            info!(from = %active.camera(), to = %camera, "Switching camera");
            state.backend.close(active.camera());
            state.active = None;
        }

        let Some(device) = state.backend.open(camera) else {
            error!(camera = %camera, "No camera found");
            return Err(CaptureError::NoCamera);
        };

        info!(camera = %camera, "Camera opened");
        let handle = CameraHandle::new(camera, device);
        state.active = Some(handle.clone());
        Ok(handle)
    }

    /// The live handle, if a camera is open
    pub fn active(&self) -> Option<CameraHandle> {
        self.lock_state().active.clone()
    }

    pub fn set_quality(&self, camera: CameraType, quality: &str) {
        debug!(camera = %camera, quality, "Applying capture quality");
        self.lock_state().backend.set_capture_quality(camera, quality);
    }

    pub fn adjust_rotation(&self, camera: CameraType, orientation: Orientation) {
        debug!(camera = %camera, ?orientation, "Adjusting camera rotation");
        self.lock_state().backend.adjust_rotation(camera, orientation);
    }

    /// Close the open camera, if it is not recording
    pub fn release(&self) -> Result<(), CaptureError> {
        let mut state = self.lock_state();
        let Some(active) = state.active.clone() else {
            return Ok(());
        };
        if active.ownership() == Ownership::Encoder {
            return Err(CaptureError::CameraBusy(format!(
                "{} camera is recording",
                active.camera()
            )));
        }
        state.backend.close(active.camera());
        state.active = None;
        info!(camera = %active.camera(), "Camera released");
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CameraManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("CameraManager")
            .field("active", &state.active)
            .finish()
    }
}
