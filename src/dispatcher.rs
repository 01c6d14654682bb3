// SPDX-License-Identifier: GPL-3.0-only

//! Capture dispatcher
//!
//! The single entry point for capture requests. For each request it:
//!
//! 1. fails fast if a recording is active;
//! 2. resolves the device orientation, from the request, the configured
//!    default, or one sensor reading;
//! 3. acquires the camera handle and checks again that no recording started;
//! 4. plays the shutter sound, applies quality and rotation;
//! 5. routes to the still pipeline or the video recorder.

use crate::backends::Platform;
use crate::backends::camera::{CameraHandle, CameraManager};
use crate::backends::media::ShutterSound;
use crate::config::Config;
use crate::constants;
use crate::errors::{CaptureError, RecordingError};
use crate::orientation::OrientationResolver;
use crate::pipelines::photo::StillCapture;
use crate::pipelines::video::{RecorderPhase, RecordingLimits, VideoRecorder};
use crate::request::{
    CameraType, CaptureMode, CaptureOptions, CaptureOutput, CaptureRequest, Orientation,
};
use crate::storage::StorageLocations;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Owns the camera, the recorder and the pipelines for one process
pub struct CaptureDispatcher {
    config: Config,
    cameras: CameraManager,
    orientation: OrientationResolver,
    shutter: Arc<dyn ShutterSound>,
    still: StillCapture,
    recorder: Arc<VideoRecorder>,
}

impl CaptureDispatcher {
    pub fn new(config: Config, platform: Platform) -> Self {
        let storage = StorageLocations::from_config(&config);
        let recorder = VideoRecorder::new(
            storage.clone(),
            platform.encoders,
            RecordingLimits::from_config(&config),
            config.record_audio,
        );

        Self {
            cameras: CameraManager::new(platform.cameras),
            orientation: OrientationResolver::new(platform.sensor),
            shutter: platform.shutter,
            still: StillCapture::new(storage, platform.gallery),
            recorder,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cameras(&self) -> &CameraManager {
        &self.cameras
    }

    pub fn recorder_phase(&self) -> RecorderPhase {
        self.recorder.phase()
    }

    /// Convert bridge options and capture
    pub async fn capture_options(
        &self,
        options: CaptureOptions,
    ) -> Result<CaptureOutput, CaptureError> {
        let request = CaptureRequest::try_from(options).inspect_err(|e| {
            error!(error = %e, "Rejected capture options");
        })?;
        self.capture(request).await
    }

    /// Run one capture request to completion
    ///
    /// Video requests complete when the recording ends.
    pub async fn capture(&self, request: CaptureRequest) -> Result<CaptureOutput, CaptureError> {
        info!(
            camera = %request.camera,
            mode = ?request.mode,
            target = ?request.target,
            "Capture requested"
        );

        self.ensure_not_recording(request.mode, None)?;

        let orientation = self.resolve_orientation(&request).await?;
        let camera = self.cameras.acquire(request.camera)?;

        // A recording may have started while the sensor was read
        self.ensure_not_recording(request.mode, Some(&camera))?;

        if request.play_sound {
            if let Err(e) = self.shutter.play() {
                warn!(error = %e, "Failed to play shutter sound");
            }
        }
        if let Some(quality) = request.quality.as_deref() {
            self.cameras.set_quality(request.camera, quality);
        }
        self.cameras.adjust_rotation(request.camera, orientation);

        match request.mode {
            CaptureMode::Still => self.still.capture(&request, &camera).await,
            CaptureMode::Video => self
                .recorder
                .start(&request, &camera)
                .await
                .map(CaptureOutput::Video),
        }
    }

    /// Stop the active recording; always acknowledged
    pub fn stop_capture(&self) -> &'static str {
        info!("Stop capture requested");
        self.recorder.stop()
    }

    /// Whether `camera` advertises any flash mode
    pub fn has_flash(&self, camera: CameraType) -> Result<bool, CaptureError> {
        let handle = self.cameras.acquire(camera)?;
        let modes = handle.supported_flash_modes();
        debug!(camera = %camera, ?modes, "Flash modes");
        Ok(!modes.is_empty())
    }

    /// [`Self::has_flash`] for bridge options; only the camera type is read
    pub fn has_flash_options(&self, options: &CaptureOptions) -> Result<bool, CaptureError> {
        let camera = CameraType::from_code(options.camera_type).ok_or(CaptureError::NoCamera)?;
        self.has_flash(camera)
    }

    pub fn constants(&self) -> serde_json::Value {
        constants::table()
    }

    fn ensure_not_recording(
        &self,
        mode: CaptureMode,
        camera: Option<&CameraHandle>,
    ) -> Result<(), CaptureError> {
        let camera_busy = camera.is_some_and(|camera| !camera.is_preview_usable());
        if !self.recorder.is_active() && !camera_busy {
            return Ok(());
        }

        let err = match mode {
            CaptureMode::Video => RecordingError::AlreadyRecording.into(),
            CaptureMode::Still => CaptureError::CameraBusy("a recording is in progress".to_string()),
        };
        error!(error = %err, "Rejected capture request");
        Err(err)
    }

    async fn resolve_orientation(
        &self,
        request: &CaptureRequest,
    ) -> Result<Orientation, CaptureError> {
        match request.orientation.or(self.config.default_orientation) {
            Some(orientation) if orientation != Orientation::Auto => {
                debug!(?orientation, "Using supplied orientation");
                Ok(orientation)
            }
            _ => self.orientation.resolve().await,
        }
    }
}

impl std::fmt::Debug for CaptureDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureDispatcher")
            .field("cameras", &self.cameras)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}
