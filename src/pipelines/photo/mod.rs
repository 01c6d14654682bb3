// SPDX-License-Identifier: GPL-3.0-only

//! Still capture pipeline
//!
//! ```text
//! CameraHandle::take_picture → preview restarted → route by target
//!                                                   ├─ memory  → base64
//!                                                   ├─ gallery → decode → insert
//!                                                   └─ disk/temp → resolve → write
//! ```
//!
//! The camera handle is never surrendered for a still capture; the preview is
//! restarted inside the frame callback, before any routing happens.

pub mod encoding;

pub use encoding::{EncodingQuality, encode_jpeg};

use crate::backends::camera::CameraHandle;
use crate::backends::media::MediaGallery;
use crate::errors::{CaptureError, PhotoError, StorageError};
use crate::request::{CaptureOutput, CaptureRequest, CaptureTarget};
use crate::storage::{MediaKind, Persistence, StorageLocations};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::{error, info};

/// Single-frame capture and routing
#[derive(Clone)]
pub struct StillCapture {
    storage: StorageLocations,
    gallery: Arc<dyn MediaGallery>,
}

impl StillCapture {
    pub fn new(storage: StorageLocations, gallery: Arc<dyn MediaGallery>) -> Self {
        Self { storage, gallery }
    }

    /// Capture one frame and deliver it to `request.target`
    pub async fn capture(
        &self,
        request: &CaptureRequest,
        camera: &CameraHandle,
    ) -> Result<CaptureOutput, CaptureError> {
        info!(camera = %request.camera, target = ?request.target, "Capturing still image");

        let data = camera.take_picture().await?;

        let output = match request.target {
            CaptureTarget::Memory => Ok(CaptureOutput::Data {
                data: STANDARD.encode(&data),
            }),
            CaptureTarget::CameraRoll => {
                self.insert_into_gallery(data, request.title.clone(), request.description.clone())
                    .await
            }
            CaptureTarget::Disk => self.write_file(data, Persistence::Persistent).await,
            CaptureTarget::Temp => self.write_file(data, Persistence::Temporary).await,
        };

        if let Err(e) = &output {
            error!(error = %e, "Still capture failed");
        }
        output
    }

    async fn write_file(
        &self,
        data: Vec<u8>,
        persistence: Persistence,
    ) -> Result<CaptureOutput, CaptureError> {
        let storage = self.storage.clone();

        // Directory creation and the write are blocking I/O
        let destination = tokio::task::spawn_blocking(move || {
            let destination = storage.resolve(MediaKind::Image, persistence)?;
            std::fs::write(&destination.path, &data).map_err(|source| StorageError::Write {
                path: destination.path.clone(),
                source,
            })?;
            Ok::<_, StorageError>(destination)
        })
        .await
        .map_err(|e| CaptureError::Task(format!("Save task error: {}", e)))??;

        info!(path = %destination.path.display(), "Photo saved");
        Ok(CaptureOutput::Path {
            path: destination.uri(),
        })
    }

    async fn insert_into_gallery(
        &self,
        data: Vec<u8>,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<CaptureOutput, CaptureError> {
        let gallery = Arc::clone(&self.gallery);

        let reference = tokio::task::spawn_blocking(move || {
            let image =
                image::load_from_memory(&data).map_err(|e| PhotoError::Decode(e.to_string()))?;
            gallery
                .insert_image(&image, title.as_deref(), description.as_deref())
                .map_err(|e| PhotoError::Gallery(e.to_string()))
        })
        .await
        .map_err(|e| CaptureError::Task(format!("Gallery task error: {}", e)))??;

        info!(reference = %reference, "Photo inserted into gallery");
        Ok(CaptureOutput::Path { path: reference })
    }
}
