// SPDX-License-Identifier: GPL-3.0-only

//! Shutter sound and shared gallery interfaces

use super::camera::BackendResult;
use image::DynamicImage;

/// Plays the shutter click
///
/// Best-effort: callers log and ignore failures.
pub trait ShutterSound: Send + Sync {
    fn play(&self) -> BackendResult<()>;
}

/// Platform shared-media store (the camera roll)
pub trait MediaGallery: Send + Sync {
    /// Insert a decoded image and return its gallery reference
    fn insert_image(
        &self,
        image: &DynamicImage,
        title: Option<&str>,
        description: Option<&str>,
    ) -> BackendResult<String>;
}
