// SPDX-License-Identifier: GPL-3.0-only

//! Directory-backed camera roll and logging shutter

use crate::backends::camera::{BackendError, BackendResult};
use crate::backends::media::{MediaGallery, ShutterSound};
use crate::constants::naming;
use crate::pipelines::photo::{EncodingQuality, encode_jpeg};
use crate::storage::file_uri;
use image::DynamicImage;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Gallery that stores inserted images as JPEG files in one directory
///
/// Title and description go into a JSON sidecar next to the image.
#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    dir: PathBuf,
}

#[derive(Serialize)]
struct Sidecar<'a> {
    title: Option<&'a str>,
    description: Option<&'a str>,
}

impl DirectoryGallery {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl MediaGallery for DirectoryGallery {
    fn insert_image(
        &self,
        image: &DynamicImage,
        title: Option<&str>,
        description: Option<&str>,
    ) -> BackendResult<String> {
        std::fs::create_dir_all(&self.dir)?;

        let timestamp = chrono::Local::now().format(naming::TIMESTAMP_FORMAT);
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let stem = format!("IMG_{}_{}", timestamp, &unique[..8]);
        let path = self.dir.join(format!("{}.jpg", stem));

        let data =
            encode_jpeg(&image.to_rgb8(), EncodingQuality::High).map_err(BackendError::Other)?;
        std::fs::write(&path, data)?;

        if title.is_some() || description.is_some() {
            let sidecar = serde_json::to_vec_pretty(&Sidecar { title, description })
                .map_err(|e| BackendError::Other(e.to_string()))?;
            std::fs::write(self.dir.join(format!("{}.json", stem)), sidecar)?;
        }

        info!(path = %path.display(), "Image added to gallery");
        Ok(file_uri(&path))
    }
}

/// Shutter that logs instead of playing a sound
#[derive(Debug, Default)]
pub struct VirtualShutter {
    plays: AtomicUsize,
}

impl VirtualShutter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl ShutterSound for VirtualShutter {
    fn play(&self) -> BackendResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        info!("Click");
        Ok(())
    }
}
