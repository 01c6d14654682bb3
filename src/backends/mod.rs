// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for the platform collaborators
//!
//! The capture core only talks to the traits defined here:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Capture Dispatcher              │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐    │
//! │  │   Camera    │    │  Media encoder   │    │
//! │  └─────────────┘    └──────────────────┘    │
//! │  ┌─────────────┐    ┌──────────────────┐    │
//! │  │   Sensor    │    │ Shutter/Gallery  │    │
//! │  └─────────────┘    └──────────────────┘    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Camera acquisition, the handle and its encoder hand-off
//! - [`encoder`]: Media encoder lifecycle
//! - [`sensor`]: Orientation sensor
//! - [`media`]: Shutter sound and gallery
//! - [`virtual_camera`]: Virtual implementations of all of the above

pub mod camera;
pub mod encoder;
pub mod media;
pub mod sensor;
pub mod virtual_camera;

use crate::config::Config;
use crate::request::Orientation;
use crate::storage::{MediaKind, StorageLocations};
use camera::CameraBackend;
use encoder::EncoderFactory;
use media::{MediaGallery, ShutterSound};
use sensor::OrientationSensor;
use std::sync::Arc;
use virtual_camera::{
    DirectoryGallery, VirtualBackend, VirtualEncoderFactory, VirtualSensor, VirtualShutter,
};

/// The set of collaborators a dispatcher runs on
pub struct Platform {
    pub cameras: Box<dyn CameraBackend>,
    pub encoders: Arc<dyn EncoderFactory>,
    pub sensor: Arc<dyn OrientationSensor>,
    pub shutter: Arc<dyn ShutterSound>,
    pub gallery: Arc<dyn MediaGallery>,
}

impl Platform {
    /// Virtual devices; the gallery writes into the persistent pictures folder
    pub fn virtual_devices(config: &Config) -> Self {
        let storage = StorageLocations::from_config(config);
        Self {
            cameras: Box::new(VirtualBackend::new()),
            encoders: Arc::new(VirtualEncoderFactory),
            sensor: Arc::new(VirtualSensor::new(Orientation::Portrait)),
            shutter: Arc::new(VirtualShutter::new()),
            gallery: Arc::new(DirectoryGallery::new(storage.media_dir(MediaKind::Image))),
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
