// SPDX-License-Identifier: GPL-3.0-only

//! Camera Capture - capture and recording orchestration for a camera bridge
//!
//! This library turns capture requests into still photos and video recordings
//! on top of a set of platform collaborators (camera, encoder, orientation
//! sensor, gallery), and resolves every request exactly once.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`dispatcher`]: Request entry point, side effects and routing
//! - [`backends`]: Platform collaborator traits and virtual devices
//! - [`pipelines`]: Still capture and the video recording state machine
//! - [`orientation`]: One-shot sensor orientation lookup
//! - [`storage`]: Output destination resolution
//! - [`completion`]: Single-assignment completion channel
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```no_run
//! use camera_capture::{CameraType, CaptureDispatcher, CaptureRequest, CaptureTarget, Config, Platform};
//!
//! # async fn run() -> Result<(), camera_capture::CaptureError> {
//! let config = Config::load();
//! let platform = Platform::virtual_devices(&config);
//! let dispatcher = CaptureDispatcher::new(config, platform);
//!
//! let request = CaptureRequest::still(CameraType::Back, CaptureTarget::Temp);
//! let output = dispatcher.capture(request).await?;
//! println!("{}", serde_json::to_string(&output).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod completion;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod orientation;
pub mod pipelines;
pub mod request;
pub mod storage;

// Re-export commonly used types
pub use backends::Platform;
pub use completion::{Completion, CompletionSlot};
pub use config::Config;
pub use dispatcher::CaptureDispatcher;
pub use errors::{CaptureError, CaptureResult};
pub use request::{
    CameraType, CaptureMode, CaptureOptions, CaptureOutput, CaptureRequest, CaptureTarget,
    FlashMode, Orientation,
};
