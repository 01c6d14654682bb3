// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for capture operations
//!
//! This module provides command-line functionality for:
//! - Taking photos
//! - Recording videos
//! - Running raw bridge requests
//!
//! Every command runs on the virtual devices and prints its result as JSON.

use camera_capture::{
    CameraType, CaptureDispatcher, CaptureOptions, CaptureRequest, CaptureTarget, Config,
    Orientation, Platform,
};
use std::sync::Arc;

/// Options for the `photo` command
pub struct PhotoArgs {
    pub camera: CameraType,
    pub target: CaptureTarget,
    pub quality: Option<String>,
    pub orientation: Option<Orientation>,
    pub sound: bool,
    pub title: Option<String>,
    pub description: Option<String>,
}

fn dispatcher() -> CaptureDispatcher {
    let config = Config::load();
    let platform = Platform::virtual_devices(&config);
    CaptureDispatcher::new(config, platform)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Take a photo
pub fn take_photo(args: PhotoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = CaptureRequest::still(args.camera, args.target)
        .with_sound(args.sound)
        .with_gallery_info(args.title, args.description);
    if let Some(quality) = args.quality {
        request = request.with_quality(quality);
    }
    if let Some(orientation) = args.orientation {
        request = request.with_orientation(orientation);
    }

    let dispatcher = dispatcher();
    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(dispatcher.capture(request))?;

    print_json(&output)
}

/// Record a video until the duration elapses or Ctrl+C is pressed
pub fn record_video(
    camera: CameraType,
    target: CaptureTarget,
    quality: Option<String>,
    duration: Option<u32>,
    orientation: Option<Orientation>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = CaptureRequest::video(camera, target);
    if let Some(quality) = quality {
        request = request.with_quality(quality);
    }
    if let Some(seconds) = duration {
        request = request.with_total_seconds(seconds);
    }
    if let Some(orientation) = orientation {
        request = request.with_orientation(orientation);
    }

    let dispatcher = Arc::new(dispatcher());

    // Set up Ctrl+C handler
    let stopper = Arc::clone(&dispatcher);
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("{}", stopper.stop_capture());
    })?;

    match duration {
        Some(seconds) => eprintln!(
            "Recording for up to {} seconds... (press Ctrl+C to stop early)",
            seconds
        ),
        None => eprintln!("Recording... (press Ctrl+C to stop)"),
    }

    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(dispatcher.capture(request))?;

    print_json(&output)
}

/// Run a capture from bridge options given as JSON
pub fn run_request(json: &str) -> Result<(), Box<dyn std::error::Error>> {
    let options: CaptureOptions = serde_json::from_str(json)?;

    let dispatcher = Arc::new(dispatcher());
    let stopper = Arc::clone(&dispatcher);
    ctrlc::set_handler(move || {
        eprintln!("{}", stopper.stop_capture());
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    let output = rt.block_on(dispatcher.capture_options(options))?;

    print_json(&output)
}

/// Report whether `camera` has a flash
pub fn has_flash(camera: CameraType) -> Result<(), Box<dyn std::error::Error>> {
    print_json(&dispatcher().has_flash(camera)?)
}

/// Print the constants table
pub fn print_constants() -> Result<(), Box<dyn std::error::Error>> {
    print_json(&dispatcher().constants())
}
