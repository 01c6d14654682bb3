// SPDX-License-Identifier: GPL-3.0-only

//! Error types for capture and recording requests
//!
//! Every failure a caller can observe is a [`CaptureError`]. Sub-errors keep
//! the underlying cause attached as a `source` so the rejection message always
//! carries it.

use crate::backends::camera::BackendError;
use crate::backends::encoder::EncoderError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using CaptureError
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Top-level error delivered to the caller of a capture request
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No camera handle could be acquired for the selector
    #[error("No camera found.")]
    NoCamera,
    /// The camera is owned by another operation
    #[error("Camera is busy: {0}")]
    CameraBusy(String),
    /// Capture mode code is not still or video
    #[error("Unable to find given capture mode: {0}")]
    UnsupportedMode(i64),
    /// Quality tier outside low/medium/high
    #[error("No valid quality option given: {0}")]
    UnsupportedQuality(String),
    /// Any other option value that cannot be mapped
    #[error("Invalid value for option '{name}': {value}")]
    InvalidOption { name: &'static str, value: String },
    /// Orientation sensor went away without a reading
    #[error("Orientation sensor unavailable")]
    SensorUnavailable,
    /// Storage/filesystem errors
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Recording-related errors
    #[error(transparent)]
    Recording(#[from] RecordingError),
    /// Photo capture errors
    #[error(transparent)]
    Photo(#[from] PhotoError),
    /// Camera backend errors
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// A blocking background task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
    /// The completion slot was dropped without being signaled
    #[error("Capture request was abandoned before completion")]
    Abandoned,
}

/// Output target resolution and write errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error creating media file {}: {source}", path.display())]
    FileCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error accessing file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaKind(i32),
}

/// Recording-specific errors
#[derive(Debug, Error)]
pub enum RecordingError {
    /// A recording session is already active
    #[error("Recording already in progress")]
    AlreadyRecording,
    #[error("Failed to configure recorder: {0}")]
    Configure(#[source] EncoderError),
    #[error("Failed to prepare recorder: {0}")]
    Prepare(#[source] EncoderError),
    #[error("Failed to start recorder: {0}")]
    Start(#[source] EncoderError),
    /// Encoder reported an error while recording
    #[error("Recorder error: {0}")]
    Runtime(String),
    #[error("Recording released before a destination was resolved")]
    MissingDestination,
}

/// Photo capture errors
#[derive(Debug, Error)]
pub enum PhotoError {
    /// The frame callback was dropped without delivering data
    #[error("No frame available for capture")]
    NoFrameAvailable,
    #[error("Failed to decode captured frame: {0}")]
    Decode(String),
    #[error("Failed to insert image into gallery: {0}")]
    Gallery(String),
}
