// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use thiserror::Error;

/// Result type for camera backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by camera backend collaborators
#[derive(Debug, Error)]
pub enum BackendError {
    /// Camera hardware refused an ownership change
    #[error("Camera lock failed: {0}")]
    LockFailed(String),
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

/// Who currently drives the camera hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// Preview owns the device; still capture is allowed
    #[default]
    Preview,
    /// A media encoder owns the device for recording
    Encoder,
}

/// Raw frame bytes delivered by a picture callback
pub type PictureCallback = Box<dyn FnOnce(Vec<u8>) + Send>;
