// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Numeric option codes shared with the host bridge, recording limits, and
//! the constants table exposed to callers.

use serde_json::{Value, json};
use std::time::Duration;

/// Sentinel orientation code meaning "read the orientation sensor"
pub const ORIENTATION_AUTO: i64 = i32::MAX as i64;

/// Raw media kind codes used by the output target resolver
pub mod media_type {
    pub const IMAGE: i32 = 1;
    pub const VIDEO: i32 = 2;
}

/// Recording limits
pub mod recording {
    use super::Duration;

    /// Shortest maximum duration the encoder honours; shorter caps are raised to this
    pub const MIN_DURATION: Duration = Duration::from_secs(4);

    /// Output size ceiling in bytes (100 MB)
    pub const MAX_FILE_SIZE: u64 = 100 * 1000 * 1000;
}

/// Naming of captured files
pub mod naming {
    /// Default folder name for saving photos and videos
    pub const DEFAULT_SAVE_FOLDER: &str = "Camera";

    /// Folder under the cache root used for temporary captures
    pub const CACHE_FOLDER: &str = "camera-capture";

    /// Timestamp format used in file names
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
}

/// Acknowledgement returned by `stop_capture`
pub const STOP_ACKNOWLEDGEMENT: &str = "Stopped capture";

/// Constants table published to the host bridge
///
/// Mirrors the option codes accepted by [`crate::request::CaptureOptions`].
pub fn table() -> Value {
    json!({
        "Aspect": {
            "fill": 0,
            "fit": 1,
            "stretch": 2,
        },
        "BarCodeType": {},
        "Type": {
            "front": 1,
            "back": 2,
        },
        "CaptureQuality": {
            "low": "low",
            "medium": "medium",
            "high": "high",
            "photo": "high",
        },
        "CaptureMode": {
            "still": 0,
            "video": 1,
        },
        "CaptureTarget": {
            "memory": 0,
            "disk": 1,
            "cameraRoll": 2,
            "temp": 3,
        },
        "Orientation": {
            "auto": ORIENTATION_AUTO,
            "landscapeLeft": 1,
            "landscapeRight": 3,
            "portrait": 0,
            "portraitUpsideDown": 2,
        },
        "FlashMode": {
            "off": 0,
            "on": 1,
            "auto": 2,
        },
        "TorchMode": {
            "off": 0,
            "on": 1,
            "auto": 2,
        },
    })
}
