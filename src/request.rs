// SPDX-License-Identifier: GPL-3.0-only

//! Capture request types
//!
//! [`CaptureRequest`] is the typed, immutable description of one capture.
//! [`CaptureOptions`] is the raw form used by the host bridge, keyed by the
//! numeric codes from [`crate::constants::table`].

use crate::constants::ORIENTATION_AUTO;
use crate::errors::CaptureError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which physical camera to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraType {
    Front,
    Back,
}

impl CameraType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CameraType::Front),
            2 => Some(CameraType::Back),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            CameraType::Front => 1,
            CameraType::Back => 2,
        }
    }
}

impl fmt::Display for CameraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraType::Front => write!(f, "front"),
            CameraType::Back => write!(f, "back"),
        }
    }
}

impl FromStr for CameraType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(CameraType::Front),
            "back" => Ok(CameraType::Back),
            other => Err(format!("unknown camera type '{other}' (expected front or back)")),
        }
    }
}

/// Still image or video clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    Still,
    Video,
}

impl CaptureMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CaptureMode::Still),
            1 => Some(CaptureMode::Video),
            _ => None,
        }
    }
}

/// Where the captured media ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureTarget {
    /// Base64 payload returned to the caller
    Memory,
    /// Persistent public media directory
    Disk,
    /// Shared gallery
    CameraRoll,
    /// Application-private cache
    Temp,
}

impl CaptureTarget {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CaptureTarget::Memory),
            1 => Some(CaptureTarget::Disk),
            2 => Some(CaptureTarget::CameraRoll),
            3 => Some(CaptureTarget::Temp),
            _ => None,
        }
    }
}

impl FromStr for CaptureTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(CaptureTarget::Memory),
            "disk" => Ok(CaptureTarget::Disk),
            "cameraRoll" | "camera-roll" => Ok(CaptureTarget::CameraRoll),
            "temp" => Ok(CaptureTarget::Temp),
            other => Err(format!(
                "unknown capture target '{other}' (expected memory, disk, camera-roll or temp)"
            )),
        }
    }
}

/// Device orientation, or the `Auto` sentinel that asks for a sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Auto,
    Portrait,
    LandscapeLeft,
    PortraitUpsideDown,
    LandscapeRight,
}

impl Orientation {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            ORIENTATION_AUTO => Some(Orientation::Auto),
            0 => Some(Orientation::Portrait),
            1 => Some(Orientation::LandscapeLeft),
            2 => Some(Orientation::PortraitUpsideDown),
            3 => Some(Orientation::LandscapeRight),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Orientation::Auto => ORIENTATION_AUTO,
            Orientation::Portrait => 0,
            Orientation::LandscapeLeft => 1,
            Orientation::PortraitUpsideDown => 2,
            Orientation::LandscapeRight => 3,
        }
    }

    /// Display rotation in degrees clockwise (`None` for `Auto`)
    pub fn degrees(&self) -> Option<u32> {
        match self {
            Orientation::Auto => None,
            Orientation::Portrait => Some(0),
            Orientation::LandscapeLeft => Some(90),
            Orientation::PortraitUpsideDown => Some(180),
            Orientation::LandscapeRight => Some(270),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Orientation::Auto),
            "portrait" => Ok(Orientation::Portrait),
            "landscapeLeft" | "landscape-left" => Ok(Orientation::LandscapeLeft),
            "portraitUpsideDown" | "portrait-upside-down" => Ok(Orientation::PortraitUpsideDown),
            "landscapeRight" | "landscape-right" => Ok(Orientation::LandscapeRight),
            other => Err(format!("unknown orientation '{other}'")),
        }
    }
}

/// Flash operating mode advertised by a camera device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
    Torch,
}

/// One capture invocation
///
/// Built once per call and consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub camera: CameraType,
    pub mode: CaptureMode,
    pub target: CaptureTarget,
    /// Raw quality tier; only `low`, `medium` and `high` are valid for video
    pub quality: Option<String>,
    pub orientation: Option<Orientation>,
    /// Maximum recording duration in seconds
    pub total_seconds: Option<u32>,
    pub play_sound: bool,
    /// Gallery title (camera roll target only)
    pub title: Option<String>,
    /// Gallery description (camera roll target only)
    pub description: Option<String>,
}

impl CaptureRequest {
    pub fn new(camera: CameraType, mode: CaptureMode, target: CaptureTarget) -> Self {
        Self {
            camera,
            mode,
            target,
            quality: None,
            orientation: None,
            total_seconds: None,
            play_sound: false,
            title: None,
            description: None,
        }
    }

    pub fn still(camera: CameraType, target: CaptureTarget) -> Self {
        Self::new(camera, CaptureMode::Still, target)
    }

    pub fn video(camera: CameraType, target: CaptureTarget) -> Self {
        Self::new(camera, CaptureMode::Video, target)
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_total_seconds(mut self, seconds: u32) -> Self {
        self.total_seconds = Some(seconds);
        self
    }

    pub fn with_sound(mut self, play_sound: bool) -> Self {
        self.play_sound = play_sound;
        self
    }

    pub fn with_gallery_info(mut self, title: Option<String>, description: Option<String>) -> Self {
        self.title = title;
        self.description = description;
        self
    }
}

/// Raw capture options as sent by the host bridge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOptions {
    #[serde(rename = "type")]
    pub camera_type: i64,
    pub mode: i64,
    pub target: i64,
    pub quality: Option<String>,
    pub orientation: Option<i64>,
    pub total_seconds: Option<u32>,
    pub play_sound_on_capture: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<CaptureOptions> for CaptureRequest {
    type Error = CaptureError;

    fn try_from(options: CaptureOptions) -> Result<Self, Self::Error> {
        let camera = CameraType::from_code(options.camera_type).ok_or(CaptureError::NoCamera)?;
        let mode = CaptureMode::from_code(options.mode)
            .ok_or(CaptureError::UnsupportedMode(options.mode))?;
        let target =
            CaptureTarget::from_code(options.target).ok_or_else(|| CaptureError::InvalidOption {
                name: "target",
                value: options.target.to_string(),
            })?;
        let orientation = options
            .orientation
            .map(|code| {
                Orientation::from_code(code).ok_or_else(|| CaptureError::InvalidOption {
                    name: "orientation",
                    value: code.to_string(),
                })
            })
            .transpose()?;

        Ok(CaptureRequest {
            camera,
            mode,
            target,
            quality: options.quality,
            orientation,
            total_seconds: options.total_seconds,
            play_sound: options.play_sound_on_capture.unwrap_or(false),
            title: options.title,
            description: options.description,
        })
    }
}

/// Result payload of a completed capture
///
/// Serializes to `{"data": ...}`, `{"path": ...}` or a bare URI string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CaptureOutput {
    /// Base64-encoded frame (memory target)
    Data { data: String },
    /// Gallery reference or file URI (camera roll, disk and temp targets)
    Path { path: String },
    /// Destination URI of a finished recording
    Video(String),
}
