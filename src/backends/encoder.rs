// SPDX-License-Identifier: GPL-3.0-only

//! Media encoder interface
//!
//! Follows the platform recorder lifecycle: configure, prepare, start, then
//! stop/reset/release. Limit notifications are delivered through the info
//! listener, possibly from a thread owned by the encoder.

use super::camera::CameraDevice;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by encoder lifecycle calls
#[derive(Debug, Error)]
pub enum EncoderError {
    /// Call made in the wrong lifecycle state
    #[error("illegal state: {0}")]
    IllegalState(String),
    /// Output could not be opened or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Asynchronous notifications from a running encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderInfo {
    MaxDurationReached,
    MaxFileSizeReached,
    /// Encoder failed while recording
    Error(String),
}

/// Info listener installed on an encoder
pub type InfoListener = Arc<dyn Fn(EncoderInfo) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    Camcorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSource {
    Camera,
}

/// Preset capture profile the codec settings are based on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePreset {
    /// Lowest resolution the camera offers
    Low,
    /// 1280x720
    P720,
    /// Highest resolution the camera offers
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mpeg4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    H264,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    AmrNb,
}

/// Codec and container settings for one recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingProfile {
    pub preset: ProfilePreset,
    pub output_format: OutputFormat,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub width: u32,
    pub height: u32,
    pub video_bitrate_kbps: u32,
}

/// Everything an encoder needs before `prepare`
#[derive(Clone)]
pub struct EncoderSettings {
    pub camera: Arc<dyn CameraDevice>,
    pub audio_source: Option<AudioSource>,
    pub video_source: VideoSource,
    pub profile: RecordingProfile,
    pub output_path: PathBuf,
    pub max_duration: Option<Duration>,
    pub max_file_size: u64,
}

impl std::fmt::Debug for EncoderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderSettings")
            .field("audio_source", &self.audio_source)
            .field("video_source", &self.video_source)
            .field("profile", &self.profile)
            .field("output_path", &self.output_path)
            .field("max_duration", &self.max_duration)
            .field("max_file_size", &self.max_file_size)
            .finish()
    }
}

/// A platform media encoder
pub trait MediaEncoder: Send {
    /// Install or clear the info listener
    fn set_info_listener(&mut self, listener: Option<InfoListener>);

    fn configure(&mut self, settings: EncoderSettings) -> Result<(), EncoderError>;

    fn prepare(&mut self) -> Result<(), EncoderError>;

    fn start(&mut self) -> Result<(), EncoderError>;

    fn stop(&mut self) -> Result<(), EncoderError>;

    /// Return to the unconfigured state
    fn reset(&mut self);

    /// Free encoder resources; the encoder is unusable afterwards
    fn release(&mut self);
}

/// Creates a fresh encoder for each recording
pub trait EncoderFactory: Send + Sync {
    fn create(&self) -> Box<dyn MediaEncoder>;
}
