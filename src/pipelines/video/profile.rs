// SPDX-License-Identifier: GPL-3.0-only

//! Quality tiers and recording limits

use crate::backends::encoder::{
    AudioCodec, OutputFormat, ProfilePreset, RecordingProfile, VideoCodec,
};
use crate::config::Config;
use crate::constants::recording;
use crate::errors::CaptureError;
use std::time::Duration;

/// Video quality tier requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityTier {
    /// Parse an optional tier name; unset means [`QualityTier::High`]
    pub fn parse(name: Option<&str>) -> Result<Self, CaptureError> {
        match name {
            None => Ok(QualityTier::default()),
            Some("low") => Ok(QualityTier::Low),
            Some("medium") => Ok(QualityTier::Medium),
            Some("high") => Ok(QualityTier::High),
            Some(other) => Err(CaptureError::UnsupportedQuality(other.to_string())),
        }
    }

    pub fn preset(&self) -> ProfilePreset {
        match self {
            QualityTier::Low => ProfilePreset::Low,
            QualityTier::Medium => ProfilePreset::P720,
            QualityTier::High => ProfilePreset::High,
        }
    }

    /// Codec settings for this tier
    ///
    /// Bitrates follow the resolution class: SD low, HD medium, Full HD high.
    pub fn profile(&self) -> RecordingProfile {
        let (width, height, video_bitrate_kbps) = match self {
            QualityTier::Low => (640, 480, 1000),
            QualityTier::Medium => (1280, 720, 5000),
            QualityTier::High => (1920, 1080, 16000),
        };

        RecordingProfile {
            preset: self.preset(),
            output_format: OutputFormat::Mpeg4,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::AmrNb,
            width,
            height,
            video_bitrate_kbps,
        }
    }
}

/// Duration floor and size ceiling applied to every recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingLimits {
    pub min_duration: Duration,
    pub max_file_size: u64,
}

impl Default for RecordingLimits {
    fn default() -> Self {
        Self {
            min_duration: recording::MIN_DURATION,
            max_file_size: recording::MAX_FILE_SIZE,
        }
    }
}

impl RecordingLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_duration: config.min_recording_duration(),
            max_file_size: config.max_recording_bytes,
        }
    }

    /// Maximum duration for a request, raised to the floor when shorter
    ///
    /// `None` leaves the recording unbounded in time.
    pub fn max_duration(&self, total_seconds: Option<u32>) -> Option<Duration> {
        total_seconds.map(|seconds| Duration::from_secs(u64::from(seconds)).max(self.min_duration))
    }
}
