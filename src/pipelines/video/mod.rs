// SPDX-License-Identifier: GPL-3.0-only

//! Video recording pipeline
//!
//! This module drives a platform media encoder:
//! - Quality tiers map onto codec profiles
//! - The camera is leased to the encoder for the length of a recording
//! - Duration and size limits end a recording successfully

pub mod profile;
pub mod recorder;

pub use profile::{QualityTier, RecordingLimits};
pub use recorder::{RecorderEvent, RecorderPhase, VideoRecorder};
