// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipelines for photo and video
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ CameraHandle │ ──▶ │  Photo Pipeline   │ ──▶ │ base64 / JPEG│
//! │  (preview)   │     │  - take_picture   │     │ file/gallery │
//! │              │     │  - route target   │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ EncoderLease │ ──▶ │  Video Recorder   │ ──▶ │   MP4 File   │
//! │  (encoder)   │     │  - state machine  │     │              │
//! │              │     │  - limits         │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Single-frame capture and routing
//! - [`video`]: Recording state machine and quality profiles

pub mod photo;
pub mod video;
