// SPDX-License-Identifier: GPL-3.0-only

//! Virtual devices for every platform collaborator
//!
//! These back the command line tool and the integration tests. Callbacks are
//! delivered on plain threads, the way platform hardware delivers them.
//!
//! ```text
//! VirtualBackend ──open──▶ VirtualCamera ──take_picture──▶ shutter thread ──▶ JPEG
//! VirtualEncoderFactory ──▶ VirtualEncoder ──start──▶ writer thread ──▶ limit info
//! VirtualSensor ──resume──▶ sensor thread ──▶ orientation
//! DirectoryGallery / VirtualShutter
//! ```

mod camera;
mod encoder;
mod gallery;
mod sensor;

pub use camera::{VirtualBackend, VirtualCamera};
pub use encoder::{VirtualEncoder, VirtualEncoderFactory};
pub use gallery::{DirectoryGallery, VirtualShutter};
pub use sensor::VirtualSensor;
