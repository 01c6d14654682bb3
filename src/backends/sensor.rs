// SPDX-License-Identifier: GPL-3.0-only

//! Orientation sensor interface

use crate::request::Orientation;

/// Listener called with each stable orientation reading
pub type OrientationListener = Box<dyn FnMut(Orientation) + Send>;

/// Motion sensor that reports device orientation
///
/// Holds at most one listener. Readings may arrive on a sensor thread.
pub trait OrientationSensor: Send + Sync {
    /// Start producing readings
    fn resume(&self);

    /// Stop producing readings
    fn pause(&self);

    fn register_listener(&self, listener: OrientationListener);

    fn unregister_listener(&self);
}
