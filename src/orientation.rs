// SPDX-License-Identifier: GPL-3.0-only

//! One-shot device orientation lookup
//!
//! Subscribes to the orientation sensor for exactly one reading. The
//! subscription is torn down by a drop guard, so the listener is removed even
//! when the caller stops waiting or the sensor never reports.

use crate::backends::sensor::OrientationSensor;
use crate::errors::CaptureError;
use crate::request::Orientation;
use futures::channel::oneshot;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves orientation from a motion sensor
#[derive(Clone)]
pub struct OrientationResolver {
    sensor: Arc<dyn OrientationSensor>,
}

impl OrientationResolver {
    pub fn new(sensor: Arc<dyn OrientationSensor>) -> Self {
        Self { sensor }
    }

    /// Wait for the first sensor reading
    pub async fn resolve(&self) -> Result<Orientation, CaptureError> {
        let (sender, receiver) = oneshot::channel();
        let mut sender = Some(sender);

        let subscription = Subscription::open(
            Arc::clone(&self.sensor),
            Box::new(move |orientation| {
                if let Some(sender) = sender.take() {
                    let _ = sender.send(orientation);
                }
            }),
        );

        let reading = receiver.await;
        drop(subscription);

        match reading {
            Ok(orientation) => {
                debug!(?orientation, "Orientation resolved from sensor");
                Ok(orientation)
            }
            Err(_) => {
                warn!("Orientation sensor dropped the listener without a reading");
                Err(CaptureError::SensorUnavailable)
            }
        }
    }
}

/// Active listener registration; unregisters and pauses the sensor on drop
struct Subscription {
    sensor: Arc<dyn OrientationSensor>,
}

impl Subscription {
    fn open(
        sensor: Arc<dyn OrientationSensor>,
        listener: crate::backends::sensor::OrientationListener,
    ) -> Self {
        sensor.register_listener(listener);
        sensor.resume();
        Self { sensor }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.sensor.unregister_listener();
        self.sensor.pause();
    }
}
