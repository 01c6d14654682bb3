// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-orientation motion sensor

use crate::backends::sensor::{OrientationListener, OrientationSensor};
use crate::request::Orientation;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::{debug, warn};

type ListenerSlot = Arc<Mutex<Option<OrientationListener>>>;

/// Reports one constant orientation from a sensor thread on every resume
pub struct VirtualSensor {
    orientation: Orientation,
    listener: ListenerSlot,
    running: AtomicBool,
}

impl VirtualSensor {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            listener: Arc::new(Mutex::new(None)),
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn has_listener(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl OrientationSensor for VirtualSensor {
    fn resume(&self) {
        self.running.store(true, Ordering::SeqCst);

        let listener = Arc::clone(&self.listener);
        let orientation = self.orientation;
        let spawned = thread::Builder::new()
            .name("orientation-sensor".to_string())
            .spawn(move || {
                let mut slot = listener.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(listener) = slot.as_mut() {
                    debug!(?orientation, "Sensor reading");
                    listener(orientation);
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "Failed to spawn sensor thread, dropping listener");
            *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }

    fn pause(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn register_listener(&self, listener: OrientationListener) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    fn unregister_listener(&self) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
