// SPDX-License-Identifier: GPL-3.0-only

//! Instrumented collaborators shared by the integration tests

#![allow(dead_code)]

use camera_capture::backends::Platform;
use camera_capture::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraDevice, PictureCallback,
};
use camera_capture::backends::encoder::{
    EncoderError, EncoderFactory, EncoderSettings, InfoListener, MediaEncoder,
};
use camera_capture::backends::media::ShutterSound;
use camera_capture::backends::sensor::{OrientationListener, OrientationSensor};
use camera_capture::backends::virtual_camera::{
    DirectoryGallery, VirtualEncoder, VirtualSensor,
};
use camera_capture::pipelines::photo::{EncodingQuality, encode_jpeg};
use camera_capture::{CameraType, CaptureDispatcher, Config, FlashMode, Orientation};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A small valid JPEG used as the captured frame
pub fn frame_bytes() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 200, 30]));
    encode_jpeg(&image, EncodingQuality::High).unwrap()
}

/// Camera device that delivers a fixed frame and records preview and lock changes
pub struct FixedFrameCamera {
    pub camera: CameraType,
    pub frame: Vec<u8>,
    pub previewing: AtomicBool,
    pub unlocked: AtomicBool,
    pub preview_stops: AtomicUsize,
    pub preview_starts: AtomicUsize,
    pub pictures: AtomicUsize,
}

impl FixedFrameCamera {
    fn new(camera: CameraType, frame: Vec<u8>) -> Self {
        Self {
            camera,
            frame,
            previewing: AtomicBool::new(false),
            unlocked: AtomicBool::new(false),
            preview_stops: AtomicUsize::new(0),
            preview_starts: AtomicUsize::new(0),
            pictures: AtomicUsize::new(0),
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing.load(Ordering::SeqCst)
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }
}

impl CameraDevice for FixedFrameCamera {
    fn take_picture(&self, on_picture: PictureCallback) {
        self.pictures.fetch_add(1, Ordering::SeqCst);
        let frame = self.frame.clone();
        std::thread::spawn(move || on_picture(frame));
    }

    fn start_preview(&self) {
        self.preview_starts.fetch_add(1, Ordering::SeqCst);
        self.previewing.store(true, Ordering::SeqCst);
    }

    fn stop_preview(&self) {
        self.preview_stops.fetch_add(1, Ordering::SeqCst);
        self.previewing.store(false, Ordering::SeqCst);
    }

    fn unlock(&self) -> BackendResult<()> {
        if self.unlocked.swap(true, Ordering::SeqCst) {
            return Err(BackendError::LockFailed("already unlocked".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> BackendResult<()> {
        if !self.unlocked.swap(false, Ordering::SeqCst) {
            return Err(BackendError::LockFailed("not unlocked".to_string()));
        }
        Ok(())
    }

    fn supported_flash_modes(&self) -> Vec<FlashMode> {
        match self.camera {
            CameraType::Back => vec![FlashMode::Off, FlashMode::On],
            CameraType::Front => Vec::new(),
        }
    }
}

/// Calls made on the acquisition backend, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Open(CameraType),
    Close(CameraType),
    Quality(CameraType, String),
    Rotation(CameraType, Orientation),
}

pub struct FixedFrameBackend {
    devices: HashMap<CameraType, Arc<FixedFrameCamera>>,
    log: Arc<Mutex<Vec<BackendCall>>>,
}

impl CameraBackend for FixedFrameBackend {
    fn open(&mut self, camera: CameraType) -> Option<Arc<dyn CameraDevice>> {
        self.log.lock().unwrap().push(BackendCall::Open(camera));
        let device = self.devices.get(&camera)?.clone();
        device.start_preview();
        Some(device)
    }

    fn close(&mut self, camera: CameraType) {
        self.log.lock().unwrap().push(BackendCall::Close(camera));
        if let Some(device) = self.devices.get(&camera) {
            device.stop_preview();
        }
    }

    fn set_capture_quality(&mut self, camera: CameraType, quality: &str) {
        self.log
            .lock()
            .unwrap()
            .push(BackendCall::Quality(camera, quality.to_string()));
    }

    fn adjust_rotation(&mut self, camera: CameraType, orientation: Orientation) {
        self.log
            .lock()
            .unwrap()
            .push(BackendCall::Rotation(camera, orientation));
    }
}

/// Sensor that counts subscriptions around a [`VirtualSensor`]
pub struct CountingSensor {
    inner: VirtualSensor,
    pub registered: AtomicUsize,
    pub unregistered: AtomicUsize,
    reading_delay: Mutex<Duration>,
}

impl CountingSensor {
    /// Hold every reading back by `delay` on the sensor thread
    pub fn delay_readings(&self, delay: Duration) {
        *self.reading_delay.lock().unwrap() = delay;
    }

    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn unregistered(&self) -> usize {
        self.unregistered.load(Ordering::SeqCst)
    }
}

impl OrientationSensor for CountingSensor {
    fn resume(&self) {
        self.inner.resume();
    }

    fn pause(&self) {
        self.inner.pause();
    }

    fn register_listener(&self, mut listener: OrientationListener) {
        self.registered.fetch_add(1, Ordering::SeqCst);
        let delay = *self.reading_delay.lock().unwrap();
        if delay.is_zero() {
            self.inner.register_listener(listener);
            return;
        }
        self.inner.register_listener(Box::new(move |orientation| {
            std::thread::sleep(delay);
            listener(orientation);
        }));
    }

    fn unregister_listener(&self) {
        self.unregistered.fetch_add(1, Ordering::SeqCst);
        self.inner.unregister_listener();
    }
}

/// Shutter that counts plays and can be made to fail
#[derive(Default)]
pub struct CountingShutter {
    pub plays: AtomicUsize,
    pub fail: AtomicBool,
}

impl ShutterSound for CountingShutter {
    fn play(&self) -> BackendResult<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::Other("no audio output".to_string()));
        }
        Ok(())
    }
}

/// Virtual encoders that record the settings they were configured with
#[derive(Default)]
pub struct SpyEncoderFactory {
    pub created: AtomicUsize,
    pub settings: Arc<Mutex<Vec<EncoderSettings>>>,
}

impl SpyEncoderFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn last_settings(&self) -> Option<EncoderSettings> {
        self.settings.lock().unwrap().last().cloned()
    }
}

struct SpyEncoder {
    inner: VirtualEncoder,
    settings: Arc<Mutex<Vec<EncoderSettings>>>,
}

impl MediaEncoder for SpyEncoder {
    fn set_info_listener(&mut self, listener: Option<InfoListener>) {
        self.inner.set_info_listener(listener);
    }

    fn configure(&mut self, settings: EncoderSettings) -> Result<(), EncoderError> {
        self.settings.lock().unwrap().push(settings.clone());
        self.inner.configure(settings)
    }

    fn prepare(&mut self) -> Result<(), EncoderError> {
        self.inner.prepare()
    }

    fn start(&mut self) -> Result<(), EncoderError> {
        self.inner.start()
    }

    fn stop(&mut self) -> Result<(), EncoderError> {
        self.inner.stop()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn release(&mut self) {
        self.inner.release();
    }
}

impl EncoderFactory for SpyEncoderFactory {
    fn create(&self) -> Box<dyn MediaEncoder> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(SpyEncoder {
            inner: VirtualEncoder::new(),
            settings: Arc::clone(&self.settings),
        })
    }
}

/// A dispatcher wired to instrumented collaborators in a temporary directory
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub dispatcher: Arc<CaptureDispatcher>,
    pub back: Arc<FixedFrameCamera>,
    pub front: Arc<FixedFrameCamera>,
    pub backend_log: Arc<Mutex<Vec<BackendCall>>>,
    pub sensor: Arc<CountingSensor>,
    pub shutter: Arc<CountingShutter>,
    pub encoders: Arc<SpyEncoderFactory>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Build a harness, letting the caller adjust the config first
    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config {
            pictures_dir: Some(dir.path().join("Pictures")),
            videos_dir: Some(dir.path().join("Videos")),
            cache_dir: Some(dir.path().join("cache")),
            ..Config::default()
        };
        adjust(&mut config);

        let back = Arc::new(FixedFrameCamera::new(CameraType::Back, frame_bytes()));
        let front = Arc::new(FixedFrameCamera::new(CameraType::Front, frame_bytes()));
        let backend_log = Arc::new(Mutex::new(Vec::new()));
        let sensor = Arc::new(CountingSensor {
            inner: VirtualSensor::new(Orientation::LandscapeRight),
            registered: AtomicUsize::new(0),
            unregistered: AtomicUsize::new(0),
            reading_delay: Mutex::new(Duration::ZERO),
        });
        let shutter = Arc::new(CountingShutter::default());
        let encoders = Arc::new(SpyEncoderFactory::default());

        let mut devices = HashMap::new();
        devices.insert(CameraType::Back, Arc::clone(&back));
        devices.insert(CameraType::Front, Arc::clone(&front));

        let platform = Platform {
            cameras: Box::new(FixedFrameBackend {
                devices,
                log: Arc::clone(&backend_log),
            }),
            encoders: encoders.clone(),
            sensor: sensor.clone(),
            shutter: shutter.clone(),
            gallery: Arc::new(DirectoryGallery::new(dir.path().join("Gallery"))),
        };

        Self {
            dispatcher: Arc::new(CaptureDispatcher::new(config, platform)),
            dir,
            back,
            front,
            backend_log,
            sensor,
            shutter,
            encoders,
        }
    }

    pub fn backend_calls(&self) -> Vec<BackendCall> {
        self.backend_log.lock().unwrap().clone()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}
