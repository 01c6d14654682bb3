// SPDX-License-Identifier: GPL-3.0-only

//! Video recording state machine
//!
//! ```text
//! Idle ──start──▶ Configuring ──prepare/start ok──▶ Recording
//!  ▲                   │                               │
//!  │                   └─error──▶ Releasing ◀──stop/limit/error
//!  └────────────────────────────────┘
//! ```
//!
//! The state mutex is never held across encoder calls. Encoders deliver limit
//! notifications from their own threads and those land in
//! [`VideoRecorder::handle_event`], which may run the release routine directly.
//!
//! A session lives in exactly one place: the `start` call while configuring,
//! or the shared state while recording. Whoever takes it out runs the release,
//! so the completion slot is signaled exactly once.

use super::profile::{QualityTier, RecordingLimits};
use crate::backends::camera::{CameraHandle, EncoderLease};
use crate::backends::encoder::{
    AudioSource, EncoderFactory, EncoderInfo, EncoderSettings, InfoListener, MediaEncoder,
    VideoSource,
};
use crate::completion::{Completion, CompletionSlot};
use crate::constants::STOP_ACKNOWLEDGEMENT;
use crate::errors::{CaptureError, RecordingError};
use crate::request::{CaptureRequest, CaptureTarget};
use crate::storage::{MediaDestination, MediaKind, Persistence, StorageLocations};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, error, info, warn};

/// Something that ends a recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    StopRequested,
    MaxDurationReached,
    MaxFileSizeReached,
    Error(String),
}

impl From<EncoderInfo> for RecorderEvent {
    fn from(info: EncoderInfo) -> Self {
        match info {
            EncoderInfo::MaxDurationReached => RecorderEvent::MaxDurationReached,
            EncoderInfo::MaxFileSizeReached => RecorderEvent::MaxFileSizeReached,
            EncoderInfo::Error(cause) => RecorderEvent::Error(cause),
        }
    }
}

impl RecorderEvent {
    /// Outcome reported to the caller when this event ends the session
    fn outcome(&self) -> Result<(), CaptureError> {
        match self {
            RecorderEvent::StopRequested
            | RecorderEvent::MaxDurationReached
            | RecorderEvent::MaxFileSizeReached => Ok(()),
            RecorderEvent::Error(cause) => Err(RecordingError::Runtime(cause.clone()).into()),
        }
    }
}

/// Observable recorder phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    Idle,
    Configuring,
    Recording,
    Releasing,
}

/// Resources owned by one recording
struct RecordingSession {
    id: u64,
    slot: CompletionSlot<String>,
    destination: Option<MediaDestination>,
    encoder: Option<Box<dyn MediaEncoder>>,
    lease: Option<EncoderLease>,
    started: bool,
}

impl RecordingSession {
    fn new(id: u64, slot: CompletionSlot<String>) -> Self {
        Self {
            id,
            slot,
            destination: None,
            encoder: None,
            lease: None,
            started: false,
        }
    }
}

enum RecorderState {
    Idle,
    /// `pending` holds the first event that arrived before start finished
    Configuring {
        session: u64,
        pending: Option<RecorderEvent>,
    },
    Recording(RecordingSession),
    Releasing,
}

impl RecorderState {
    fn phase(&self) -> RecorderPhase {
        match self {
            RecorderState::Idle => RecorderPhase::Idle,
            RecorderState::Configuring { .. } => RecorderPhase::Configuring,
            RecorderState::Recording(_) => RecorderPhase::Recording,
            RecorderState::Releasing => RecorderPhase::Releasing,
        }
    }
}

/// Records video from a camera handle into a resolved destination
///
/// One recording at a time. Shared as `Arc<VideoRecorder>` so encoder
/// listeners can reach it.
pub struct VideoRecorder {
    state: Mutex<RecorderState>,
    next_session: AtomicU64,
    storage: StorageLocations,
    encoders: Arc<dyn EncoderFactory>,
    limits: RecordingLimits,
    record_audio: bool,
}

impl VideoRecorder {
    pub fn new(
        storage: StorageLocations,
        encoders: Arc<dyn EncoderFactory>,
        limits: RecordingLimits,
        record_audio: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RecorderState::Idle),
            next_session: AtomicU64::new(1),
            storage,
            encoders,
            limits,
            record_audio,
        })
    }

    pub fn phase(&self) -> RecorderPhase {
        self.lock_state().phase()
    }

    /// True unless the recorder is idle
    pub fn is_active(&self) -> bool {
        self.phase() != RecorderPhase::Idle
    }

    /// Begin recording `camera` according to `request`
    ///
    /// The returned completion resolves with the destination URI once the
    /// recording is stopped or hits a limit, and rejects if it could not be
    /// started or the encoder fails.
    pub fn start(
        self: &Arc<Self>,
        request: &CaptureRequest,
        camera: &CameraHandle,
    ) -> Completion<String> {
        let (slot, completion) = CompletionSlot::new();

        let id = {
            let mut state = self.lock_state();
            if !matches!(*state, RecorderState::Idle) {
                warn!(phase = ?state.phase(), "Rejecting video request, recorder is busy");
                slot.reject(RecordingError::AlreadyRecording.into());
                return completion;
            }
            let id = self.next_session.fetch_add(1, Ordering::Relaxed);
            *state = RecorderState::Configuring {
                session: id,
                pending: None,
            };
            id
        };

        let mut session = RecordingSession::new(id, slot);
        if let Err(e) = self.configure(request, camera, &mut session) {
            self.release(session, Err(e));
            return completion;
        }

        let mut state = self.lock_state();
        let pending = match &mut *state {
            RecorderState::Configuring { pending, .. } => pending.take(),
            _ => None,
        };

        match pending {
            None => {
                *state = RecorderState::Recording(session);
                drop(state);
                info!(camera = %camera.camera(), session = id, "Recording started");
            }
            Some(event) => {
                *state = RecorderState::Releasing;
                drop(state);
                debug!(?event, "Applying event received while configuring");
                self.release(session, event.outcome());
            }
        }

        completion
    }

    /// Stop the active recording, if any
    pub fn stop(&self) -> &'static str {
        self.handle_event(RecorderEvent::StopRequested);
        STOP_ACKNOWLEDGEMENT
    }

    /// Feed an event into the machine
    ///
    /// Ends the active recording, is held until start finishes while
    /// configuring, and is ignored otherwise.
    pub fn handle_event(&self, event: RecorderEvent) {
        self.dispatch_event(None, event);
    }

    /// Apply `event`, dropping it when it was raised for another session
    fn dispatch_event(&self, origin: Option<u64>, event: RecorderEvent) {
        let stale = |current: u64| origin.is_some_and(|origin| origin != current);

        let session = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, RecorderState::Idle) {
                RecorderState::Recording(session) if stale(session.id) => {
                    debug!(
                        ?event,
                        ?origin,
                        current = session.id,
                        "Ignoring event from a finished session"
                    );
                    *state = RecorderState::Recording(session);
                    return;
                }
                RecorderState::Recording(session) => {
                    *state = RecorderState::Releasing;
                    session
                }
                RecorderState::Configuring { session, pending } => {
                    if stale(session) {
                        debug!(
                            ?event,
                            ?origin,
                            current = session,
                            "Ignoring event from a finished session"
                        );
                    } else {
                        debug!(?event, "Holding event until recording starts");
                    }
                    let pending = match pending {
                        None if !stale(session) => Some(event),
                        pending => pending,
                    };
                    *state = RecorderState::Configuring { session, pending };
                    return;
                }
                other => {
                    debug!(?event, phase = ?other.phase(), "No active recording, ignoring event");
                    *state = other;
                    return;
                }
            }
        };

        info!(?event, "Ending recording");
        self.release(session, event.outcome());
    }

    fn configure(
        self: &Arc<Self>,
        request: &CaptureRequest,
        camera: &CameraHandle,
        session: &mut RecordingSession,
    ) -> Result<(), CaptureError> {
        let tier = QualityTier::parse(request.quality.as_deref())?;

        let persistence = match request.target {
            CaptureTarget::Disk => Persistence::Persistent,
            CaptureTarget::Temp => Persistence::Temporary,
            CaptureTarget::Memory | CaptureTarget::CameraRoll => {
                debug!(target = ?request.target, "Video cannot target this, using a temporary file");
                Persistence::Temporary
            }
        };
        let destination = self.storage.resolve(MediaKind::Video, persistence)?;
        let output_path = destination.path.clone();
        session.destination = Some(destination);

        let encoder = session.encoder.insert(self.encoders.create());

        let lease = camera.hand_to_encoder()?;
        let device = lease.device();
        session.lease = Some(lease);

        encoder.set_info_listener(Some(self.info_listener(session.id)));

        let settings = EncoderSettings {
            camera: device,
            audio_source: self.record_audio.then_some(AudioSource::Camcorder),
            video_source: VideoSource::Camera,
            profile: tier.profile(),
            output_path,
            max_duration: self.limits.max_duration(request.total_seconds),
            max_file_size: self.limits.max_file_size,
        };
        debug!(?settings, "Configuring encoder");

        encoder.configure(settings).map_err(RecordingError::Configure)?;
        encoder.prepare().map_err(RecordingError::Prepare)?;
        encoder.start().map_err(RecordingError::Start)?;
        session.started = true;

        Ok(())
    }

    /// Listener bound to session `id`; later sessions ignore it
    fn info_listener(self: &Arc<Self>, id: u64) -> InfoListener {
        let recorder: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |info| {
            if let Some(recorder) = recorder.upgrade() {
                recorder.dispatch_event(Some(id), info.into());
            }
        })
    }

    /// Tear a session down and signal its caller
    fn release(&self, mut session: RecordingSession, outcome: Result<(), CaptureError>) {
        *self.lock_state() = RecorderState::Releasing;

        if let Some(mut encoder) = session.encoder.take() {
            encoder.set_info_listener(None);
            if session.started {
                if let Err(e) = encoder.stop() {
                    warn!(error = %e, "Failed to stop encoder");
                }
            }
            encoder.reset();
            encoder.release();
        }

        if let Some(lease) = session.lease.take() {
            lease.give_back();
        }

        *self.lock_state() = RecorderState::Idle;

        let result = outcome.and_then(|()| {
            session
                .destination
                .as_ref()
                .map(MediaDestination::uri)
                .ok_or_else(|| RecordingError::MissingDestination.into())
        });

        match &result {
            Ok(uri) => info!(uri = %uri, "Recording finished"),
            Err(e) => error!(error = %e, "Recording failed"),
        }
        session.slot.complete(result);
    }

    fn lock_state(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for VideoRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoRecorder")
            .field("phase", &self.phase())
            .field("limits", &self.limits)
            .field("record_audio", &self.record_audio)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{CameraManager, Ownership};
    use crate::backends::encoder::{EncoderError, ProfilePreset};
    use crate::backends::virtual_camera::VirtualBackend;
    use crate::request::CameraType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Script {
        fail_prepare: Option<String>,
        event_on_start: Option<EncoderInfo>,
    }

    #[derive(Default)]
    struct Journal {
        calls: Vec<&'static str>,
        settings: Option<EncoderSettings>,
        listener: Option<InfoListener>,
    }

    struct ScriptedEncoder {
        script: Script,
        journal: Arc<Mutex<Journal>>,
    }

    impl MediaEncoder for ScriptedEncoder {
        fn set_info_listener(&mut self, listener: Option<InfoListener>) {
            let mut journal = self.journal.lock().unwrap();
            journal.calls.push(if listener.is_some() {
                "listen"
            } else {
                "unlisten"
            });
            journal.listener = listener;
        }

        fn configure(&mut self, settings: EncoderSettings) -> Result<(), EncoderError> {
            let mut journal = self.journal.lock().unwrap();
            journal.calls.push("configure");
            journal.settings = Some(settings);
            Ok(())
        }

        fn prepare(&mut self) -> Result<(), EncoderError> {
            self.journal.lock().unwrap().calls.push("prepare");
            match &self.script.fail_prepare {
                Some(cause) => Err(EncoderError::IllegalState(cause.clone())),
                None => Ok(()),
            }
        }

        fn start(&mut self) -> Result<(), EncoderError> {
            let listener = {
                let mut journal = self.journal.lock().unwrap();
                journal.calls.push("start");
                journal.listener.clone()
            };
            if let (Some(info), Some(listener)) = (self.script.event_on_start.clone(), listener) {
                listener(info);
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), EncoderError> {
            self.journal.lock().unwrap().calls.push("stop");
            Ok(())
        }

        fn reset(&mut self) {
            self.journal.lock().unwrap().calls.push("reset");
        }

        fn release(&mut self) {
            self.journal.lock().unwrap().calls.push("release");
        }
    }

    struct ScriptedFactory {
        script: Script,
        journal: Arc<Mutex<Journal>>,
        created: AtomicUsize,
    }

    impl EncoderFactory for ScriptedFactory {
        fn create(&self) -> Box<dyn MediaEncoder> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Box::new(ScriptedEncoder {
                script: self.script.clone(),
                journal: Arc::clone(&self.journal),
            })
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        recorder: Arc<VideoRecorder>,
        factory: Arc<ScriptedFactory>,
        journal: Arc<Mutex<Journal>>,
        handle: CameraHandle,
        storage: StorageLocations,
    }

    impl Fixture {
        fn new(script: Script) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let storage = StorageLocations::new(
                dir.path().join("Pictures"),
                dir.path().join("Videos"),
                dir.path().join("cache"),
                "Camera",
            );
            let journal = Arc::new(Mutex::new(Journal::default()));
            let factory = Arc::new(ScriptedFactory {
                script,
                journal: Arc::clone(&journal),
                created: AtomicUsize::new(0),
            });
            let recorder = VideoRecorder::new(
                storage.clone(),
                factory.clone(),
                RecordingLimits::default(),
                true,
            );
            let manager = CameraManager::new(Box::new(VirtualBackend::new()));
            let handle = manager.acquire(CameraType::Back).unwrap();

            Self {
                _dir: dir,
                recorder,
                factory,
                journal,
                handle,
                storage,
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.journal.lock().unwrap().calls.clone()
        }

        fn listener(&self) -> InfoListener {
            self.journal.lock().unwrap().listener.clone().unwrap()
        }
    }

    fn video(target: CaptureTarget) -> CaptureRequest {
        CaptureRequest::video(CameraType::Back, target)
    }

    #[tokio::test]
    async fn test_short_duration_raised_to_floor() {
        let fx = Fixture::new(Script::default());
        let completion = fx.recorder.start(
            &video(CaptureTarget::Temp)
                .with_quality("low")
                .with_total_seconds(2),
            &fx.handle,
        );

        assert_eq!(fx.recorder.phase(), RecorderPhase::Recording);
        assert_eq!(fx.handle.ownership(), Ownership::Encoder);
        {
            let journal = fx.journal.lock().unwrap();
            let settings = journal.settings.as_ref().unwrap();
            assert_eq!(settings.max_duration, Some(Duration::from_secs(4)));
            assert_eq!(settings.max_file_size, 100_000_000);
            assert_eq!(settings.profile.preset, ProfilePreset::Low);
            assert_eq!(settings.audio_source, Some(AudioSource::Camcorder));
        }

        fx.listener()(EncoderInfo::MaxDurationReached);

        let uri = completion.await.unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with(".mp4"));
        assert_eq!(fx.recorder.phase(), RecorderPhase::Idle);
        assert_eq!(fx.handle.ownership(), Ownership::Preview);
    }

    #[tokio::test]
    async fn test_unknown_quality_allocates_nothing() {
        let fx = Fixture::new(Script::default());
        let completion = fx
            .recorder
            .start(&video(CaptureTarget::Temp).with_quality("ultra"), &fx.handle);

        let err = completion.await.unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedQuality(_)));
        assert_eq!(fx.factory.created.load(Ordering::SeqCst), 0);
        assert_eq!(fx.handle.ownership(), Ownership::Preview);
        assert_eq!(fx.recorder.phase(), RecorderPhase::Idle);
    }

    #[tokio::test]
    async fn test_prepare_failure_reports_cause_and_releases() {
        let fx = Fixture::new(Script {
            fail_prepare: Some("prepare called before configure".to_string()),
            ..Script::default()
        });
        let completion = fx.recorder.start(&video(CaptureTarget::Temp), &fx.handle);

        let err = completion.await.unwrap_err();
        assert!(err.to_string().contains("prepare called before configure"));
        assert_eq!(
            fx.calls(),
            vec!["listen", "configure", "prepare", "unlisten", "reset", "release"]
        );
        assert_eq!(fx.handle.ownership(), Ownership::Preview);
        assert_eq!(fx.recorder.phase(), RecorderPhase::Idle);
    }

    #[tokio::test]
    async fn test_second_start_rejected_without_touching_first() {
        let fx = Fixture::new(Script::default());
        let first = fx.recorder.start(&video(CaptureTarget::Disk), &fx.handle);
        let second = fx.recorder.start(&video(CaptureTarget::Disk), &fx.handle);

        assert!(matches!(
            second.await,
            Err(CaptureError::Recording(RecordingError::AlreadyRecording))
        ));
        assert_eq!(fx.recorder.phase(), RecorderPhase::Recording);
        assert_eq!(fx.factory.created.load(Ordering::SeqCst), 1);

        assert_eq!(fx.recorder.stop(), "Stopped capture");
        let uri = first.await.unwrap();
        assert!(uri.contains("VID_"));
        let path = url::Url::parse(&uri).unwrap().to_file_path().unwrap();
        assert!(path.starts_with(fx.storage.media_dir(MediaKind::Video)));
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            0,
            "the scripted encoder never writes the file"
        );
    }

    #[test]
    fn test_stop_when_idle_is_acknowledged() {
        let fx = Fixture::new(Script::default());
        assert_eq!(fx.recorder.stop(), STOP_ACKNOWLEDGEMENT);
        assert_eq!(fx.recorder.phase(), RecorderPhase::Idle);
        assert!(fx.calls().is_empty());
    }

    #[tokio::test]
    async fn test_event_during_configuring_applied_after_start() {
        let fx = Fixture::new(Script {
            event_on_start: Some(EncoderInfo::Error("codec fault".to_string())),
            ..Script::default()
        });
        let completion = fx.recorder.start(&video(CaptureTarget::Temp), &fx.handle);

        let err = completion.await.unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Recording(RecordingError::Runtime(ref cause)) if cause == "codec fault"
        ));
        let calls = fx.calls();
        assert_eq!(&calls[calls.len() - 4..], &["unlisten", "stop", "reset", "release"]);
        assert_eq!(fx.handle.ownership(), Ownership::Preview);
    }

    #[tokio::test]
    async fn test_duplicate_limit_events_release_once() {
        let fx = Fixture::new(Script::default());
        let completion = fx.recorder.start(&video(CaptureTarget::Temp), &fx.handle);

        let listener = fx.listener();
        listener(EncoderInfo::MaxFileSizeReached);
        listener(EncoderInfo::MaxFileSizeReached);
        fx.recorder.stop();

        assert!(completion.await.is_ok());
        let releases = fx.calls().iter().filter(|c| **c == "release").count();
        assert_eq!(releases, 1);
    }

    #[tokio::test]
    async fn test_late_event_from_finished_session_is_ignored() {
        let fx = Fixture::new(Script::default());
        let first = fx.recorder.start(&video(CaptureTarget::Temp), &fx.handle);
        let first_listener = fx.listener();
        fx.recorder.stop();
        first.await.unwrap();

        let mut second = fx.recorder.start(&video(CaptureTarget::Temp), &fx.handle);
        first_listener(EncoderInfo::MaxDurationReached);

        assert_eq!(fx.recorder.phase(), RecorderPhase::Recording);
        assert!(second.try_take().is_none(), "second recording must keep running");

        fx.listener()(EncoderInfo::MaxDurationReached);
        assert!(second.await.is_ok());
        assert_eq!(fx.recorder.phase(), RecorderPhase::Idle);
    }

    #[tokio::test]
    async fn test_memory_target_falls_back_to_cache() {
        let fx = Fixture::new(Script::default());
        let completion = fx.recorder.start(&video(CaptureTarget::Memory), &fx.handle);

        let output = {
            let journal = fx.journal.lock().unwrap();
            journal.settings.as_ref().unwrap().output_path.clone()
        };
        assert!(output.starts_with(fx.storage.cache_dir()));

        fx.recorder.stop();
        completion.await.unwrap();
    }

    #[tokio::test]
    async fn test_busy_handle_rejected_and_lease_untouched() {
        let fx = Fixture::new(Script::default());
        let lease = fx.handle.hand_to_encoder().unwrap();

        let completion = fx.recorder.start(&video(CaptureTarget::Temp), &fx.handle);
        assert!(matches!(completion.await, Err(CaptureError::CameraBusy(_))));
        assert_eq!(fx.calls(), vec!["unlisten", "reset", "release"]);
        assert_eq!(fx.handle.ownership(), Ownership::Encoder);

        lease.give_back();
        assert_eq!(fx.handle.ownership(), Ownership::Preview);
    }
}
