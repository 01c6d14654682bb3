// SPDX-License-Identifier: GPL-3.0-only

//! File-writing encoder with recorder lifecycle semantics
//!
//! Once started, a writer thread appends bitrate-sized chunks to the output
//! file every tick and reports the first limit it crosses through the info
//! listener. `stop` only signals the thread; it never joins it, so it is safe
//! to call from inside the listener.

use crate::backends::encoder::{
    EncoderError, EncoderFactory, EncoderInfo, EncoderSettings, InfoListener, MediaEncoder,
};
use std::fs::File;
use std::io::Write;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Interval between writes
const TICK: Duration = Duration::from_millis(100);

/// Container header written by `prepare`
const HEADER: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderPhase {
    Initial,
    Configured,
    Prepared,
    Recording,
    Released,
}

/// Simulated media encoder
pub struct VirtualEncoder {
    phase: EncoderPhase,
    listener: Option<InfoListener>,
    settings: Option<EncoderSettings>,
    output: Option<File>,
    stop_signal: Option<mpsc::Sender<()>>,
}

impl VirtualEncoder {
    pub fn new() -> Self {
        Self {
            phase: EncoderPhase::Initial,
            listener: None,
            settings: None,
            output: None,
            stop_signal: None,
        }
    }

    fn expect_phase(&self, expected: EncoderPhase, call: &str) -> Result<(), EncoderError> {
        if self.phase != expected {
            return Err(EncoderError::IllegalState(format!(
                "{} called in state {:?}",
                call, self.phase
            )));
        }
        Ok(())
    }
}

impl Default for VirtualEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaEncoder for VirtualEncoder {
    fn set_info_listener(&mut self, listener: Option<InfoListener>) {
        self.listener = listener;
    }

    fn configure(&mut self, settings: EncoderSettings) -> Result<(), EncoderError> {
        self.expect_phase(EncoderPhase::Initial, "configure")?;
        debug!(?settings, "Virtual encoder configured");
        self.settings = Some(settings);
        self.phase = EncoderPhase::Configured;
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), EncoderError> {
        self.expect_phase(EncoderPhase::Configured, "prepare")?;
        let Some(settings) = &self.settings else {
            return Err(EncoderError::IllegalState(
                "prepare called without settings".to_string(),
            ));
        };

        let mut output = File::create(&settings.output_path)?;
        output.write_all(HEADER)?;
        self.output = Some(output);
        self.phase = EncoderPhase::Prepared;
        Ok(())
    }

    fn start(&mut self) -> Result<(), EncoderError> {
        self.expect_phase(EncoderPhase::Prepared, "start")?;
        let (Some(settings), Some(output)) = (self.settings.as_ref(), self.output.take()) else {
            return Err(EncoderError::IllegalState(
                "start called without a prepared output".to_string(),
            ));
        };

        let (stop_signal, stopped) = mpsc::channel();
        let writer = Writer {
            output,
            written: HEADER.len() as u64,
            chunk: vec![0u8; chunk_size(settings.profile.video_bitrate_kbps)],
            max_duration: settings.max_duration,
            max_file_size: settings.max_file_size,
            listener: self.listener.clone(),
        };

        thread::Builder::new()
            .name("virtual-encoder".to_string())
            .spawn(move || writer.run(stopped))?;

        self.stop_signal = Some(stop_signal);
        self.phase = EncoderPhase::Recording;
        info!(path = %settings.output_path.display(), "Virtual encoder started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EncoderError> {
        self.expect_phase(EncoderPhase::Recording, "stop")?;
        if let Some(stop_signal) = self.stop_signal.take() {
            // The writer may already have exited after reporting a limit
            let _ = stop_signal.send(());
        }
        self.phase = EncoderPhase::Initial;
        Ok(())
    }

    fn reset(&mut self) {
        self.stop_signal = None;
        self.output = None;
        self.settings = None;
        if self.phase != EncoderPhase::Released {
            self.phase = EncoderPhase::Initial;
        }
    }

    fn release(&mut self) {
        self.reset();
        self.listener = None;
        self.phase = EncoderPhase::Released;
    }
}

/// Bytes written per tick for a bitrate
fn chunk_size(video_bitrate_kbps: u32) -> usize {
    let per_second = u64::from(video_bitrate_kbps) * 1000 / 8;
    (per_second * TICK.as_millis() as u64 / 1000) as usize
}

/// State moved onto the writer thread
struct Writer {
    output: File,
    written: u64,
    chunk: Vec<u8>,
    max_duration: Option<Duration>,
    max_file_size: u64,
    listener: Option<InfoListener>,
}

impl Writer {
    fn run(mut self, stopped: mpsc::Receiver<()>) {
        let started = Instant::now();

        let info = loop {
            match stopped.recv_timeout(TICK) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!(bytes = self.written, "Virtual encoder stopped");
                    return;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            if let Err(e) = self.output.write_all(&self.chunk) {
                break EncoderInfo::Error(e.to_string());
            }
            self.written += self.chunk.len() as u64;

            if self.written >= self.max_file_size {
                break EncoderInfo::MaxFileSizeReached;
            }
            if self
                .max_duration
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                break EncoderInfo::MaxDurationReached;
            }
        };

        if let Err(e) = self.output.flush() {
            warn!(error = %e, "Failed to flush recording");
        }

        debug!(?info, bytes = self.written, "Virtual encoder reporting");
        if let Some(listener) = self.listener {
            listener(info);
        }
    }
}

/// Hands out [`VirtualEncoder`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct VirtualEncoderFactory;

impl EncoderFactory for VirtualEncoderFactory {
    fn create(&self) -> Box<dyn MediaEncoder> {
        Box::new(VirtualEncoder::new())
    }
}
