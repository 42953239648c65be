// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio engine for KidSynth.
//!
//! This module provides:
//! - Tone descriptors and the [`ToneEmitter`] interface
//! - A small voice synthesizer
//! - Audio output via cpal, opened off the event loop by [`ToneEmitter::prepare`]

pub mod output;
pub mod synth;
pub mod tone;

pub use output::{AudioConfig, AudioOutput};
pub use synth::Synth;
pub use tone::{NullEmitter, Timbre, Tone, ToneEmitter, ToneGuard, ToneId};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{info, warn};

/// Audio error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// Failed to initialize audio
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),
    /// Failed to start audio stream
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
    /// Failed to acquire lock
    #[error("Failed to acquire audio lock")]
    LockFailed,
    /// No audio device available
    #[error("No audio device available")]
    NoDevice,
    /// Invalid configuration
    #[error("Invalid audio configuration: {0}")]
    InvalidConfig(String),
}

/// Thread owning the cpal stream. Dropping it closes the stream.
struct AudioThread {
    shutdown: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl AudioThread {
    fn spawn(config: AudioConfig, synth: Arc<Mutex<Synth>>) -> Result<Self, AudioError> {
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("kidsynth-audio".to_string())
            .spawn(move || {
                let output = AudioOutput::new(config, move |buffer, channels| {
                    if let Ok(mut synth) = synth.lock() {
                        synth.render(buffer, channels);
                    }
                });
                match output {
                    Ok(output) => {
                        let _ = ready_tx.send(Ok(()));
                        // Park until the owner goes away
                        let _ = shutdown_rx.recv();
                        drop(output);
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| AudioError::InitFailed(format!("Failed to spawn audio thread: {}", e)))?;

        let ready = ready_rx
            .recv()
            .map_err(|_| AudioError::InitFailed("Audio thread exited early".to_string()))?;

        match ready {
            Ok(()) => Ok(Self {
                shutdown: shutdown_tx,
                handle: Some(handle),
            }),
            Err(e) => {
                let _ = handle.join();
                Err(e)
            }
        }
    }
}

impl Drop for AudioThread {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        info!("audio output closed");
    }
}

/// Tone emitter backed by [`Synth`] and the default output device.
///
/// The output stream is opened by [`ToneEmitter::prepare`] and closed when the
/// emitter is dropped. Emitting never opens the device: tones emitted while it
/// is still opening start in the synth and sound once the stream runs. If the
/// device cannot be opened, every emit reports the same error and the
/// application carries on silently.
pub struct SynthEmitter {
    synth: Arc<Mutex<Synth>>,
    config: AudioConfig,
    device: OnceLock<Result<AudioThread, AudioError>>,
    next_id: AtomicU64,
}

impl SynthEmitter {
    /// Create an emitter; no device is touched until `prepare`
    pub fn new(config: AudioConfig) -> Self {
        Self {
            synth: Arc::new(Mutex::new(Synth::new(config.sample_rate))),
            config,
            device: OnceLock::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether the output stream has been opened successfully
    pub fn is_open(&self) -> bool {
        matches!(self.device.get(), Some(Ok(_)))
    }

    /// Number of voices currently sounding
    pub fn active_voices(&self) -> usize {
        self.synth.lock().map(|s| s.active_voices()).unwrap_or(0)
    }

    fn open(&self) -> Result<(), AudioError> {
        let device = self.device.get_or_init(|| {
            let opened = AudioThread::spawn(self.config.clone(), Arc::clone(&self.synth));
            match &opened {
                Ok(_) => info!(latency_ms = self.config.latency_ms(), "audio output opened"),
                Err(e) => warn!("audio output unavailable: {}", e),
            }
            opened
        });
        device.as_ref().map(|_| ()).map_err(Clone::clone)
    }
}

impl ToneEmitter for SynthEmitter {
    fn prepare(&self) -> Result<(), AudioError> {
        self.open()
    }

    fn emit(&self, tone: &Tone) -> Result<ToneId, AudioError> {
        if let Some(Err(e)) = self.device.get() {
            return Err(e.clone());
        }
        let id = ToneId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut synth = self.synth.lock().map_err(|_| AudioError::LockFailed)?;
        synth.start_voice(id, *tone);
        Ok(id)
    }

    fn release(&self, id: ToneId) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.stop_voice(id);
        }
    }

    fn set_volume(&self, volume: f32) {
        if let Ok(mut synth) = self.synth.lock() {
            synth.set_gain(volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_is_lazy() {
        let emitter = SynthEmitter::new(AudioConfig::default());
        assert!(!emitter.is_open());
        assert_eq!(emitter.active_voices(), 0);
    }

    #[test]
    fn test_emit_does_not_open_device() {
        let emitter = SynthEmitter::new(AudioConfig::default());
        let id = emitter.emit(&Tone::count_in()).unwrap();
        assert!(!emitter.is_open());
        assert_eq!(emitter.active_voices(), 1);

        emitter.release(id);
        assert_eq!(emitter.active_voices(), 0);
    }

    #[test]
    fn test_invalid_config_is_reported_on_emit() {
        let emitter = SynthEmitter::new(AudioConfig {
            channels: 0,
            ..Default::default()
        });
        let opened = emitter.prepare();
        assert!(matches!(opened, Err(AudioError::InvalidConfig(_))));
        assert!(!emitter.is_open());

        // Failure is sticky, not retried per tone
        let result = emitter.emit(&Tone::count_in()).map(|_| ());
        assert_eq!(result, opened);
        assert_eq!(emitter.prepare(), opened);
        assert_eq!(emitter.active_voices(), 0);
    }

    #[test]
    fn test_set_volume_reaches_synth() {
        let emitter = SynthEmitter::new(AudioConfig::default());
        emitter.set_volume(0.25);
        assert_eq!(emitter.synth.lock().unwrap().gain(), 0.25);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AudioError::NoDevice.to_string(), "No audio device available");
        assert_eq!(
            AudioError::InvalidConfig("x".into()).to_string(),
            "Invalid audio configuration: x"
        );
    }
}
