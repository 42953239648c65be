// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tone descriptors and the emitter interface.
//!
//! Every audible event in the application (pad presses, playback notes,
//! metronome and count-in clicks) goes through a [`ToneEmitter`]. Emitting a
//! tone returns an id; the caller owns releasing it after the tone's duration.
//! [`ToneGuard`] ties that release to scope so it happens on every path.

use std::sync::Arc;
use std::time::Duration;

use crate::music::Pad;

use super::AudioError;

/// Length of a sustained (non-drum) pad tone
pub const SUSTAIN_DURATION: Duration = Duration::from_millis(500);
/// Decay length of a drum hit
pub const DRUM_DECAY: Duration = Duration::from_millis(100);
/// Length of a metronome click
pub const CLICK_DURATION: Duration = Duration::from_millis(50);
/// Length of a count-in click
pub const COUNT_IN_CLICK_DURATION: Duration = Duration::from_millis(100);

/// Accented click pitch (bar downbeat)
pub const ACCENT_CLICK_HZ: f32 = 1000.0;
/// Plain click pitch
pub const PLAIN_CLICK_HZ: f32 = 800.0;

/// Sound character of a tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timbre {
    /// Sine tone with a short attack and exponential decay
    Sustained,
    /// Pitch-dropping hit with a fast decay
    Percussive,
    /// Metronome click
    Click { accent: bool },
}

/// A single fire-and-forget sound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub timbre: Timbre,
    pub frequency: f32,
    /// How long the tone is held before release
    pub duration: Duration,
}

impl Tone {
    /// Tone for a pad press or a recorded note
    pub fn for_pad(pad: &Pad) -> Self {
        if pad.is_drum {
            Self {
                timbre: Timbre::Percussive,
                frequency: pad.frequency,
                duration: DRUM_DECAY,
            }
        } else {
            Self {
                timbre: Timbre::Sustained,
                frequency: pad.frequency,
                duration: SUSTAIN_DURATION,
            }
        }
    }

    /// Metronome click on a subdivision tick
    pub fn metronome(accent: bool) -> Self {
        Self {
            timbre: Timbre::Click { accent },
            frequency: if accent { ACCENT_CLICK_HZ } else { PLAIN_CLICK_HZ },
            duration: CLICK_DURATION,
        }
    }

    /// Unaccented count-in click
    pub fn count_in() -> Self {
        Self {
            timbre: Timbre::Click { accent: false },
            frequency: PLAIN_CLICK_HZ,
            duration: COUNT_IN_CLICK_DURATION,
        }
    }

    /// Whether this is a metronome or count-in click
    pub fn is_click(&self) -> bool {
        matches!(self.timbre, Timbre::Click { .. })
    }
}

/// Handle to an emitted tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToneId(pub u64);

/// Produces audible events. Implementations must tolerate a call every few
/// milliseconds without leaking per-tone resources.
pub trait ToneEmitter: Send + Sync {
    /// Open whatever backs the emitter. May block; call it off the async
    /// threads. Emitting before this returns must not block either.
    fn prepare(&self) -> Result<(), AudioError> {
        Ok(())
    }

    /// Start sounding a tone
    fn emit(&self, tone: &Tone) -> Result<ToneId, AudioError>;

    /// Stop a tone and free whatever it holds. Unknown ids are ignored.
    fn release(&self, id: ToneId);

    /// Master volume, 0.0 - 1.0
    fn set_volume(&self, _volume: f32) {}
}

/// Releases its tone when dropped
pub struct ToneGuard {
    emitter: Arc<dyn ToneEmitter>,
    id: ToneId,
}

impl ToneGuard {
    /// Emit a tone and take ownership of its release
    pub fn acquire(emitter: Arc<dyn ToneEmitter>, tone: &Tone) -> Result<Self, AudioError> {
        let id = emitter.emit(tone)?;
        Ok(Self { emitter, id })
    }

    /// Id of the held tone
    pub fn id(&self) -> ToneId {
        self.id
    }
}

impl Drop for ToneGuard {
    fn drop(&mut self) {
        self.emitter.release(self.id);
    }
}

/// Emitter that makes no sound, for headless runs
#[derive(Debug, Default)]
pub struct NullEmitter {
    next_id: std::sync::atomic::AtomicU64,
}

impl ToneEmitter for NullEmitter {
    fn emit(&self, _tone: &Tone) -> Result<ToneId, AudioError> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Ok(ToneId(id))
    }

    fn release(&self, _id: ToneId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{BASS_PADS, MELODY_PADS};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingEmitter {
        live: Mutex<Vec<ToneId>>,
        next: Mutex<u64>,
    }

    impl ToneEmitter for CountingEmitter {
        fn emit(&self, _tone: &Tone) -> Result<ToneId, AudioError> {
            let mut next = self.next.lock().unwrap();
            *next += 1;
            let id = ToneId(*next);
            self.live.lock().unwrap().push(id);
            Ok(id)
        }

        fn release(&self, id: ToneId) {
            self.live.lock().unwrap().retain(|live| *live != id);
        }
    }

    #[test]
    fn test_pad_timbres() {
        let note = Tone::for_pad(&BASS_PADS[0]);
        assert_eq!(note.timbre, Timbre::Sustained);
        assert_eq!(note.duration, SUSTAIN_DURATION);

        let kick = Tone::for_pad(&MELODY_PADS[12]);
        assert_eq!(kick.timbre, Timbre::Percussive);
        assert_eq!(kick.duration, DRUM_DECAY);
        assert_eq!(kick.frequency, 100.0);
    }

    #[test]
    fn test_click_tones() {
        let accent = Tone::metronome(true);
        assert_eq!(accent.frequency, ACCENT_CLICK_HZ);
        assert!(accent.is_click());

        let plain = Tone::metronome(false);
        assert_eq!(plain.frequency, PLAIN_CLICK_HZ);

        let count = Tone::count_in();
        assert_eq!(count.timbre, Timbre::Click { accent: false });
        assert_eq!(count.duration, COUNT_IN_CLICK_DURATION);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let emitter = Arc::new(CountingEmitter::default());
        {
            let guard = ToneGuard::acquire(emitter.clone(), &Tone::metronome(true)).unwrap();
            assert_eq!(emitter.live.lock().unwrap().as_slice(), &[guard.id()]);
        }
        assert!(emitter.live.lock().unwrap().is_empty());
    }

    #[test]
    fn test_null_emitter_ids_increase() {
        let emitter = NullEmitter::default();
        let a = emitter.emit(&Tone::count_in()).unwrap();
        let b = emitter.emit(&Tone::count_in()).unwrap();
        assert!(b > a);
    }
}
