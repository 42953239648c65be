// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Small polyphonic tone synthesizer.
//!
//! Renders sine voices with per-timbre envelopes into interleaved buffers.
//! Voices are keyed by [`ToneId`] and stay alive until released; a voice
//! left unreleased long past its duration is reaped during rendering.

use std::f32::consts::TAU;

use super::tone::{Timbre, Tone, ToneId};

const SUSTAIN_PEAK: f32 = 0.5;
const SUSTAIN_ATTACK: f32 = 0.01;
const CLICK_ATTACK: f32 = 0.001;
const CLICK_DECAY: f32 = 0.05;
const ENVELOPE_FLOOR: f32 = 0.01;
/// Voices older than duration + this many seconds are dropped
const REAP_GRACE_SECS: f32 = 1.0;

/// Exponential ramp from `from` to `to` over `length` seconds
fn exp_ramp(from: f32, to: f32, t: f32, length: f32) -> f32 {
    if length <= 0.0 {
        return to;
    }
    from * (to / from).powf(t / length)
}

#[derive(Debug, Clone)]
struct SynthVoice {
    id: ToneId,
    tone: Tone,
    phase: f32,
    age: f32,
}

impl SynthVoice {
    fn new(id: ToneId, tone: Tone) -> Self {
        Self {
            id,
            tone,
            phase: 0.0,
            age: 0.0,
        }
    }

    fn duration(&self) -> f32 {
        self.tone.duration.as_secs_f32()
    }

    /// Gain and instantaneous frequency at the current age
    fn envelope(&self) -> (f32, f32) {
        let t = self.age;
        match self.tone.timbre {
            Timbre::Sustained => {
                let gain = if t < SUSTAIN_ATTACK {
                    SUSTAIN_PEAK * t / SUSTAIN_ATTACK
                } else {
                    exp_ramp(
                        SUSTAIN_PEAK,
                        ENVELOPE_FLOOR,
                        t - SUSTAIN_ATTACK,
                        self.duration() - SUSTAIN_ATTACK,
                    )
                };
                (gain, self.tone.frequency)
            }
            Timbre::Percussive => {
                let decay = self.duration();
                let t = t.min(decay);
                let frequency = exp_ramp(self.tone.frequency, 1.0, t, decay);
                (exp_ramp(1.0, ENVELOPE_FLOOR, t, decay), frequency)
            }
            Timbre::Click { accent } => {
                let peak = if accent { 0.3 } else { 0.2 };
                let gain = if t < CLICK_ATTACK {
                    peak * t / CLICK_ATTACK
                } else {
                    exp_ramp(peak, ENVELOPE_FLOOR, t - CLICK_ATTACK, CLICK_DECAY)
                };
                (gain, self.tone.frequency)
            }
        }
    }

    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let (gain, frequency) = self.envelope();
        let sample = (self.phase * TAU).sin() * gain;
        self.phase = (self.phase + frequency / sample_rate).fract();
        self.age += 1.0 / sample_rate;
        sample
    }

    fn expired(&self) -> bool {
        self.age > self.duration() + REAP_GRACE_SECS
    }
}

/// Voice mixer
#[derive(Debug)]
pub struct Synth {
    voices: Vec<SynthVoice>,
    sample_rate: f32,
    /// Master gain (0.0 - 1.0)
    gain: f32,
}

impl Synth {
    /// Create a synth rendering at the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            voices: Vec::with_capacity(64),
            sample_rate: sample_rate as f32,
            gain: 0.75,
        }
    }

    /// Start a voice
    pub fn start_voice(&mut self, id: ToneId, tone: Tone) {
        self.voices.push(SynthVoice::new(id, tone));
    }

    /// Stop and drop a voice
    pub fn stop_voice(&mut self, id: ToneId) {
        self.voices.retain(|voice| voice.id != id);
    }

    /// Number of sounding voices
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Set master gain (0.0 - 1.0)
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    /// Get master gain
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Render and mix all voices into an interleaved buffer
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in buffer.chunks_mut(channels) {
            let mut mixed = 0.0;
            for voice in self.voices.iter_mut() {
                mixed += voice.next_sample(self.sample_rate);
            }
            let value = (mixed * self.gain).clamp(-1.0, 1.0);
            for sample in frame.iter_mut() {
                *sample += value;
            }
        }
        self.voices.retain(|voice| !voice.expired());
    }
}
