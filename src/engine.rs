// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer engine.
//!
//! Owns the transport clock, the recording workflow and the pattern store,
//! and turns user intents and timer ticks into [`Effect`]s. The engine never
//! sleeps or touches audio itself; the caller passes in the current instant
//! and carries out the returned effects.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::audio::Tone;
use crate::config::Settings;
use crate::music::PadSet;
use crate::recording::{BarClick, BarRecorder, CountInTick, RecordPress};
use crate::sequencer::{dispatch_bar, preset, preset_pad_set, Pattern, PatternStore, BAR_COUNT};
use crate::timing::TransportClock;

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

/// Something the runtime must do on the engine's behalf
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Emit a tone after `delay`
    Tone { tone: Tone, delay: Duration },
    /// Start the subdivision timer, first tick immediately
    StartClock { period: Duration },
    /// Cancel the subdivision timer
    StopClock,
    /// Start the count-in timer, first tick immediately
    StartCountIn { period: Duration },
    /// Cancel the count-in timer
    CancelCountIn,
    /// Set the master volume (0.0 - 1.0)
    Volume(f32),
}

impl Effect {
    fn now(tone: Tone) -> Self {
        Effect::Tone {
            tone,
            delay: Duration::ZERO,
        }
    }
}

/// User intents from the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    PressPad(usize),
    ClickBar(usize),
    PressPlay,
    PressRecord,
    PressLoop,
    SetTempo(f64),
    SetVolume(u8),
    Reset,
    LoadPreset(String),
    LoadDemo,
    TogglePadSet,
    CancelCountIn,
    Quit,
}

/// State shown by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub current_bar: usize,
    pub running: bool,
    pub recording: bool,
    pub counting_in: bool,
    pub looping: bool,
    pub has_content: [bool; BAR_COUNT],
    pub selected_bar: Option<usize>,
    pub tempo: f64,
    pub volume: u8,
    pub pad_set: PadSet,
    pub pad_labels: Vec<&'static str>,
    /// Last rejected action or failure, for the status line
    pub notice: Option<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Engine::new().snapshot()
    }
}

/// The sequencer engine
#[derive(Debug, Clone)]
pub struct Engine {
    clock: TransportClock,
    recorder: BarRecorder,
    store: PatternStore,
    pad_set: PadSet,
    volume: u8,
    notice: Option<String>,
}

impl Engine {
    /// Engine with default settings and the bass preset loaded
    pub fn new() -> Self {
        let mut engine = Self::empty(&Settings::default());
        if let Some(pattern) = preset("bass") {
            engine.store.replace_all(&pattern);
        }
        engine
    }

    /// Build an engine from start-up settings
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let mut engine = Self::empty(settings);
        if !settings.starts_empty() {
            engine.load_preset(&settings.preset)?;
        }
        Ok(engine)
    }

    fn empty(settings: &Settings) -> Self {
        let mut clock = TransportClock::new(settings.tempo);
        clock.set_looping(settings.looping);
        Self {
            clock,
            recorder: BarRecorder::new(),
            store: PatternStore::new(),
            pad_set: settings.pad_set,
            volume: settings.volume.min(100),
            notice: None,
        }
    }

    /// Transport clock
    pub fn clock(&self) -> &TransportClock {
        &self.clock
    }

    /// Pattern store
    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// Active pad set
    pub fn pad_set(&self) -> PadSet {
        self.pad_set
    }

    /// Master volume as a gain factor
    pub fn gain(&self) -> f32 {
        self.volume as f32 / 100.0
    }

    /// Report a non-fatal problem to the presentation layer
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Replace the whole pattern with a preset and switch to the pad set
    /// it was written for
    pub fn load_preset(&mut self, name: &str) -> Result<(), EngineError> {
        let unknown = || EngineError::UnknownPreset(name.to_string());
        let pattern = preset(name).ok_or_else(unknown)?;
        let pad_set = preset_pad_set(name).ok_or_else(unknown)?;
        self.load_pattern(&pattern);
        self.pad_set = pad_set;
        info!(preset = name, bars = pattern.len(), pad_set = %pad_set, "preset loaded");
        Ok(())
    }

    /// Replace the whole pattern
    pub fn load_pattern(&mut self, pattern: &Pattern) {
        self.store.replace_all(pattern);
    }

    /// Handle one user intent
    pub fn apply(&mut self, intent: Intent, now: Instant) -> Vec<Effect> {
        self.notice = None;
        match intent {
            Intent::PressPad(pad) => self.press_pad(pad, now),
            Intent::ClickBar(bar) => self.click_bar(bar, now),
            Intent::PressPlay => self.press_play(),
            Intent::PressRecord => self.press_record(),
            Intent::PressLoop => {
                let looping = !self.clock.looping();
                self.clock.set_looping(looping);
                info!(looping, "loop toggled");
                Vec::new()
            }
            Intent::SetTempo(bpm) => {
                self.set_tempo(bpm);
                Vec::new()
            }
            Intent::SetVolume(volume) => {
                self.volume = volume.min(100);
                debug!(volume = self.volume, "volume changed");
                vec![Effect::Volume(self.gain())]
            }
            Intent::Reset => self.reset(),
            Intent::LoadPreset(name) => {
                if let Err(e) = self.load_preset(&name) {
                    warn!(error = %e, "preset not loaded");
                    self.notice = Some(e.to_string());
                }
                Vec::new()
            }
            Intent::LoadDemo => {
                let name = self.pad_set.demo_preset();
                if let Err(e) = self.load_preset(name) {
                    warn!(error = %e, "demo not loaded");
                    self.notice = Some(e.to_string());
                }
                Vec::new()
            }
            Intent::TogglePadSet => {
                self.pad_set = self.pad_set.toggled();
                info!(pad_set = %self.pad_set, "pad set switched");
                Vec::new()
            }
            Intent::CancelCountIn => {
                if self.recorder.cancel_count_in() {
                    vec![Effect::CancelCountIn]
                } else {
                    Vec::new()
                }
            }
            Intent::Quit => Vec::new(),
        }
    }

    fn press_pad(&mut self, pad: usize, now: Instant) -> Vec<Effect> {
        debug_assert!(
            pad < self.pad_set.len(),
            "pad index {} out of range for {}",
            pad,
            self.pad_set
        );
        let Some(descriptor) = self.pad_set.get(pad) else {
            return Vec::new();
        };
        let effects = vec![Effect::now(Tone::for_pad(descriptor))];
        let bar_duration = self.clock.bar_duration();
        self.recorder.capture(pad, now, bar_duration, &mut self.store);
        effects
    }

    fn click_bar(&mut self, bar: usize, now: Instant) -> Vec<Effect> {
        match self
            .recorder
            .click_bar(bar, now, &mut self.clock, &mut self.store)
        {
            BarClick::Selected(bar) | BarClick::Moved(bar) => debug!(bar, "bar clicked"),
            BarClick::Ignored => debug!(bar, "bar click ignored"),
        }
        Vec::new()
    }

    fn press_play(&mut self) -> Vec<Effect> {
        if self.clock.is_running() {
            self.clock.stop();
            info!("playback stopped");
            return vec![Effect::StopClock];
        }
        if self.recorder.is_counting_in() {
            warn!("play ignored during count-in");
            self.notice = Some("Counting in...".to_string());
            return Vec::new();
        }
        self.start_clock()
    }

    fn start_clock(&mut self) -> Vec<Effect> {
        match self.clock.start() {
            Some(period) => {
                info!(bpm = self.clock.bpm(), bar = self.clock.current_bar(), "playback started");
                vec![Effect::StartClock { period }]
            }
            None => Vec::new(),
        }
    }

    fn press_record(&mut self) -> Vec<Effect> {
        match self.recorder.press_record(&self.clock) {
            RecordPress::CountInStarted { beat } => vec![Effect::StartCountIn { period: beat }],
            RecordPress::Disarmed | RecordPress::Ignored => Vec::new(),
        }
    }

    fn set_tempo(&mut self, bpm: f64) {
        if !bpm.is_finite() {
            warn!(bpm, "tempo ignored");
            return;
        }
        if self.clock.is_running() || self.recorder.is_counting_in() {
            warn!(bpm, "tempo change refused while playing");
            self.notice = Some("Stop playback to change tempo".to_string());
            return;
        }
        self.clock.set_bpm(bpm);
        info!(bpm = self.clock.bpm(), "tempo changed");
    }

    fn reset(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.recorder.cancel_count_in() {
            effects.push(Effect::CancelCountIn);
        }
        self.store.clear_all();
        self.clock.set_current_bar(0);
        info!("pattern reset");
        effects
    }

    /// Handle one subdivision timer tick
    pub fn on_clock_tick(&mut self, now: Instant) -> Vec<Effect> {
        let Some(tick) = self.clock.tick() else {
            return Vec::new();
        };

        let mut effects = vec![Effect::now(Tone::metronome(tick.accent))];
        if let Some(bar) = tick.bar_start {
            debug!(bar, "bar start");
            self.recorder.on_bar_start(now);
            effects.extend(
                dispatch_bar(&self.store, self.pad_set, bar, self.clock.bar_duration())
                    .into_iter()
                    .map(|scheduled| Effect::Tone {
                        tone: scheduled.tone,
                        delay: scheduled.offset,
                    }),
            );
        }
        effects
    }

    /// Handle one count-in timer tick
    pub fn on_count_in_tick(&mut self, _now: Instant) -> Vec<Effect> {
        match self.recorder.count_in_tick() {
            CountInTick::Click => vec![Effect::now(Tone::count_in())],
            CountInTick::Completed => {
                let mut effects = vec![Effect::CancelCountIn];
                effects.extend(self.start_clock());
                effects
            }
            CountInTick::Inactive => vec![Effect::CancelCountIn],
        }
    }

    /// Current state for the presentation layer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_bar: self.clock.current_bar(),
            running: self.clock.is_running(),
            recording: self.recorder.is_recording(),
            counting_in: self.recorder.is_counting_in(),
            looping: self.clock.looping(),
            has_content: self.store.content_flags(),
            selected_bar: self.recorder.selected_bar(),
            tempo: self.clock.bpm(),
            volume: self.volume,
            pad_set: self.pad_set,
            pad_labels: self.pad_set.pads().iter().map(|pad| pad.label).collect(),
            notice: self.notice.clone(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Timbre;
    use crate::sequencer::NoteEvent;

    fn tones(effects: &[Effect]) -> Vec<(Tone, Duration)> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Tone { tone, delay } => Some((*tone, *delay)),
                _ => None,
            })
            .collect()
    }

    fn empty_engine() -> Engine {
        let mut engine = Engine::new();
        engine.apply(Intent::Reset, Instant::now());
        engine
    }

    fn arm(engine: &mut Engine, now: Instant) {
        engine.apply(Intent::PressRecord, now);
        for _ in 0..4 {
            engine.on_count_in_tick(now);
        }
    }

    #[test]
    fn test_initial_state() {
        let snapshot = Engine::new().snapshot();
        assert_eq!(snapshot.current_bar, 0);
        assert!(!snapshot.running);
        assert!(!snapshot.recording);
        assert!(snapshot.looping);
        assert_eq!(snapshot.tempo, 100.0);
        assert_eq!(snapshot.volume, 75);
        assert_eq!(snapshot.pad_set, PadSet::Bass);
        assert_eq!(snapshot.pad_labels.len(), 8);
        assert!(snapshot.has_content.iter().all(|&c| c));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            tempo: 120.0,
            looping: false,
            pad_set: PadSet::Melody,
            preset: "pop".to_string(),
            ..Settings::default()
        };
        let engine = Engine::from_settings(&settings).unwrap();
        assert_eq!(engine.clock().bpm(), 120.0);
        assert!(!engine.clock().looping());
        assert_eq!(engine.pad_set(), PadSet::Melody);
        assert!(engine.store().has_content(0));
        assert!(!engine.store().has_content(4));

        let settings = Settings {
            preset: "none".to_string(),
            ..Settings::default()
        };
        let engine = Engine::from_settings(&settings).unwrap();
        assert_eq!(engine.store().event_count(), 0);

        let settings = Settings {
            preset: "polka".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            Engine::from_settings(&settings).unwrap_err(),
            EngineError::UnknownPreset("polka".to_string())
        );
    }

    #[test]
    fn test_play_toggles_clock() {
        let mut engine = empty_engine();
        let now = Instant::now();
        assert_eq!(
            engine.apply(Intent::PressPlay, now),
            vec![Effect::StartClock {
                period: Duration::from_millis(600)
            }]
        );
        assert!(engine.snapshot().running);
        assert_eq!(engine.apply(Intent::PressPlay, now), vec![Effect::StopClock]);
        assert!(!engine.snapshot().running);
    }

    #[test]
    fn test_clock_tick_dispatches_bar() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.store.replace_all(&Pattern::from([(
            0,
            vec![NoteEvent::new(0, 0, 0), NoteEvent::new(3, 1000, 0)],
        )]));
        engine.apply(Intent::PressPlay, now);

        let effects = engine.on_clock_tick(now);
        let played = tones(&effects);
        assert_eq!(played.len(), 3);
        assert_eq!(played[0].0, Tone::metronome(true));
        assert_eq!(played[1].1, Duration::ZERO);
        assert_eq!(played[1].0.frequency, PadSet::Bass.pads()[0].frequency);
        assert_eq!(played[2].1, Duration::from_millis(1000));
        assert_eq!(played[2].0.frequency, PadSet::Bass.pads()[3].frequency);

        // Three plain clicks, then bar 1 (silent)
        for _ in 0..3 {
            let effects = engine.on_clock_tick(now);
            assert_eq!(tones(&effects), vec![(Tone::metronome(false), Duration::ZERO)]);
        }
        let effects = engine.on_clock_tick(now);
        assert_eq!(tones(&effects).len(), 1);
        assert_eq!(engine.snapshot().current_bar, 1);
    }

    #[test]
    fn test_tick_while_stopped_is_silent() {
        let mut engine = Engine::new();
        assert!(engine.on_clock_tick(Instant::now()).is_empty());
    }

    #[test]
    fn test_record_count_in_then_armed() {
        let mut engine = empty_engine();
        let now = Instant::now();
        assert_eq!(
            engine.apply(Intent::PressRecord, now),
            vec![Effect::StartCountIn {
                period: Duration::from_millis(600)
            }]
        );
        assert!(engine.snapshot().counting_in);

        for _ in 0..3 {
            let effects = engine.on_count_in_tick(now);
            assert_eq!(tones(&effects), vec![(Tone::count_in(), Duration::ZERO)]);
        }
        let effects = engine.on_count_in_tick(now);
        assert_eq!(
            effects,
            vec![
                Effect::CancelCountIn,
                Effect::StartClock {
                    period: Duration::from_millis(600)
                }
            ]
        );
        let snapshot = engine.snapshot();
        assert!(snapshot.recording);
        assert!(snapshot.running);
        assert!(!snapshot.counting_in);
    }

    #[test]
    fn test_record_while_running_ignored() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.apply(Intent::PressPlay, now);
        assert!(engine.apply(Intent::PressRecord, now).is_empty());
        assert!(!engine.snapshot().counting_in);
    }

    #[test]
    fn test_cancel_count_in() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.apply(Intent::PressRecord, now);
        assert_eq!(
            engine.apply(Intent::CancelCountIn, now),
            vec![Effect::CancelCountIn]
        );
        assert!(!engine.snapshot().counting_in);
        assert!(engine.apply(Intent::CancelCountIn, now).is_empty());
        assert_eq!(engine.on_count_in_tick(now), vec![Effect::CancelCountIn]);
    }

    #[test]
    fn test_recording_appends_events() {
        let mut engine = empty_engine();
        let now = Instant::now();
        arm(&mut engine, now);
        engine.apply(Intent::PressPlay, now);
        assert!(!engine.snapshot().running);

        engine.apply(Intent::ClickBar(2), now);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.selected_bar, Some(2));
        assert_eq!(snapshot.current_bar, 2);
        assert!(snapshot.has_content[2]);

        let effects = engine.apply(Intent::PressPad(5), now + Duration::from_millis(300));
        assert_eq!(tones(&effects).len(), 1);
        engine.apply(Intent::PressPad(7), now + Duration::from_millis(900));

        let events = engine.store().bar(2);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], NoteEvent::new(5, 300, 2));
        assert_eq!(events[1], NoteEvent::new(7, 900, 2));
    }

    #[test]
    fn test_pad_press_without_recording_only_sounds() {
        let mut engine = empty_engine();
        let effects = engine.apply(Intent::PressPad(6), Instant::now());
        let played = tones(&effects);
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].0.timbre, Timbre::Percussive);
        assert_eq!(engine.store().event_count(), 0);
    }

    #[test]
    fn test_bar_click_ignored_while_playing() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.apply(Intent::PressPlay, now);
        engine.apply(Intent::ClickBar(3), now);
        assert_eq!(engine.snapshot().current_bar, 0);
    }

    #[test]
    fn test_tempo_refused_while_running() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.apply(Intent::SetTempo(140.0), now);
        assert_eq!(engine.snapshot().tempo, 140.0);

        engine.apply(Intent::PressPlay, now);
        engine.apply(Intent::SetTempo(90.0), now);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.tempo, 140.0);
        assert!(snapshot.notice.is_some());

        engine.apply(Intent::SetTempo(1000.0), now);
        engine.apply(Intent::PressPlay, now);
        engine.apply(Intent::SetTempo(1000.0), now);
        assert_eq!(engine.snapshot().tempo, 240.0);
    }

    #[test]
    fn test_volume_clamped() {
        let mut engine = Engine::new();
        let effects = engine.apply(Intent::SetVolume(150), Instant::now());
        assert_eq!(effects, vec![Effect::Volume(1.0)]);
        assert_eq!(engine.snapshot().volume, 100);
    }

    #[test]
    fn test_reset() {
        let mut engine = Engine::new();
        let now = Instant::now();
        engine.apply(Intent::ClickBar(3), now);
        engine.apply(Intent::PressRecord, now);

        let effects = engine.apply(Intent::Reset, now);
        assert_eq!(effects, vec![Effect::CancelCountIn]);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.current_bar, 0);
        assert!(snapshot.has_content.iter().all(|&c| !c));
        assert!(!snapshot.counting_in);
        assert_eq!(engine.store().event_count(), 0);
    }

    #[test]
    fn test_load_preset_and_demo() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.apply(Intent::LoadPreset("pop".to_string()), now);
        assert!(engine.store().has_content(3));
        assert!(!engine.store().has_content(4));
        // Written for the melody pads
        assert_eq!(engine.pad_set(), PadSet::Melody);

        engine.apply(Intent::LoadPreset("polka".to_string()), now);
        assert_eq!(
            engine.snapshot().notice.as_deref(),
            Some("Unknown preset: polka")
        );
        assert!(engine.store().has_content(3));

        engine.apply(Intent::LoadDemo, now);
        assert_eq!(engine.store().to_pattern(), preset("melody").unwrap());
        assert_eq!(engine.snapshot().pad_labels.len(), 16);

        engine.apply(Intent::TogglePadSet, now);
        engine.apply(Intent::LoadDemo, now);
        assert_eq!(engine.store().to_pattern(), preset("bass").unwrap());
        assert_eq!(engine.pad_set(), PadSet::Bass);
    }

    #[test]
    fn test_load_preset_switches_pad_set() {
        let mut engine = Engine::new();
        assert_eq!(engine.pad_set(), PadSet::Bass);
        engine.load_preset("pop").unwrap();
        assert_eq!(engine.pad_set(), PadSet::Melody);

        // Drum pads 12-15 sound instead of being skipped
        let effects = engine.apply(Intent::PressPlay, Instant::now());
        assert_eq!(effects.len(), 1);
        let tones = tones(&engine.on_clock_tick(Instant::now()));
        assert!(tones.iter().any(|(tone, _)| tone.timbre == Timbre::Percussive));
        assert_eq!(tones.len(), 1 + preset("pop").unwrap()[&0].len());

        engine.load_preset("bass").unwrap();
        assert_eq!(engine.pad_set(), PadSet::Bass);
    }

    #[test]
    fn test_fast_tempo_drops_notes_past_bar_end() {
        let mut engine = Engine::new();
        let now = Instant::now();
        engine.apply(Intent::SetTempo(240.0), now);
        engine.apply(Intent::LoadPreset("pop".to_string()), now);
        engine.apply(Intent::PressPlay, now);

        let bar = engine.clock().bar_duration();
        assert_eq!(bar, Duration::from_millis(1000));
        let scheduled = tones(&engine.on_clock_tick(now));
        assert!(!scheduled.is_empty());
        assert!(scheduled.iter().all(|(_, delay)| *delay < bar));
    }

    #[test]
    fn test_non_finite_tempo_ignored() {
        let mut engine = empty_engine();
        let now = Instant::now();
        for bpm in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(engine.apply(Intent::SetTempo(bpm), now).is_empty());
            assert_eq!(engine.snapshot().tempo, 100.0);
            assert_eq!(engine.snapshot().notice, None);
        }
    }

    #[test]
    fn test_loop_toggle_wraps_bar() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.apply(Intent::PressLoop, now);
        engine.apply(Intent::ClickBar(9), now);
        engine.apply(Intent::PressPlay, now);
        assert_eq!(engine.snapshot().current_bar, 9);

        engine.apply(Intent::PressLoop, now);
        let snapshot = engine.snapshot();
        assert!(snapshot.looping);
        assert_eq!(snapshot.current_bar, 1);
    }

    #[test]
    fn test_play_ignored_during_count_in() {
        let mut engine = empty_engine();
        let now = Instant::now();
        engine.apply(Intent::PressRecord, now);
        assert!(engine.apply(Intent::PressPlay, now).is_empty());
        assert!(!engine.snapshot().running);
    }
}
