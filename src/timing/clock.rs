// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport clock.
//!
//! Converts a tempo into a subdivision tick (four per bar) and moves the bar
//! pointer on bar boundaries. The clock is a pure state machine: the runtime
//! owns the actual timer and calls [`TransportClock::tick`] once per period.
//!
//! The first tick after [`TransportClock::start`] is the downbeat of the
//! current bar and does not advance it; every fourth tick after that moves
//! to the next bar.

use std::time::Duration;

use tracing::debug;

use crate::sequencer::BAR_COUNT;

/// Beats in one bar
pub const BEATS_PER_BAR: u32 = 4;
/// Metronome ticks in one bar
pub const SUBDIVISIONS_PER_BAR: u32 = 4;
/// The subdivision counter wraps after four bars
pub const SUBDIVISION_CYCLE: u32 = 16;
/// Bars in the short loop
pub const SHORT_LOOP_BARS: usize = 4;

/// Slowest accepted tempo
pub const MIN_BPM: f64 = 40.0;
/// Fastest accepted tempo
pub const MAX_BPM: f64 = 240.0;
/// Tempo at startup
pub const DEFAULT_BPM: f64 = 100.0;

/// Length of one bar in milliseconds: `240000 / bpm`
pub fn bar_duration_ms(bpm: f64) -> f64 {
    (60.0 / bpm) * BEATS_PER_BAR as f64 * 1000.0
}

/// Length of one bar
pub fn bar_duration(bpm: f64) -> Duration {
    Duration::from_nanos((bar_duration_ms(bpm) * 1_000_000.0).round() as u64)
}

/// Interval between subdivision ticks
pub fn tick_period(bpm: f64) -> Duration {
    bar_duration(bpm) / SUBDIVISIONS_PER_BAR
}

/// Interval between count-in clicks (one beat)
pub fn beat_duration(bpm: f64) -> Duration {
    Duration::from_nanos((60_000_000_000.0 / bpm).round() as u64)
}

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// What a single tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    /// Accented click on bar boundaries
    pub accent: bool,
    /// Bar that starts on this tick, if any
    pub bar_start: Option<usize>,
}

/// Bar-level transport clock
#[derive(Debug, Clone)]
pub struct TransportClock {
    state: ClockState,
    bpm: f64,
    looping: bool,
    current_bar: usize,
    /// Subdivision counter, 0 - 15
    subdivision: u32,
    /// Next bar boundary replays the current bar instead of advancing
    downbeat_pending: bool,
}

impl TransportClock {
    /// Create a stopped clock at bar 0
    pub fn new(bpm: f64) -> Self {
        Self {
            state: ClockState::Stopped,
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            looping: true,
            current_bar: 0,
            subdivision: 0,
            downbeat_pending: false,
        }
    }

    /// Current tempo in BPM
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Change the tempo. Refused while running; returns whether it applied.
    pub fn set_bpm(&mut self, bpm: f64) -> bool {
        if self.is_running() {
            return false;
        }
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        true
    }

    /// Get the current clock state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Check if running
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Bar under the play head
    pub fn current_bar(&self) -> usize {
        self.current_bar
    }

    /// Move the play head. Only meaningful while stopped.
    pub fn set_current_bar(&mut self, bar: usize) {
        debug_assert!(bar < BAR_COUNT, "bar index {} out of range", bar);
        if bar < BAR_COUNT {
            self.current_bar = bar;
        }
    }

    /// Whether playback loops the first four bars
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Switch between the four bar loop and all sixteen bars
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        if self.is_running() {
            self.current_bar %= self.loop_length();
        }
    }

    /// Number of bars in the active loop
    pub fn loop_length(&self) -> usize {
        if self.looping {
            SHORT_LOOP_BARS
        } else {
            BAR_COUNT
        }
    }

    /// Current subdivision counter
    pub fn subdivision(&self) -> u32 {
        self.subdivision
    }

    /// Length of one bar at the current tempo
    pub fn bar_duration(&self) -> Duration {
        bar_duration(self.bpm)
    }

    /// Interval between ticks at the current tempo
    pub fn tick_period(&self) -> Duration {
        tick_period(self.bpm)
    }

    /// Start the clock. Returns the tick period, or `None` if already running.
    pub fn start(&mut self) -> Option<Duration> {
        if self.is_running() {
            return None;
        }
        self.state = ClockState::Running;
        self.current_bar %= self.loop_length();
        self.subdivision = 0;
        self.downbeat_pending = true;
        debug!(bpm = self.bpm, bar = self.current_bar, "clock started");
        Some(self.tick_period())
    }

    /// Stop the clock and return to bar 0. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.state = ClockState::Stopped;
        self.current_bar = 0;
        self.subdivision = 0;
        self.downbeat_pending = false;
        if was_running {
            debug!("clock stopped");
        }
        was_running
    }

    /// Process one subdivision tick
    pub fn tick(&mut self) -> Option<ClockTick> {
        if !self.is_running() {
            return None;
        }

        let is_bar_start = self.subdivision % SUBDIVISIONS_PER_BAR == 0;
        let bar_start = if is_bar_start {
            if self.downbeat_pending {
                self.downbeat_pending = false;
            } else {
                self.current_bar = (self.current_bar + 1) % self.loop_length();
            }
            Some(self.current_bar)
        } else {
            None
        };

        self.subdivision = (self.subdivision + 1) % SUBDIVISION_CYCLE;

        Some(ClockTick {
            accent: is_bar_start,
            bar_start,
        })
    }
}

impl Default for TransportClock {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}
