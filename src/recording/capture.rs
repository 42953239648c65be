// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-bar recording workflow.
//!
//! Record arms a count-in; once it completes, recording is armed and the
//! transport starts. With the transport stopped, clicking a bar selects it,
//! empties it, and pad presses are appended to it at their offset inside the
//! bar. Pressing record again disarms without touching the transport.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::sequencer::{NoteEvent, PatternStore, BAR_COUNT};
use crate::timing::{CountIn, CountInStep, TransportClock};

/// Recording state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingState {
    /// Not recording
    Idle,
    /// Pre-roll clicks before recording
    CountingIn(CountIn),
    /// Recording enabled, no bar selected
    Armed,
    /// Recording into a selected bar
    RecordingBar {
        bar: usize,
        /// Offsets are measured from this instant
        anchor: Instant,
    },
}

/// Effect of pressing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPress {
    /// Count-in started; tick it every `beat`
    CountInStarted { beat: Duration },
    /// Recording switched off
    Disarmed,
    /// Nothing happened
    Ignored,
}

/// Effect of one count-in timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountInTick {
    /// Play a count-in click
    Click,
    /// Count-in done; recording armed, start the transport
    Completed,
    /// Stale tick with no count-in running
    Inactive,
}

/// Effect of clicking a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarClick {
    /// Bar selected for recording and emptied
    Selected(usize),
    /// Play head moved, nothing recorded
    Moved(usize),
    /// Transport running or bar out of range
    Ignored,
}

/// Recording state machine
#[derive(Debug, Clone)]
pub struct BarRecorder {
    state: RecordingState,
}

impl BarRecorder {
    /// Create an idle recorder
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
        }
    }

    /// Get current state
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// Recording is active (armed, with or without a bar)
    pub fn is_recording(&self) -> bool {
        matches!(
            self.state,
            RecordingState::Armed | RecordingState::RecordingBar { .. }
        )
    }

    /// Count-in is running
    pub fn is_counting_in(&self) -> bool {
        matches!(self.state, RecordingState::CountingIn(_))
    }

    /// Bar currently selected for recording
    pub fn selected_bar(&self) -> Option<usize> {
        match self.state {
            RecordingState::RecordingBar { bar, .. } => Some(bar),
            _ => None,
        }
    }

    /// Handle the record button
    pub fn press_record(&mut self, clock: &TransportClock) -> RecordPress {
        match self.state {
            RecordingState::Idle if !clock.is_running() => {
                let count_in = CountIn::new(clock.bpm());
                let beat = count_in.beat();
                self.state = RecordingState::CountingIn(count_in);
                info!(beat_ms = beat.as_millis() as u64, "count-in started");
                RecordPress::CountInStarted { beat }
            }
            RecordingState::Idle | RecordingState::CountingIn(_) => RecordPress::Ignored,
            RecordingState::Armed | RecordingState::RecordingBar { .. } => {
                self.state = RecordingState::Idle;
                info!("recording disarmed");
                RecordPress::Disarmed
            }
        }
    }

    /// Abort a running count-in. Returns whether one was running.
    pub fn cancel_count_in(&mut self) -> bool {
        if self.is_counting_in() {
            self.state = RecordingState::Idle;
            info!("count-in cancelled");
            true
        } else {
            false
        }
    }

    /// Advance the count-in by one beat
    pub fn count_in_tick(&mut self) -> CountInTick {
        let RecordingState::CountingIn(count_in) = &mut self.state else {
            return CountInTick::Inactive;
        };
        match count_in.advance() {
            CountInStep::Click(n) => {
                debug!(click = n, "count-in click");
                CountInTick::Click
            }
            CountInStep::Complete => {
                self.state = RecordingState::Armed;
                info!("recording armed");
                CountInTick::Completed
            }
        }
    }

    /// Handle a click on a bar
    pub fn click_bar(
        &mut self,
        bar: usize,
        now: Instant,
        clock: &mut TransportClock,
        store: &mut PatternStore,
    ) -> BarClick {
        if clock.is_running() {
            return BarClick::Ignored;
        }
        debug_assert!(bar < BAR_COUNT, "bar index {} out of range", bar);
        if bar >= BAR_COUNT {
            return BarClick::Ignored;
        }

        clock.set_current_bar(bar);
        if self.is_recording() {
            store.replace_bar(bar);
            self.state = RecordingState::RecordingBar { bar, anchor: now };
            info!(bar, "recording bar");
            BarClick::Selected(bar)
        } else {
            BarClick::Moved(bar)
        }
    }

    /// A bar started playing; offsets restart from here
    pub fn on_bar_start(&mut self, now: Instant) {
        if let RecordingState::RecordingBar { anchor, .. } = &mut self.state {
            *anchor = now;
        }
    }

    /// Capture a pad press into the selected bar, if any
    pub fn capture(
        &mut self,
        pad: usize,
        now: Instant,
        bar_duration: Duration,
        store: &mut PatternStore,
    ) -> Option<NoteEvent> {
        let RecordingState::RecordingBar { bar, anchor } = self.state else {
            return None;
        };
        let bar_ms = (bar_duration.as_millis() as u64).max(1);
        let elapsed = now.saturating_duration_since(anchor).as_millis() as u64;
        let event = NoteEvent::new(pad, elapsed % bar_ms, bar);
        store.append_to_bar(bar, event);
        debug!(pad, bar, offset_ms = event.offset_ms, "note captured");
        Some(event)
    }
}

impl Default for BarRecorder {
    fn default() -> Self {
        Self::new()
    }
}
