// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module provides the bar-level transport clock and the count-in
//! pre-roll used before recording.

pub mod clock;
pub mod count_in;

pub use clock::{
    bar_duration, bar_duration_ms, beat_duration, tick_period, ClockState, ClockTick,
    TransportClock, DEFAULT_BPM, MAX_BPM, MIN_BPM,
};
pub use count_in::{CountIn, CountInStep, COUNT_IN_CLICKS};
