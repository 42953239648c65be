// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! kidsynth: a 16 bar step sequencer with playable pads, a metronome clock
//! and per-bar recording.

pub mod audio;
pub mod config;
pub mod control;
pub mod engine;
pub mod logging;
pub mod music;
pub mod recording;
pub mod runtime;
pub mod sequencer;
pub mod timing;
pub mod ui;

pub use engine::{Effect, Engine, EngineError, Intent, Snapshot};
pub use runtime::{Runtime, RuntimeHandle};
