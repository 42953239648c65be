// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Recording workflow.
//!
//! This module provides the record-arm, count-in and per-bar capture
//! state machine.

pub mod capture;

pub use capture::{BarClick, BarRecorder, CountInTick, RecordPress, RecordingState};
