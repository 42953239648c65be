// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pattern storage and playback.
//!
//! This module provides:
//! - Per-bar note storage for the 16 bar grid
//! - Built-in preset patterns
//! - The bar playback driver

pub mod pattern;
pub mod playback;
pub mod presets;

pub use pattern::{NoteEvent, Pattern, PatternStore, BAR_COUNT};
pub use playback::{dispatch_bar, ScheduledTone};
pub use presets::{preset, preset_pad_set, PRESET_NAMES};
