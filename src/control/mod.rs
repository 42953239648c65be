// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control system for keyboard input.
//!
//! Keys map to [`ControlAction`]s. Actions that depend on the current state
//! (tempo steps, the bar cursor) are resolved into engine intents by the UI.

pub mod keyboard;

pub use keyboard::{format_shortcut, Category, KeyBinding, KeyboardController, Shortcut};

/// Action that can be triggered by controls
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    // Pads
    /// Press pad by index
    Pad(usize),

    // Transport
    /// Toggle play/stop
    TogglePlay,
    /// Toggle record
    ToggleRecord,
    /// Toggle four bar loop
    ToggleLoop,
    /// Abort the count-in
    CancelCountIn,

    // Levels
    /// Adjust tempo by delta BPM
    AdjustTempo(f64),
    /// Adjust volume by delta percent
    AdjustVolume(i16),

    // Bars
    /// Move the bar cursor forward
    NextBar,
    /// Move the bar cursor back
    PreviousBar,
    /// Click the bar under the cursor
    ClickBar,

    // Pattern
    /// Clear the pattern
    Reset,
    /// Load the demo song for the active pad set
    LoadDemo,
    /// Switch pad sets
    TogglePadSet,

    // UI
    /// Toggle help display
    ToggleHelp,
    /// Quit application
    Quit,
}
