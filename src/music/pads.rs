// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playable pad definitions.
//!
//! Pads are immutable sound descriptors arranged in fixed pad sets. The rest
//! of the crate refers to a pad by its index into the active set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single playable sound source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pad {
    /// Display label (note or drum name)
    pub label: &'static str,
    /// Base frequency in Hz
    pub frequency: f32,
    /// Display color name (presentation only)
    pub color: &'static str,
    /// Drum pads use the percussive timbre
    pub is_drum: bool,
}

impl Pad {
    const fn tone(label: &'static str, frequency: f32, color: &'static str) -> Self {
        Self {
            label,
            frequency,
            color,
            is_drum: false,
        }
    }

    const fn drum(label: &'static str, frequency: f32, color: &'static str) -> Self {
        Self {
            label,
            frequency,
            color,
            is_drum: true,
        }
    }
}

/// Low register notes plus two drums
pub const BASS_PADS: [Pad; 8] = [
    Pad::tone("C3", 65.41, "cyan"),
    Pad::tone("D3", 73.42, "teal"),
    Pad::tone("E3", 82.41, "green"),
    Pad::tone("G3", 98.00, "emerald"),
    Pad::tone("A3", 110.00, "lime"),
    Pad::tone("C2", 130.81, "cyan"),
    Pad::drum("Kick", 100.0, "red"),
    Pad::drum("Snare", 200.0, "rose"),
];

/// Chord row, two rows of pentatonic notes, and a drum row
pub const MELODY_PADS: [Pad; 16] = [
    Pad::tone("C", 261.63, "blue"),
    Pad::tone("F", 349.23, "indigo"),
    Pad::tone("G", 392.00, "violet"),
    Pad::tone("Am", 440.00, "purple"),
    Pad::tone("C4", 261.63, "cyan"),
    Pad::tone("D4", 293.66, "teal"),
    Pad::tone("E4", 329.63, "green"),
    Pad::tone("G4", 392.00, "emerald"),
    Pad::tone("A4", 440.00, "lime"),
    Pad::tone("C5", 523.25, "yellow"),
    Pad::tone("D5", 587.33, "amber"),
    Pad::tone("E5", 659.25, "orange"),
    Pad::drum("Kick", 100.0, "red"),
    Pad::drum("Snare", 200.0, "rose"),
    Pad::drum("Hat", 300.0, "pink"),
    Pad::drum("Clap", 400.0, "fuchsia"),
];

/// Which pad set is currently playable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadSet {
    #[default]
    Bass,
    Melody,
}

impl PadSet {
    /// Pads belonging to this set, in index order
    pub fn pads(self) -> &'static [Pad] {
        match self {
            PadSet::Bass => &BASS_PADS,
            PadSet::Melody => &MELODY_PADS,
        }
    }

    /// Look up a pad by index
    pub fn get(self, index: usize) -> Option<&'static Pad> {
        self.pads().get(index)
    }

    /// Number of pads in the set
    pub fn len(self) -> usize {
        self.pads().len()
    }

    /// The other pad set
    pub fn toggled(self) -> Self {
        match self {
            PadSet::Bass => PadSet::Melody,
            PadSet::Melody => PadSet::Bass,
        }
    }

    /// Name of the demo preset recorded for this set
    pub fn demo_preset(self) -> &'static str {
        match self {
            PadSet::Bass => "bass",
            PadSet::Melody => "melody",
        }
    }
}

impl fmt::Display for PadSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadSet::Bass => write!(f, "Bass"),
            PadSet::Melody => write!(f, "Melody"),
        }
    }
}
