// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Built-in demo patterns.
//!
//! Each preset is a table of `(pad, offset_ms)` pairs per bar. `bass` and
//! `melody` are the "Ocean Friends" song for the matching pad set; `pop` is a
//! four bar chord and drum loop for the melody set.

use super::pattern::{NoteEvent, Pattern};
use crate::music::PadSet;

type BarNotes = (usize, &'static [(usize, u64)]);

const BASS: &[BarNotes] = &[
    // Verse 1: I-V
    (0, &[(0, 0), (0, 1000)]),
    (1, &[(3, 0), (3, 1000)]),
    (2, &[(0, 0), (0, 1000)]),
    (3, &[(3, 0), (3, 1000)]),
    // Verse 2: I-IV-V
    (4, &[(0, 0), (0, 1000)]),
    (5, &[(2, 0), (2, 1000)]),
    (6, &[(3, 0), (3, 1000)]),
    (7, &[(0, 0)]),
    // Bridge: walking line
    (8, &[(0, 0), (1, 500), (2, 1000), (3, 1500)]),
    (9, &[(3, 0), (3, 1000)]),
    (10, &[(2, 0), (2, 1000)]),
    (11, &[(0, 0)]),
    // Ending
    (12, &[(0, 0), (3, 1000)]),
    (13, &[(2, 0), (3, 1000)]),
    (14, &[(0, 0), (3, 1000)]),
    (15, &[(0, 0)]),
];

const MELODY: &[BarNotes] = &[
    // "Swimming in the sea"
    (0, &[(4, 0), (4, 1000)]),
    (1, &[(6, 0), (7, 1000)]),
    (2, &[(7, 0), (6, 1000)]),
    (3, &[(4, 0), (4, 1500)]),
    // "Playing with friends"
    (4, &[(7, 0), (7, 1000)]),
    (5, &[(8, 0), (7, 1000)]),
    (6, &[(6, 0), (6, 1000)]),
    (7, &[(4, 0)]),
    // "Jumping waves"
    (8, &[(6, 0), (7, 500), (8, 1000)]),
    (9, &[(7, 0), (6, 1000)]),
    (10, &[(6, 0), (4, 1000)]),
    (11, &[(4, 0)]),
    // "Happy ending"
    (12, &[(4, 0), (6, 500)]),
    (13, &[(7, 0), (8, 500)]),
    (14, &[(7, 0), (6, 500)]),
    (15, &[(4, 0)]),
];

const POP: &[BarNotes] = &[
    (0, &[(0, 0), (12, 0), (14, 600), (13, 1200), (14, 1800)]),
    (1, &[(2, 0), (12, 0), (14, 600), (13, 1200), (14, 1800)]),
    (2, &[(3, 0), (12, 0), (14, 600), (13, 1200), (14, 1800)]),
    (3, &[(1, 0), (12, 0), (14, 600), (13, 1200), (15, 1800)]),
];

/// Names of all built-in presets
pub const PRESET_NAMES: [&str; 3] = ["bass", "melody", "pop"];

fn build(table: &[BarNotes]) -> Pattern {
    table
        .iter()
        .map(|&(bar, notes)| {
            let events = notes
                .iter()
                .map(|&(pad, offset_ms)| NoteEvent::new(pad, offset_ms, bar))
                .collect();
            (bar, events)
        })
        .collect()
}

fn lookup(name: &str) -> Option<(&'static [BarNotes], PadSet)> {
    match name.trim().to_lowercase().as_str() {
        "bass" => Some((BASS, PadSet::Bass)),
        "melody" | "ocean-friends" => Some((MELODY, PadSet::Melody)),
        "pop" => Some((POP, PadSet::Melody)),
        _ => None,
    }
}

/// Look up a built-in preset by name
pub fn preset(name: &str) -> Option<Pattern> {
    lookup(name).map(|(table, _)| build(table))
}

/// Pad set a preset was written for
pub fn preset_pad_set(name: &str) -> Option<PadSet> {
    lookup(name).map(|(_, pad_set)| pad_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_resolve() {
        for name in PRESET_NAMES {
            assert!(preset(name).is_some(), "missing preset {}", name);
        }
        assert!(preset("polka").is_none());
        assert!(preset(" Bass ").is_some());
    }

    #[test]
    fn test_bass_preset_shape() {
        let bass = preset("bass").unwrap();
        assert_eq!(bass.len(), 16);
        assert_eq!(bass[&0], vec![NoteEvent::new(0, 0, 0), NoteEvent::new(0, 1000, 0)]);
        assert_eq!(bass[&8].len(), 4);
        assert_eq!(bass[&15], vec![NoteEvent::new(0, 0, 15)]);
    }

    #[test]
    fn test_event_bars_match_keys() {
        for name in PRESET_NAMES {
            for (bar, events) in preset(name).unwrap() {
                assert!(events.iter().all(|e| e.bar == bar));
            }
        }
    }

    #[test]
    fn test_pad_indices_fit_their_pad_set() {
        for name in PRESET_NAMES {
            let set = preset_pad_set(name).unwrap();
            let pattern = preset(name).unwrap();
            assert!(pattern.values().flatten().all(|e| e.pad < set.len()), "{}", name);
        }
        assert_eq!(preset_pad_set("pop"), Some(PadSet::Melody));
        assert_eq!(preset_pad_set("bass"), Some(PadSet::Bass));
        assert_eq!(preset_pad_set("polka"), None);
    }

    #[test]
    fn test_offsets_fit_default_bar() {
        // 2400 ms per bar at the default 100 BPM
        for name in PRESET_NAMES {
            assert!(preset(name).unwrap().values().flatten().all(|e| e.offset_ms < 2400));
        }
    }
}
