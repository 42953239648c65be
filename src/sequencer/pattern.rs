// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pattern store: recorded note events per bar.
//!
//! The store holds 16 bars, each an ordered list of note events in insertion
//! order. Bar indices outside `0..BAR_COUNT` are programming errors: they
//! trip a debug assertion and are ignored in release builds so the store is
//! never corrupted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of addressable bars
pub const BAR_COUNT: usize = 16;

/// A pad press captured inside a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Index into the active pad set
    pub pad: usize,
    /// Milliseconds from the start of the bar
    pub offset_ms: u64,
    /// Owning bar
    pub bar: usize,
}

impl NoteEvent {
    /// Create a new note event
    pub fn new(pad: usize, offset_ms: u64, bar: usize) -> Self {
        Self { pad, offset_ms, bar }
    }
}

/// Bar index to note list. Missing bars are empty.
pub type Pattern = BTreeMap<usize, Vec<NoteEvent>>;

fn bar_in_range(bar: usize) -> bool {
    debug_assert!(bar < BAR_COUNT, "bar index {} out of range", bar);
    bar < BAR_COUNT
}

/// Storage for all 16 bars
#[derive(Debug, Clone)]
pub struct PatternStore {
    bars: [Vec<NoteEvent>; BAR_COUNT],
    /// Bars claimed for content even while still empty (selected for recording
    /// or present as a key in a loaded pattern)
    claimed: [bool; BAR_COUNT],
}

impl PatternStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            bars: std::array::from_fn(|_| Vec::new()),
            claimed: [false; BAR_COUNT],
        }
    }

    /// Create a store seeded with a pattern
    pub fn with_pattern(pattern: &Pattern) -> Self {
        let mut store = Self::new();
        store.replace_all(pattern);
        store
    }

    /// Replace the whole store with a pattern
    pub fn replace_all(&mut self, pattern: &Pattern) {
        self.clear_all();
        for (&bar, events) in pattern {
            if !bar_in_range(bar) {
                continue;
            }
            self.bars[bar] = events.clone();
            self.claimed[bar] = true;
        }
    }

    /// Empty a single bar and mark it as having content
    pub fn replace_bar(&mut self, bar: usize) {
        if !bar_in_range(bar) {
            return;
        }
        self.bars[bar].clear();
        self.claimed[bar] = true;
    }

    /// Append an event to the end of a bar
    pub fn append_to_bar(&mut self, bar: usize, event: NoteEvent) {
        if !bar_in_range(bar) {
            return;
        }
        self.bars[bar].push(event);
        self.claimed[bar] = true;
    }

    /// Events recorded in a bar, in insertion order
    pub fn bar(&self, bar: usize) -> &[NoteEvent] {
        if !bar_in_range(bar) {
            return &[];
        }
        &self.bars[bar]
    }

    /// Remove every event and content flag
    pub fn clear_all(&mut self) {
        for events in self.bars.iter_mut() {
            events.clear();
        }
        self.claimed = [false; BAR_COUNT];
    }

    /// Whether a bar has content
    pub fn has_content(&self, bar: usize) -> bool {
        if !bar_in_range(bar) {
            return false;
        }
        self.claimed[bar] || !self.bars[bar].is_empty()
    }

    /// Content flags for all bars
    pub fn content_flags(&self) -> [bool; BAR_COUNT] {
        std::array::from_fn(|bar| self.has_content(bar))
    }

    /// Total number of stored events
    pub fn event_count(&self) -> usize {
        self.bars.iter().map(Vec::len).sum()
    }

    /// Export the store as a pattern containing every bar with content
    pub fn to_pattern(&self) -> Pattern {
        (0..BAR_COUNT)
            .filter(|&bar| self.has_content(bar))
            .map(|bar| (bar, self.bars[bar].clone()))
            .collect()
    }
}

impl Default for PatternStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_note_pattern() -> Pattern {
        let mut pattern = Pattern::new();
        pattern.insert(0, vec![NoteEvent::new(0, 0, 0), NoteEvent::new(3, 1000, 0)]);
        pattern.insert(5, vec![NoteEvent::new(1, 500, 5)]);
        pattern
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = PatternStore::new();
        assert_eq!(store.event_count(), 0);
        assert!(store.content_flags().iter().all(|flag| !flag));
        assert!(store.bar(3).is_empty());
    }

    #[test]
    fn test_replace_all() {
        let mut store = PatternStore::new();
        store.append_to_bar(9, NoteEvent::new(2, 10, 9));

        store.replace_all(&two_note_pattern());

        assert_eq!(store.bar(0).len(), 2);
        assert_eq!(store.bar(5)[0].offset_ms, 500);
        assert!(store.bar(9).is_empty());
        assert!(!store.has_content(9));
        assert!(store.has_content(0));
        assert!(store.has_content(5));
    }

    #[test]
    fn test_empty_bar_in_pattern_counts_as_content() {
        let mut pattern = Pattern::new();
        pattern.insert(2, Vec::new());
        let store = PatternStore::with_pattern(&pattern);
        assert!(store.has_content(2));
        assert!(store.bar(2).is_empty());
    }

    #[test]
    fn test_replace_bar_marks_content() {
        let mut store = PatternStore::with_pattern(&two_note_pattern());
        store.replace_bar(0);
        assert!(store.bar(0).is_empty());
        assert!(store.has_content(0));

        store.replace_bar(7);
        assert!(store.has_content(7));
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut store = PatternStore::new();
        store.append_to_bar(1, NoteEvent::new(4, 900, 1));
        store.append_to_bar(1, NoteEvent::new(5, 100, 1));

        let bar = store.bar(1);
        assert_eq!(bar.len(), 2);
        assert_eq!(bar[0].pad, 4);
        assert_eq!(bar[1].pad, 5);
    }

    #[test]
    fn test_clear_all() {
        let mut store = PatternStore::with_pattern(&two_note_pattern());
        store.clear_all();
        assert_eq!(store.event_count(), 0);
        assert!(store.content_flags().iter().all(|flag| !flag));
    }

    #[test]
    fn test_to_pattern() {
        let store = PatternStore::with_pattern(&two_note_pattern());
        assert_eq!(store.to_pattern(), two_note_pattern());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_bar_panics_in_debug() {
        let mut store = PatternStore::new();
        store.append_to_bar(BAR_COUNT, NoteEvent::new(0, 0, BAR_COUNT));
    }
}
