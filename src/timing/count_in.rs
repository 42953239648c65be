// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Count-in pre-roll.
//!
//! Three plain clicks a beat apart, driven by a timer separate from the
//! transport clock. The tick after the last click completes the count-in.

use std::time::Duration;

use super::clock::beat_duration;

/// Clicks before recording starts
pub const COUNT_IN_CLICKS: u32 = 3;

/// Result of advancing the count-in by one beat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountInStep {
    /// Play click number `n` (1-based)
    Click(u32),
    /// Pre-roll finished
    Complete,
}

/// Count-in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountIn {
    clicks: u32,
    beat: Duration,
}

impl CountIn {
    /// Create a count-in for the given tempo
    pub fn new(bpm: f64) -> Self {
        Self {
            clicks: 0,
            beat: beat_duration(bpm),
        }
    }

    /// Time between count-in ticks
    pub fn beat(&self) -> Duration {
        self.beat
    }

    /// Clicks played so far
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Advance by one timer tick
    pub fn advance(&mut self) -> CountInStep {
        if self.clicks < COUNT_IN_CLICKS {
            self.clicks += 1;
            CountInStep::Click(self.clicks)
        } else {
            CountInStep::Complete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_clicks_then_complete() {
        let mut count_in = CountIn::new(100.0);
        assert_eq!(count_in.advance(), CountInStep::Click(1));
        assert_eq!(count_in.advance(), CountInStep::Click(2));
        assert_eq!(count_in.advance(), CountInStep::Click(3));
        assert_eq!(count_in.advance(), CountInStep::Complete);
        assert_eq!(count_in.clicks(), 3);
    }

    #[test]
    fn test_beat_spacing() {
        assert_eq!(CountIn::new(100.0).beat(), Duration::from_millis(600));
        assert_eq!(CountIn::new(60.0).beat(), Duration::from_secs(1));
    }
}
