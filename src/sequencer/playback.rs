// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bar playback.
//!
//! On every bar-start the driver reads the bar's events and turns each one
//! into a tone scheduled at its offset from the bar-start instant.

use std::time::Duration;

use tracing::{debug, warn};

use super::pattern::PatternStore;
use crate::audio::Tone;
use crate::music::PadSet;

/// A tone due at an offset from the bar start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTone {
    /// Delay after the bar-start instant
    pub offset: Duration,
    /// Pad that produced the tone
    pub pad: usize,
    pub tone: Tone,
}

/// Schedule every event of `bar`, in store order.
///
/// Events whose pad does not exist in `pad_set`, or whose offset does not
/// fall inside `bar_duration`, are skipped. The store is never modified.
pub fn dispatch_bar(
    store: &PatternStore,
    pad_set: PadSet,
    bar: usize,
    bar_duration: Duration,
) -> Vec<ScheduledTone> {
    let events = store.bar(bar);
    let mut scheduled = Vec::with_capacity(events.len());

    for event in events {
        let offset = Duration::from_millis(event.offset_ms);
        if offset >= bar_duration {
            warn!(
                offset_ms = event.offset_ms,
                bar_ms = bar_duration.as_millis() as u64,
                bar,
                "note falls past the end of the bar, skipping"
            );
            continue;
        }
        let Some(pad) = pad_set.get(event.pad) else {
            warn!(
                pad = event.pad,
                bar,
                pad_set = %pad_set,
                "recorded pad not in active pad set, skipping"
            );
            continue;
        };
        scheduled.push(ScheduledTone {
            offset,
            pad: event.pad,
            tone: Tone::for_pad(pad),
        });
    }

    if !scheduled.is_empty() {
        debug!(bar, notes = scheduled.len(), "bar dispatched");
    }
    scheduled
}
