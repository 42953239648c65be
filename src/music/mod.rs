// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Musical building blocks: the playable pad sets.

pub mod pads;

pub use pads::{Pad, PadSet, BASS_PADS, MELODY_PADS};
