// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Log output setup.
//!
//! Logs go to a file so they never draw over the terminal UI. The filter is
//! read from `KIDSYNTH_LOG` using the usual `tracing` directive syntax.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "KIDSYNTH_LOG";
/// Filter used when the variable is unset or invalid
pub const DEFAULT_FILTER: &str = "info";
/// Default log file
pub const DEFAULT_LOG_FILE: &str = "kidsynth.log";

/// Build the log filter from the environment
pub fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Open the log file for appending, creating it if needed
pub fn open_log_file<P: AsRef<Path>>(path: P) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())
        .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))
}

/// Install the global subscriber writing to `path`
pub fn init<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = open_log_file(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}
