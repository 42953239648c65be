// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device with the configured sample rate and
//! channel count. The buffer size is a request: devices that cannot honor
//! it fall back to their own default.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleRate, Stream, StreamConfig, SupportedBufferSize};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::AudioError;

/// Rates offered in `--list-audio` output
const COMMON_RATES: [u32; 4] = [44100, 48000, 88200, 96000];

/// Audio output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Requested buffer size in frames
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
    /// Output channels, mono or stereo
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_buffer_size() -> u32 {
    512
}

fn default_channels() -> u16 {
    2
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            channels: default_channels(),
        }
    }
}

impl AudioConfig {
    /// Latency of one requested buffer in milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.buffer_size as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Check the values are usable for a stream
    pub fn validate(&self) -> Result<(), AudioError> {
        if !(1..=2).contains(&self.channels) {
            return Err(AudioError::InvalidConfig(format!(
                "unsupported channel count {}",
                self.channels
            )));
        }
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Err(AudioError::InvalidConfig(format!(
                "unsupported sample rate {}",
                self.sample_rate
            )));
        }
        if !(64..=4096).contains(&self.buffer_size) {
            return Err(AudioError::InvalidConfig(format!(
                "buffer size {} outside 64-4096",
                self.buffer_size
            )));
        }
        Ok(())
    }

    /// Requested buffer size if it falls inside the device's range
    fn buffer_for(&self, supported: &SupportedBufferSize) -> BufferSize {
        match supported {
            SupportedBufferSize::Range { min, max }
                if (*min..=*max).contains(&self.buffer_size) =>
            {
                BufferSize::Fixed(self.buffer_size)
            }
            SupportedBufferSize::Range { .. } => {
                warn!(
                    buffer_size = self.buffer_size,
                    "buffer size not supported, using device default"
                );
                BufferSize::Default
            }
            SupportedBufferSize::Unknown => BufferSize::Default,
        }
    }
}

/// Pick a stream config for the device that keeps the configured rate and
/// channel count.
fn negotiate(device: &Device, config: &AudioConfig) -> Result<StreamConfig, AudioError> {
    let rate = SampleRate(config.sample_rate);
    let ranges = device
        .supported_output_configs()
        .map_err(|e| AudioError::InitFailed(format!("Failed to query device: {}", e)))?;

    let matching = ranges
        .filter(|range| range.channels() == config.channels)
        .find(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate());

    match matching {
        Some(range) => Ok(StreamConfig {
            channels: config.channels,
            sample_rate: rate,
            buffer_size: config.buffer_for(range.buffer_size()),
        }),
        None => Err(AudioError::InvalidConfig(format!(
            "device does not support {} Hz with {} channel(s)",
            config.sample_rate, config.channels
        ))),
    }
}

/// A running output stream. Dropping it stops playback.
pub struct AudioOutput {
    _stream: Stream,
}

impl AudioOutput {
    /// Open the default device and start pulling samples from `render`,
    /// which fills interleaved frames for the given channel count.
    pub fn new<F>(config: AudioConfig, mut render: F) -> Result<Self, AudioError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        config.validate()?;

        let device = cpal::default_host()
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;
        let stream_config = negotiate(&device, &config)?;
        let channels = config.channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.fill(0.0);
                    render(data, channels);
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

        debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = config.sample_rate,
            buffer = ?stream_config.buffer_size,
            "audio stream running"
        );

        Ok(Self { _stream: stream })
    }
}

/// Names of all output devices on the default host
pub fn list_devices() -> Vec<String> {
    match cpal::default_host().output_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            warn!("cannot enumerate output devices: {}", e);
            Vec::new()
        }
    }
}

/// Name of the default output device
pub fn default_device_name() -> Option<String> {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| d.name().ok())
}

/// Common sample rates the default device accepts
pub fn supported_sample_rates() -> Vec<u32> {
    let Some(device) = cpal::default_host().default_output_device() else {
        return Vec::new();
    };
    let Ok(ranges) = device.supported_output_configs() else {
        return Vec::new();
    };

    let mut rates: Vec<u32> = ranges
        .flat_map(|range| {
            let (min, max) = (range.min_sample_rate().0, range.max_sample_rate().0);
            COMMON_RATES
                .into_iter()
                .filter(move |rate| (min..=max).contains(rate))
        })
        .collect();
    rates.sort_unstable();
    rates.dedup();
    rates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_config_default() {
        let config = AudioConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_size, 512);
        assert_eq!(config.channels, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_latency_calculation() {
        let config = AudioConfig::default();
        assert!((config.latency_ms() - 11.6).abs() < 0.1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AudioConfig {
            channels: 6,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AudioError::InvalidConfig(_))));

        let config = AudioConfig {
            buffer_size: 16,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AudioConfig {
            sample_rate: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buffer_request() {
        let config = AudioConfig::default();
        let roomy = SupportedBufferSize::Range { min: 64, max: 2048 };
        assert_eq!(config.buffer_for(&roomy), BufferSize::Fixed(512));

        let tight = SupportedBufferSize::Range { min: 1024, max: 2048 };
        assert_eq!(config.buffer_for(&tight), BufferSize::Default);
        assert_eq!(config.buffer_for(&SupportedBufferSize::Unknown), BufferSize::Default);
    }

    #[test]
    fn test_device_queries_without_hardware() {
        // Must not panic on machines without audio
        let _ = default_device_name();
        let _ = list_devices();
        assert!(supported_sample_rates().windows(2).all(|w| w[0] < w[1]));
    }
}
