// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for kidsynth.
//!
//! Start-up settings are read from a YAML file. Every field has a default,
//! so an empty file (or no file at all) yields the stock configuration.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::AudioConfig;
use crate::music::PadSet;
use crate::sequencer::preset;
use crate::timing::{DEFAULT_BPM, MAX_BPM, MIN_BPM};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Master volume (0 - 100)
    #[serde(default = "default_volume")]
    pub volume: u8,
    /// Loop the first four bars instead of all sixteen
    #[serde(default = "default_looping")]
    pub looping: bool,
    /// Pad set shown at start-up
    #[serde(default)]
    pub pad_set: PadSet,
    /// Preset loaded at start-up; `none` starts with an empty pattern
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,
}

fn default_tempo() -> f64 {
    DEFAULT_BPM
}
fn default_volume() -> u8 {
    75
}
fn default_looping() -> bool {
    true
}
fn default_preset() -> String {
    "bass".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            volume: default_volume(),
            looping: default_looping(),
            pad_set: PadSet::default(),
            preset: default_preset(),
            audio: AudioConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse settings from a YAML string. An empty document gives defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save settings to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Whether the start-up pattern is empty
    pub fn starts_empty(&self) -> bool {
        self.preset.trim().eq_ignore_ascii_case("none")
    }

    /// Check ranges and names
    pub fn validate(&self) -> Result<()> {
        if !self.tempo.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&self.tempo) {
            bail!(
                "tempo {} out of range ({} - {} BPM)",
                self.tempo,
                MIN_BPM,
                MAX_BPM
            );
        }
        if self.volume > 100 {
            bail!("volume {} out of range (0 - 100)", self.volume);
        }
        if !self.starts_empty() && preset(&self.preset).is_none() {
            bail!("unknown preset '{}'", self.preset);
        }
        self.audio.validate().context("invalid audio settings")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_settings() {
        let yaml = r#"
tempo: 120
volume: 50
looping: false
pad_set: melody
preset: pop
audio:
  sample_rate: 48000
  buffer_size: 256
  channels: 2
"#;

        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.tempo, 120.0);
        assert_eq!(settings.volume, 50);
        assert!(!settings.looping);
        assert_eq!(settings.pad_set, PadSet::Melody);
        assert_eq!(settings.preset, "pop");
        assert_eq!(settings.audio.sample_rate, 48000);
        assert_eq!(settings.audio.buffer_size, 256);
    }

    #[test]
    fn test_default_values() {
        let settings = Settings::from_yaml("tempo: 90\n").unwrap();
        assert_eq!(settings.tempo, 90.0);
        assert_eq!(settings.volume, 75);
        assert!(settings.looping);
        assert_eq!(settings.pad_set, PadSet::Bass);
        assert_eq!(settings.preset, "bass");
        assert_eq!(settings.audio, AudioConfig::default());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Settings::from_yaml("tempo: 10\n").is_err());
        assert!(Settings::from_yaml("tempo: 300\n").is_err());
        assert!(Settings::from_yaml("volume: 101\n").is_err());
        assert!(Settings::from_yaml("preset: polka\n").is_err());
        assert!(Settings::from_yaml("audio:\n  channels: 6\n").is_err());
    }

    #[test]
    fn test_none_preset() {
        let settings = Settings::from_yaml("preset: none\n").unwrap();
        assert!(settings.starts_empty());
        assert!(!Settings::default().starts_empty());
    }

    #[test]
    fn test_round_trip() {
        let original = Settings {
            tempo: 132.0,
            volume: 40,
            looping: false,
            pad_set: PadSet::Melody,
            preset: "melody".to_string(),
            audio: AudioConfig::default(),
        };

        let yaml = original.to_yaml().unwrap();
        let parsed = Settings::from_yaml(&yaml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kidsynth.yaml");

        let settings = Settings {
            tempo: 80.0,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tempo: [not a number").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse"));

        assert!(Settings::load("/nonexistent/kidsynth.yaml").is_err());
    }
}
