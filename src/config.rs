//! Soundboard configuration, loaded from camelCase JSON.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::error::ConfigError;
use crate::sound::SoundName;

/// Seed used for the effect RNG stream when the host does not supply one.
pub const DEFAULT_SEED: u64 = 0x5EED_B0A7_D5A1_1AB5;

/// Parameters of the fallback beep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeepConfig {
    /// Tone frequency in Hz.
    pub frequency: f64,
    /// Tone length in seconds.
    pub duration: f64,
    /// Constant gain [0, 1].
    pub gain: f64,
    pub waveform: Waveform,
}

impl Default for BeepConfig {
    fn default() -> Self {
        BeepConfig {
            frequency: 880.0,
            duration: 0.12,
            gain: 0.2,
            waveform: Waveform::Square,
        }
    }
}

/// Top-level soundboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundboardConfig {
    /// Render sample rate in Hz.
    pub sample_rate: u32,
    /// Directory holding `<name>.<ext>` assets.
    pub sounds_dir: PathBuf,
    pub asset_extension: String,
    /// Element attribute carrying the sound identifier.
    pub attribute: String,
    /// Names registered in the file-playback table.
    pub sound_names: Vec<String>,
    /// Gain applied to every rendered buffer before soft clipping.
    pub master_gain: f64,
    /// Seed for the effect RNG stream. `None` uses [`DEFAULT_SEED`].
    pub seed: Option<u64>,
    pub beep: BeepConfig,
}

impl Default for SoundboardConfig {
    fn default() -> Self {
        SoundboardConfig {
            sample_rate: 44100,
            sounds_dir: PathBuf::from("./sounds"),
            asset_extension: "mp3".to_string(),
            attribute: "data-sound".to_string(),
            sound_names: SoundName::ALL.iter().map(|n| n.to_string()).collect(),
            master_gain: 0.8,
            seed: None,
            beep: BeepConfig::default(),
        }
    }
}

impl SoundboardConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SoundboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if !(self.beep.frequency > 0.0) {
            return Err(ConfigError::InvalidBeep { field: "frequency", value: self.beep.frequency });
        }
        if !(self.beep.duration > 0.0) {
            return Err(ConfigError::InvalidBeep { field: "duration", value: self.beep.duration });
        }
        for gain in [self.beep.gain, self.master_gain] {
            if !(0.0..=1.0).contains(&gain) {
                return Err(ConfigError::InvalidGain(gain));
            }
        }
        if self.asset_extension.trim().is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        self.registered_names()?;
        Ok(())
    }

    /// The configured sound names, parsed into the closed set.
    pub fn registered_names(&self) -> Result<Vec<SoundName>, ConfigError> {
        self.sound_names
            .iter()
            .map(|s| s.parse().map_err(|_| ConfigError::UnknownSoundName(s.clone())))
            .collect()
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }
}
