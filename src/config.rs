//! Runtime configuration
//!
//! How the host drives the chip: the rate its audio sink runs at and how
//! many samples each callback pulls. Defaults match a 22.05 kHz sink fed
//! 512-sample blocks.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PsgError, Result};

/// Default output sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;

/// Default samples per callback block
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// PSG host configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsgConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Samples rendered per callback
    pub block_size: usize,
    /// Whether output starts unmuted
    pub start_enabled: bool,
}

impl PsgConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PsgConfig = serde_json::from_str(json)
            .map_err(|e| PsgError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PsgError::ConfigError(format!("Failed to serialize config: {e}")))
    }

    /// Reject configurations the producer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(PsgError::ConfigError(
                "sample_rate must be greater than 0".into(),
            ));
        }
        if self.block_size == 0 {
            return Err(PsgError::ConfigError(
                "block_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Time covered by one block
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs_f64(self.block_size as f64 / self.sample_rate as f64)
    }

    /// Number of blocks needed to cover `seconds` of audio (rounded up)
    pub fn blocks_for(&self, seconds: f32) -> usize {
        let samples = (seconds.max(0.0) as f64 * self.sample_rate as f64).ceil() as usize;
        samples.div_ceil(self.block_size)
    }
}

impl Default for PsgConfig {
    fn default() -> Self {
        PsgConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            start_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = PsgConfig::default();
        assert_eq!(config.sample_rate, 22_050);
        assert_eq!(config.block_size, 512);
        assert!(config.start_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PsgConfig::from_json_str(r#"{ "sample_rate": 44100 }"#).unwrap();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            PsgConfig::from_json_str(r#"{ "block_size": 0 }"#),
            Err(PsgError::ConfigError(_))
        ));
        assert!(matches!(
            PsgConfig::from_json_str(r#"{ "sample_rate": 0 }"#),
            Err(PsgError::ConfigError(_))
        ));
        assert!(PsgConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = PsgConfig {
            sample_rate: 48_000,
            block_size: 256,
            start_enabled: false,
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(PsgConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_block_timing() {
        let config = PsgConfig::default();
        assert_relative_eq!(
            config.block_duration().as_secs_f64(),
            512.0 / 22_050.0,
            epsilon = 1e-9
        );
        assert_eq!(config.blocks_for(1.0), 44);
        assert_eq!(config.blocks_for(0.0), 0);
    }
}
