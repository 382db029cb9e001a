//! Configuration management.

use anyhow::{Context, Result};
use hostprobe_sensors::{DEFAULT_NFFT, DEFAULT_SAMPLE_RATE, DEFAULT_TEMPERATURE_COMMAND};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Temperature utility configuration
    #[serde(default)]
    pub temperature: TemperatureConfig,

    /// Battery configuration
    #[serde(default)]
    pub battery: BatteryConfig,

    /// CPU usage configuration
    #[serde(default)]
    pub cpu: CpuConfig,

    /// Microphone configuration
    #[serde(default)]
    pub microphone: MicrophoneConfig,

    /// Noise spectrum plot configuration
    #[serde(default)]
    pub spectrum: SpectrumConfig,
}

/// Temperature utility configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Executable printing the CPU temperature
    #[serde(default = "default_temperature_command")]
    pub command: String,

    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            enable: default_enable(),
            command: default_temperature_command(),
            args: Vec::new(),
        }
    }
}

/// Battery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enable: default_enable(),
        }
    }
}

/// CPU usage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Sampling interval in milliseconds
    #[serde(default = "default_cpu_interval")]
    pub interval: u64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            enable: default_enable(),
            interval: default_cpu_interval(),
        }
    }
}

/// Microphone configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrophoneConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Recording length in milliseconds
    #[serde(default = "default_duration")]
    pub duration: u64,

    /// Sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self {
            enable: default_enable(),
            duration: default_duration(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Noise spectrum plot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// PNG file to write; no plot when unset
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// FFT segment length
    #[serde(default = "default_nfft")]
    pub nfft: usize,

    /// Plot width
    #[serde(default = "default_width")]
    pub width: u32,

    /// Plot height
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            output: None,
            nfft: default_nfft(),
            width: default_width(),
            height: default_height(),
        }
    }
}

// Default value functions
fn default_enable() -> bool {
    true
}

fn default_temperature_command() -> String {
    DEFAULT_TEMPERATURE_COMMAND.to_string()
}

fn default_cpu_interval() -> u64 {
    1000
}

fn default_duration() -> u64 {
    2000
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_nfft() -> usize {
    DEFAULT_NFFT
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    400
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        Ok(config)
    }
}
