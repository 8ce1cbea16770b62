use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analyser: AnalyserConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub harmony: HarmonyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalyserConfig {
    /// Number of frequency bins per frame (half the FFT size)
    #[serde(default = "default_buffer_length")]
    pub buffer_length: usize,
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_min_db")]
    pub min_db: f32,
    #[serde(default = "default_max_db")]
    pub max_db: f32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DetectionConfig {
    #[serde(default = "default_peak_count")]
    pub peak_count: usize,
    #[serde(default = "default_min_bin")]
    pub min_bin: usize,
    #[serde(default = "default_loudness_threshold")]
    pub loudness_threshold: f32,
    #[serde(default = "default_hold_ms")]
    pub hold_ms: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HarmonyConfig {
    #[serde(default = "default_assume_perfect_fifth")]
    pub assume_perfect_fifth: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            buffer_length: default_buffer_length(),
            smoothing: default_smoothing(),
            min_db: default_min_db(),
            max_db: default_max_db(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            peak_count: default_peak_count(),
            min_bin: default_min_bin(),
            loudness_threshold: default_loudness_threshold(),
            hold_ms: default_hold_ms(),
        }
    }
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            assume_perfect_fifth: default_assume_perfect_fifth(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

pub fn default_buffer_length() -> usize { 2048 }
pub fn default_smoothing() -> f32 { 0.8 }
fn default_min_db() -> f32 { -100.0 }
fn default_max_db() -> f32 { -30.0 }
pub fn default_peak_count() -> usize { 10 }
pub fn default_min_bin() -> usize { 20 }
pub fn default_loudness_threshold() -> f32 { 140.0 }
pub fn default_hold_ms() -> f64 { 100.0 }
fn default_assume_perfect_fifth() -> bool { true }
pub fn default_width() -> u32 { 800 }
pub fn default_height() -> u32 { 400 }
pub fn default_fps() -> u32 { 60 }
pub fn default_crf() -> u32 { 18 }
pub fn default_codec() -> String { "libx264".into() }

impl AnalyserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_length == 0 || !self.buffer_length.is_power_of_two() {
            return Err(ConfigError::BufferLength(self.buffer_length));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        if !(self.min_db < self.max_db) {
            return Err(ConfigError::DecibelRange {
                min_db: self.min_db,
                max_db: self.max_db,
            });
        }
        Ok(())
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.peak_count == 0 {
            return Err(ConfigError::ZeroPeakCount);
        }
        if !self.hold_ms.is_finite() || self.hold_ms < 0.0 {
            return Err(ConfigError::HoldWindow(self.hold_ms));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyser.validate()?;
        self.detection.validate()?;
        if self.output.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// `chordscope.toml` in the working directory, then the per-user config locations.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("chordscope.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("chordscope").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("chordscope").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
