use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::{
    Cli, DEFAULT_INTENSITY_FACTOR, DEFAULT_MODE, DEFAULT_SAMPLE_RATE, DEFAULT_SHARPNESS_FACTOR,
    DEFAULT_SPLIT, DEFAULT_TIME_STEP,
};

pub const LOCAL_CONFIG: &str = "hapticize.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub haptics: HapticsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct HapticsConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_split")]
    pub split: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_sharpness_factor")]
    pub sharpness_factor: f32,
    #[serde(default = "default_intensity_factor")]
    pub intensity_factor: f32,
    #[serde(default = "default_time_step")]
    pub time_step: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            split: default_split(),
            sample_rate: default_sample_rate(),
            sharpness_factor: default_sharpness_factor(),
            intensity_factor: default_intensity_factor(),
            time_step: default_time_step(),
        }
    }
}

fn default_mode() -> String { DEFAULT_MODE.into() }
fn default_split() -> String { DEFAULT_SPLIT.into() }
fn default_sample_rate() -> u32 { DEFAULT_SAMPLE_RATE }
fn default_sharpness_factor() -> f32 { DEFAULT_SHARPNESS_FACTOR }
fn default_intensity_factor() -> f32 { DEFAULT_INTENSITY_FACTOR }
fn default_time_step() -> f64 { DEFAULT_TIME_STEP }

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

/// Explicit path, then `./hapticize.toml`, then the user config dirs.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("hapticize").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("hapticize").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Config values apply only where the CLI is still at its default.
pub fn merge_into(cli: &mut Cli, cfg: Config) {
    let haptics = cfg.haptics;
    if cli.mode == DEFAULT_MODE { cli.mode = haptics.mode; }
    if cli.split == DEFAULT_SPLIT { cli.split = haptics.split; }
    if cli.sample_rate == DEFAULT_SAMPLE_RATE { cli.sample_rate = haptics.sample_rate; }
    if cli.sharpness_factor == DEFAULT_SHARPNESS_FACTOR {
        cli.sharpness_factor = haptics.sharpness_factor;
    }
    if cli.intensity_factor == DEFAULT_INTENSITY_FACTOR {
        cli.intensity_factor = haptics.intensity_factor;
    }
    if cli.time_step == DEFAULT_TIME_STEP { cli.time_step = haptics.time_step; }
    if cli.output_dir.is_none() {
        cli.output_dir = cfg.output.dir;
    }
}
