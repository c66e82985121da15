use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_MODE: &str = "sfx";
pub const DEFAULT_SPLIT: &str = "none";
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_SHARPNESS_FACTOR: f32 = 3.0;
pub const DEFAULT_INTENSITY_FACTOR: f32 = 2.5;
pub const DEFAULT_TIME_STEP: f64 = 0.1;

#[derive(Parser, Debug)]
#[command(name = "hapticize", about = "Convert audio files into AHAP haptic patterns")]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for .ahap output (defaults to each input's directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Classification mode: "sfx" for sound effects, anything else for music
    #[arg(short, long, default_value = DEFAULT_MODE)]
    pub mode: String,

    /// Stem split: "none", "all", or a stem name (vocals, drums, bass, other)
    #[arg(short, long, default_value = DEFAULT_SPLIT)]
    pub split: String,

    /// Sample rate audio is resampled to before analysis
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Multiplier applied to normalized sharpness
    #[arg(long, default_value_t = DEFAULT_SHARPNESS_FACTOR)]
    pub sharpness_factor: f32,

    /// Multiplier applied to normalized intensity
    #[arg(long, default_value_t = DEFAULT_INTENSITY_FACTOR)]
    pub intensity_factor: f32,

    /// Spacing of the continuous event grid in seconds
    #[arg(long, default_value_t = DEFAULT_TIME_STEP)]
    pub time_step: f64,

    /// Config file (defaults to ./hapticize.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
