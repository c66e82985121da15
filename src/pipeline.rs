use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::audio::decode::{self, AudioData};
use crate::audio::hpss::{self, Decomposition};
use crate::audio::onset;
use crate::error::ConfigError;
use crate::haptics::ahap;
use crate::haptics::classify::Mode;
use crate::haptics::event::HapticPattern;
use crate::haptics::features::ScaleFactors;
use crate::haptics::generate::{generate_pattern, PatternSettings};
use crate::haptics::stem::{canonical_stem_name, StemProfile, ALL_STEMS};

pub const OUTPUT_EXTENSION: &str = "ahap";

/// Marker stripped from unsplit output names (`rain_background.wav` -> `rain.ahap`).
const BACKGROUND_MARKER: &str = "_background";

/// Which stems to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Split {
    /// One pattern over the full mix, identity calibration.
    None,
    /// One pattern per stem in fan-out order.
    All,
    /// One pattern calibrated for a single (possibly unknown) stem name.
    Stem(String),
}

impl Split {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        let name = canonical_stem_name(name);
        match name.as_str() {
            "" => Err(ConfigError::EmptySplit),
            "none" => Ok(Split::None),
            "all" => Ok(Split::All),
            _ => Ok(Split::Stem(name)),
        }
    }

    /// `(label, profile)` per output. Unsplit output has no label.
    fn targets(&self) -> Vec<(Option<String>, StemProfile)> {
        match self {
            Split::None => vec![(None, StemProfile::Identity)],
            Split::All => ALL_STEMS
                .iter()
                .map(|stem| (stem.name().map(String::from), *stem))
                .collect(),
            Split::Stem(name) => vec![(Some(name.clone()), StemProfile::for_name(name))],
        }
    }
}

/// Settings for one run, fixed before processing starts.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub sample_rate: u32,
    pub mode: Mode,
    pub split: Split,
    pub sharpness_factor: f32,
    pub intensity_factor: f32,
    pub time_step: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let factors = ScaleFactors::default();
        Self {
            sample_rate: 44100,
            mode: Mode::Sfx,
            split: Split::None,
            sharpness_factor: factors.sharpness,
            intensity_factor: factors.intensity,
            time_step: 0.1,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep(self.time_step));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        // Shorter steps than one sample would only repeat grid windows.
        if self.time_step < 1.0 / self.sample_rate as f64 {
            return Err(ConfigError::InvalidTimeStep(self.time_step));
        }
        for (name, value) in [
            ("Sharpness factor", self.sharpness_factor),
            ("Intensity factor", self.intensity_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidFactor { name, value });
            }
        }
        if let Split::Stem(name) = &self.split {
            if name.is_empty() {
                return Err(ConfigError::EmptySplit);
            }
        }
        Ok(())
    }

    fn factors(&self) -> ScaleFactors {
        ScaleFactors {
            intensity: self.intensity_factor,
            sharpness: self.sharpness_factor,
        }
    }
}

/// Per-buffer work shared read-only by every stem.
pub struct Analysis {
    pub decomposition: Option<Decomposition>,
    pub onsets: Vec<f64>,
}

pub fn analyze(audio: &AudioData) -> Analysis {
    log::info!("Separating harmonic/percussive/bass streams...");
    let decomposition = hpss::decompose(&audio.samples);
    if decomposition.is_none() {
        log::warn!("Separation produced no samples; onsets will be treated as continuous");
    }

    let onsets = onset::detect_onsets(&audio.samples, audio.sample_rate);
    log::info!("Detected {} onsets", onsets.len());

    Analysis {
        decomposition,
        onsets,
    }
}

/// A rendered pattern with its stem label (`None` for unsplit output).
#[derive(Debug)]
pub struct StemPattern {
    pub label: Option<String>,
    pub pattern: HapticPattern,
}

/// Render every requested stem from one analysis. Stems run in parallel
/// and come back in fan-out order.
pub fn render(audio: &AudioData, analysis: &Analysis, config: &PipelineConfig) -> Vec<StemPattern> {
    config
        .split
        .targets()
        .into_par_iter()
        .map(|(label, stem)| {
            let settings = PatternSettings {
                mode: config.mode,
                stem,
                factors: config.factors(),
                time_step: config.time_step,
            };
            let pattern = generate_pattern(
                &audio.samples,
                audio.sample_rate,
                &analysis.onsets,
                analysis.decomposition.as_ref(),
                &settings,
            );
            StemPattern { label, pattern }
        })
        .collect()
}

/// Decode, analyze and render one file, writing one `.ahap` per stem.
/// Output goes next to the input unless `output_dir` is given.
pub fn convert_file(
    input: &Path,
    output_dir: Option<&Path>,
    config: &PipelineConfig,
) -> Result<Vec<PathBuf>> {
    let audio = decode::load_mono(input, config.sample_rate)?;
    log::info!(
        "Loaded {}: {:.2}s at {}Hz",
        input.display(),
        audio.duration(),
        audio.sample_rate
    );

    let analysis = analyze(&audio);
    let rendered = render(&audio, &analysis, config);

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(rendered.len());
    for StemPattern { label, pattern } in &rendered {
        let path = dir.join(output_file_name(input, label.as_deref()));
        write_pattern(&path, pattern)?;
        log::info!(
            "Wrote {} ({} transient, {} continuous)",
            path.display(),
            pattern.transient_count(),
            pattern.continuous_count()
        );
        written.push(path);
    }

    Ok(written)
}

/// `<stem>.ahap` without a label, `<stem>_<label>.ahap` with one.
pub fn output_file_name(input: &Path, label: Option<&str>) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    match label {
        None => format!("{}.{}", stem.replace(BACKGROUND_MARKER, ""), OUTPUT_EXTENSION),
        Some(label) => format!("{}_{}.{}", stem, label, OUTPUT_EXTENSION),
    }
}

pub fn write_pattern(path: &Path, pattern: &HapticPattern) -> Result<()> {
    let json = ahap::to_json(pattern).context("Failed to serialize haptic pattern")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write haptic pattern: {}", path.display()))
}
