use crate::audio::hpss::Decomposition;
use crate::audio::spectral::{mean, percentile, rms};

use super::features::FeatureExtractor;

/// Source material hint controlling classification thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Sound effects: higher energy needed before a hit counts as transient.
    Sfx,
    Music,
}

impl Mode {
    /// Exactly `sfx` selects [`Mode::Sfx`]; anything else is music.
    pub fn from_name(name: &str) -> Self {
        if name == "sfx" {
            Mode::Sfx
        } else {
            Mode::Music
        }
    }

    pub fn thresholds(self) -> Thresholds {
        match self {
            Mode::Sfx => Thresholds {
                transient_rms: 0.5,
                continuous_rms: 0.2,
                spectral_percentile: 90.0,
            },
            Mode::Music => Thresholds {
                transient_rms: 0.2,
                continuous_rms: 0.1,
                spectral_percentile: 70.0,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub transient_rms: f32,
    pub continuous_rms: f32,
    /// Percentile of the window's own centroid series the mean must exceed.
    pub spectral_percentile: f32,
}

/// Which event kinds an onset produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Transient,
    Continuous,
    Both,
}

impl Classification {
    pub fn emits_transient(self) -> bool {
        matches!(self, Classification::Transient | Classification::Both)
    }

    pub fn emits_continuous(self) -> bool {
        matches!(self, Classification::Continuous | Classification::Both)
    }
}

/// RMS of each decomposition stream over the energy window.
#[allow(dead_code)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StreamEnergies {
    pub harmonic: f32,
    pub percussive: f32,
    pub bass: f32,
}

/// Classify the full-mix signal around `time`.
///
/// Only the full-mix RMS and spectral centroid drive the decision. The
/// decomposition streams are measured over the same window and traced so a
/// stream-aware policy can slot in later; without a decomposition every
/// onset is continuous.
pub fn classify(
    extractor: &FeatureExtractor,
    time: f64,
    mode: Mode,
    decomposition: Option<&Decomposition>,
) -> Classification {
    let Some(decomposition) = decomposition else {
        return Classification::Continuous;
    };
    let Some(energy) = extractor.energy(time) else {
        return Classification::Continuous;
    };

    let streams = stream_energies(decomposition, extractor.energy_range(time));

    let centroid = extractor.centroid_series(time);
    if centroid.is_empty() {
        return Classification::Continuous;
    }
    let class = decide(energy, &centroid, mode.thresholds());

    log::trace!(
        "t={:.3}s rms={:.4} centroid={:.1}Hz streams={:?} -> {:?}",
        time,
        energy,
        mean(&centroid),
        streams,
        class
    );

    class
}

/// Transient when loud and brighter than the window's own spectral
/// percentile, continuous when quiet, both in between.
fn decide(energy: f32, centroid: &[f32], thresholds: Thresholds) -> Classification {
    let centroid_mean = mean(centroid);
    let spectral_threshold = percentile(centroid, thresholds.spectral_percentile);

    if energy > thresholds.transient_rms && centroid_mean > spectral_threshold {
        Classification::Transient
    } else if energy < thresholds.continuous_rms {
        Classification::Continuous
    } else {
        Classification::Both
    }
}

fn stream_energies(decomposition: &Decomposition, range: std::ops::Range<usize>) -> StreamEnergies {
    let window = |stream: &[f32]| {
        let end = range.end.min(stream.len());
        let start = range.start.min(end);
        rms(&stream[start..end])
    };
    StreamEnergies {
        harmonic: window(&decomposition.harmonic),
        percussive: window(&decomposition.percussive),
        bass: window(&decomposition.bass),
    }
}
