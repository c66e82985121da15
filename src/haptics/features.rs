use std::ops::Range;

use crate::audio::spectral::{mean, peak_abs, rms, spectral_centroid};

use super::event::{unit_clamp, HapticParams};
use super::stem::StemProfile;

/// RMS window: 20ms starting 10ms before the query time.
pub const ENERGY_WINDOW_SECS: f64 = 0.02;
pub const ENERGY_LEAD_SECS: f64 = 0.01;

/// Spectral-centroid window: 50ms starting 25ms before the query time.
pub const CENTROID_WINDOW_SECS: f64 = 0.05;
pub const CENTROID_LEAD_SECS: f64 = 0.025;

/// Global multipliers applied after peak normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub intensity: f32,
    pub sharpness: f32,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            intensity: 2.5,
            sharpness: 3.0,
        }
    }
}

/// Peak absolute value, with 1.0 standing in for an all-zero signal.
pub fn safe_peak(values: &[f32]) -> f32 {
    let peak = peak_abs(values);
    if peak > 0.0 {
        peak
    } else {
        1.0
    }
}

/// `clamp(clamp(value / peak) * factor)`.
pub fn normalize(value: f32, peak: f32, factor: f32) -> f32 {
    unit_clamp(unit_clamp(value / peak) * factor)
}

/// Sample range for a window of `width` seconds starting `lead` seconds
/// before `time`, clipped to `len`. May be empty.
pub fn window_range(len: usize, sample_rate: u32, time: f64, lead: f64, width: f64) -> Range<usize> {
    let sr = sample_rate as f64;
    let size = (sr * width) as usize;
    let start = (((time - lead) * sr) as i64).max(0) as usize;
    let start = start.min(len);
    let end = start.saturating_add(size).min(len);
    start..end
}

/// Local features of one buffer around arbitrary times.
pub struct FeatureExtractor<'a> {
    samples: &'a [f32],
    sample_rate: u32,
    peak: f32,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            peak: safe_peak(samples),
        }
    }

    /// Energy window around `time`. Empty when it clips away at the buffer
    /// edge or the buffer is shorter than one window.
    pub fn energy_range(&self, time: f64) -> Range<usize> {
        let width = (self.sample_rate as f64 * ENERGY_WINDOW_SECS) as usize;
        if self.samples.len() < width {
            return 0..0;
        }
        window_range(
            self.samples.len(),
            self.sample_rate,
            time,
            ENERGY_LEAD_SECS,
            ENERGY_WINDOW_SECS,
        )
    }

    /// RMS over the energy window, `None` when the window is empty.
    pub fn energy(&self, time: f64) -> Option<f32> {
        let range = self.energy_range(time);
        if range.is_empty() {
            return None;
        }
        Some(rms(&self.samples[range]))
    }

    /// Per-frame spectral centroid over the centroid window. Empty when the
    /// window is.
    pub fn centroid_series(&self, time: f64) -> Vec<f32> {
        let range = window_range(
            self.samples.len(),
            self.sample_rate,
            time,
            CENTROID_LEAD_SECS,
            CENTROID_WINDOW_SECS,
        );
        if range.is_empty() {
            return Vec::new();
        }
        spectral_centroid(&self.samples[range], self.sample_rate)
    }

    /// Intensity from normalized RMS, sharpness from normalized mean
    /// centroid, then stem calibration.
    pub fn parameters(&self, time: f64, stem: StemProfile, factors: ScaleFactors) -> HapticParams {
        let Some(energy) = self.energy(time) else {
            return HapticParams::ZERO;
        };

        let centroid = self.centroid_series(time);
        if centroid.is_empty() {
            return HapticParams::new(energy * factors.intensity, 0.0);
        }

        let brightness = mean(&centroid);
        let base = HapticParams::new(
            normalize(energy, self.peak, factors.intensity),
            normalize(brightness, safe_peak(&centroid), factors.sharpness),
        );
        stem.calibrate(base)
    }
}
