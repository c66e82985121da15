use super::stft::{bin_frequencies, NUM_BINS};

/// Bands used for onset analysis.
pub const NUM_MELS: usize = 128;

const LINEAR_HZ_PER_MEL: f64 = 200.0 / 3.0;
const LOG_SPLIT_HZ: f64 = 1000.0;
const LOG_SPLIT_MEL: f64 = LOG_SPLIT_HZ / LINEAR_HZ_PER_MEL;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Slaney mel scale: linear below 1 kHz, logarithmic above.
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= LOG_SPLIT_HZ {
        LOG_SPLIT_MEL + (hz / LOG_SPLIT_HZ).ln() / log_step()
    } else {
        hz / LINEAR_HZ_PER_MEL
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= LOG_SPLIT_MEL {
        LOG_SPLIT_HZ * (log_step() * (mel - LOG_SPLIT_MEL)).exp()
    } else {
        mel * LINEAR_HZ_PER_MEL
    }
}

/// Triangular, area-normalized filters from 0 Hz to Nyquist.
pub struct MelFilterbank {
    /// `weights[band][bin]`.
    weights: Vec<Vec<f32>>,
}

impl MelFilterbank {
    pub fn new(sample_rate: u32, num_mels: usize) -> Self {
        let max_mel = hz_to_mel(sample_rate as f64 / 2.0);
        let edges: Vec<f64> = (0..num_mels + 2)
            .map(|i| mel_to_hz(max_mel * i as f64 / (num_mels + 1) as f64))
            .collect();
        let bins = bin_frequencies(sample_rate);

        let weights = (0..num_mels)
            .map(|band| {
                let (lo, center, hi) = (edges[band], edges[band + 1], edges[band + 2]);
                let norm = 2.0 / (hi - lo);
                bins.iter()
                    .map(|&f| {
                        let f = f as f64;
                        let rising = (f - lo) / (center - lo);
                        let falling = (hi - f) / (hi - center);
                        (rising.min(falling).max(0.0) * norm) as f32
                    })
                    .collect()
            })
            .collect();

        Self { weights }
    }

    pub fn num_bands(&self) -> usize {
        self.weights.len()
    }

    /// Band energies for one frame of bin powers.
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        debug_assert_eq!(power.len(), NUM_BINS);
        self.weights
            .iter()
            .map(|band| band.iter().zip(power).map(|(w, p)| w * p).sum())
            .collect()
    }
}
