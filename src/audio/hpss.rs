//! Harmonic/percussive separation by median filtering of the magnitude
//! spectrogram, with margin-controlled soft masks.

use rayon::prelude::*;
use rustfft::num_complex::Complex;

use super::stft::{istft, stft, Spectrogram};

/// Median kernel length along time (harmonic) and frequency (percussive).
const KERNEL_SIZE: usize = 31;
const MASK_POWER: i32 = 2;

/// Separation margins `(harmonic, percussive)`. Larger margins leave more
/// energy unassigned to either stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    pub harmonic: f32,
    pub percussive: f32,
}

impl Margin {
    pub const UNIT: Margin = Margin { harmonic: 1.0, percussive: 1.0 };
    /// Wide percussive margin, leaves mostly sustained low-frequency content
    /// in the harmonic output.
    pub const BASS: Margin = Margin { harmonic: 1.0, percussive: 20.0 };
}

/// Time-domain harmonic and percussive streams, each the length of the input.
pub struct Separated {
    pub harmonic: Vec<f32>,
    pub percussive: Vec<f32>,
}

/// Harmonic, percussive and bass-emphasized copies of one buffer, all the
/// length of the source.
#[derive(Clone, Debug)]
pub struct Decomposition {
    pub harmonic: Vec<f32>,
    pub percussive: Vec<f32>,
    pub bass: Vec<f32>,
}

/// Two separation passes: unit margins for harmonic/percussive, then the
/// wide bass margin keeping only its harmonic output. `None` when there are
/// no samples to separate.
pub fn decompose(samples: &[f32]) -> Option<Decomposition> {
    if samples.is_empty() {
        return None;
    }
    let Separated { harmonic, percussive } = separate(samples, Margin::UNIT);
    let bass = separate(samples, Margin::BASS).harmonic;
    Some(Decomposition {
        harmonic,
        percussive,
        bass,
    })
}

pub fn separate(samples: &[f32], margin: Margin) -> Separated {
    let spec = stft(samples);
    let (harmonic_spec, percussive_spec) = separate_spectrogram(&spec, margin);
    Separated {
        harmonic: istft(&harmonic_spec, samples.len()),
        percussive: istft(&percussive_spec, samples.len()),
    }
}

fn separate_spectrogram(spec: &Spectrogram, margin: Margin) -> (Spectrogram, Spectrogram) {
    let mag = spec.magnitudes();
    let num_frames = mag.len();
    if num_frames == 0 {
        return (spec.clone(), spec.clone());
    }
    let num_bins = mag[0].len();

    // Harmonic: median across time for each bin.
    let by_bin: Vec<Vec<f32>> = (0..num_bins)
        .into_par_iter()
        .map(|k| {
            let row: Vec<f32> = mag.iter().map(|frame| frame[k]).collect();
            median_filter(&row, KERNEL_SIZE)
        })
        .collect();

    // Percussive: median across frequency for each frame.
    let percussive: Vec<Vec<f32>> = mag
        .par_iter()
        .map(|frame| median_filter(frame, KERNEL_SIZE))
        .collect();

    let split_zeros = margin.harmonic == 1.0 && margin.percussive == 1.0;

    let mut harmonic_frames = Vec::with_capacity(num_frames);
    let mut percussive_frames = Vec::with_capacity(num_frames);
    for t in 0..num_frames {
        let mut h_frame = Vec::with_capacity(num_bins);
        let mut p_frame = Vec::with_capacity(num_bins);
        for k in 0..num_bins {
            let h = by_bin[k][t];
            let p = percussive[t][k];
            let h_mask = softmask(h, p * margin.harmonic, split_zeros);
            let p_mask = softmask(p, h * margin.percussive, split_zeros);
            let x: Complex<f32> = spec.frames[t][k];
            h_frame.push(x * h_mask);
            p_frame.push(x * p_mask);
        }
        harmonic_frames.push(h_frame);
        percussive_frames.push(p_frame);
    }

    (
        Spectrogram { frames: harmonic_frames },
        Spectrogram { frames: percussive_frames },
    )
}

/// Wiener-style soft mask `x^p / (x^p + ref^p)`. Bins where both are zero
/// get 0.5 when `split_zeros`, otherwise 0.
fn softmask(x: f32, reference: f32, split_zeros: bool) -> f32 {
    let z = x.max(reference);
    if z < f32::MIN_POSITIVE {
        return if split_zeros { 0.5 } else { 0.0 };
    }
    let mask = (x / z).powi(MASK_POWER);
    let ref_mask = (reference / z).powi(MASK_POWER);
    mask / (mask + ref_mask)
}

/// Sliding median with reflected edges (`d c b a | a b c d | d c b a`).
fn median_filter(values: &[f32], size: usize) -> Vec<f32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = (size / 2) as isize;
    let mut window = vec![0.0f32; size];

    (0..n as isize)
        .map(|i| {
            for (j, slot) in window.iter_mut().enumerate() {
                let idx = reflect(i + j as isize - half, n);
                *slot = values[idx];
            }
            let mid = size / 2;
            let (_, median, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            *median
        })
        .collect()
}

fn reflect(mut idx: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    idx = idx.rem_euclid(period);
    if idx >= len {
        idx = period - 1 - idx;
    }
    idx as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(signal: &[f32]) -> f32 {
        signal.iter().map(|s| s * s).sum()
    }

    #[test]
    fn decomposition_matches_source_length() {
        assert!(decompose(&[]).is_none());

        let signal: Vec<f32> = (0..5000).map(|i| (i as f32 * 0.02).sin()).collect();
        let triple = decompose(&signal).unwrap();
        assert_eq!(triple.harmonic.len(), signal.len());
        assert_eq!(triple.percussive.len(), signal.len());
        assert_eq!(triple.bass.len(), signal.len());
    }

    #[test]
    fn median_filter_removes_spike() {
        let mut row = vec![1.0f32; 50];
        row[25] = 100.0;
        let filtered = median_filter(&row, 5);
        assert!(filtered.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn reflect_mirrors_edges() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(2, 4), 2);
    }

    #[test]
    fn softmask_splits_silence_only_for_unit_margin() {
        assert_eq!(softmask(0.0, 0.0, true), 0.5);
        assert_eq!(softmask(0.0, 0.0, false), 0.0);
        assert!((softmask(1.0, 1.0, false) - 0.5).abs() < 1e-6);
        assert!(softmask(3.0, 1.0, true) > 0.8);
    }

    #[test]
    fn silence_separates_to_silence() {
        let out = separate(&vec![0.0; 4096], Margin::UNIT);
        assert_eq!(out.harmonic.len(), 4096);
        assert_eq!(out.percussive.len(), 4096);
        assert!(out.harmonic.iter().all(|&s| s == 0.0));
        assert!(out.percussive.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn steady_tone_lands_in_harmonic_stream() {
        let sr = 22050.0;
        let tone: Vec<f32> = (0..22050)
            .map(|i| (2.0 * std::f32::consts::PI * 330.0 * i as f32 / sr).sin() * 0.5)
            .collect();
        let out = separate(&tone, Margin::UNIT);
        assert!(energy(&out.harmonic) > 4.0 * energy(&out.percussive));
    }

    #[test]
    fn clicks_land_in_percussive_stream() {
        let mut clicks = vec![0.0f32; 44100];
        for i in (0..44100).step_by(11025) {
            clicks[i] = 1.0;
        }
        let out = separate(&clicks, Margin::UNIT);
        assert!(energy(&out.percussive) > energy(&out.harmonic));
    }

    #[test]
    fn wide_margin_never_adds_harmonic_energy() {
        let mut signal: Vec<f32> = (0..22050)
            .map(|i| (2.0 * std::f32::consts::PI * 80.0 * i as f32 / 22050.0).sin() * 0.3)
            .collect();
        for i in (0..22050).step_by(4410) {
            signal[i] += 1.0;
        }
        let unit = separate(&signal, Margin::UNIT);
        let bass = separate(&signal, Margin::BASS);
        assert!(energy(&bass.harmonic) <= energy(&unit.harmonic) * 1.01);
    }
}
