use super::mel::{MelFilterbank, NUM_MELS};
use super::stft::{stft, FFT_SIZE, HOP_SIZE};

/// Power floor before the dB conversion.
const AMIN: f32 = 1e-10;
/// Dynamic range kept below the loudest band.
const TOP_DB: f32 = 80.0;
/// Minimum rise above the local average for a peak to count.
const DELTA: f32 = 0.07;

/// Onset times in seconds, non-decreasing. Silence yields no onsets.
pub fn detect_onsets(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    if samples.is_empty() || sample_rate == 0 {
        return Vec::new();
    }

    let envelope = onset_strength(samples, sample_rate);
    let frames_per_sec = sample_rate as f32 / HOP_SIZE as f32;
    let to_frames = |secs: f32| (secs * frames_per_sec).floor() as usize;

    let picker = PeakPicker {
        pre_max: to_frames(0.03),
        post_max: 1,
        pre_avg: to_frames(0.10),
        post_avg: to_frames(0.10) + 1,
        wait: to_frames(0.03),
        delta: DELTA,
    };

    picker
        .pick(&envelope)
        .into_iter()
        .map(|frame| frame as f64 * HOP_SIZE as f64 / sample_rate as f64)
        .collect()
}

/// Half-wave rectified spectral flux over a log-power mel spectrogram,
/// normalized to [0, 1] and aligned so entry `t` peaks at the frame whose
/// center sits on the onset.
fn onset_strength(samples: &[f32], sample_rate: u32) -> Vec<f32> {
    let spec = stft(samples);
    let bank = MelFilterbank::new(sample_rate, NUM_MELS);
    let mut log_power: Vec<Vec<f32>> = spec
        .frames
        .iter()
        .map(|frame| {
            let power: Vec<f32> = frame.iter().map(|c| c.norm_sqr()).collect();
            bank.apply(&power)
                .into_iter()
                .map(|p| 10.0 * p.max(AMIN).log10())
                .collect()
        })
        .collect();

    let loudest = log_power
        .iter()
        .flat_map(|frame| frame.iter().copied())
        .fold(f32::NEG_INFINITY, f32::max);
    let floor = loudest - TOP_DB;
    for frame in &mut log_power {
        for value in frame.iter_mut() {
            *value = value.max(floor);
        }
    }

    // A centered frame hears an onset FFT_SIZE / 2 samples early, so the
    // flux moves FFT_SIZE / (2 * HOP_SIZE) frames right on top of the
    // one-frame lag.
    let shift = 1 + FFT_SIZE / (2 * HOP_SIZE);
    let num_frames = spec.num_frames();
    let mut envelope = vec![0.0f32; num_frames];
    for t in 1..num_frames {
        let Some(slot) = envelope.get_mut(t - 1 + shift) else {
            break;
        };
        let rise: f32 = log_power[t]
            .iter()
            .zip(log_power[t - 1].iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
        *slot = rise / log_power[t].len() as f32;
    }

    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if range > f32::MIN_POSITIVE {
        for value in &mut envelope {
            *value = (*value - min) / range;
        }
    } else {
        envelope.iter_mut().for_each(|v| *v = 0.0);
    }
    envelope
}

/// Local-maximum peak picking against a moving average threshold.
struct PeakPicker {
    pre_max: usize,
    post_max: usize,
    pre_avg: usize,
    post_avg: usize,
    wait: usize,
    delta: f32,
}

impl PeakPicker {
    fn pick(&self, x: &[f32]) -> Vec<usize> {
        let n = x.len();
        let mut peaks = Vec::new();
        let mut last: Option<usize> = None;

        for i in 0..n {
            if x[i] <= 0.0 {
                continue;
            }

            let max_lo = i.saturating_sub(self.pre_max);
            let max_hi = (i + self.post_max).min(n);
            let local_max = x[max_lo..max_hi].iter().copied().fold(f32::NEG_INFINITY, f32::max);
            if x[i] < local_max {
                continue;
            }

            let avg_lo = i.saturating_sub(self.pre_avg);
            let avg_hi = (i + self.post_avg).min(n);
            let window = &x[avg_lo..avg_hi];
            let local_avg = window.iter().sum::<f32>() / window.len() as f32;
            if x[i] < local_avg + self.delta {
                continue;
            }

            if last.map_or(true, |prev| i > prev + self.wait) {
                peaks.push(i);
                last = Some(i);
            }
        }

        peaks
    }
}
