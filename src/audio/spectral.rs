use super::stft::{bin_frequencies, stft};

/// Per-frame spectral centroid in Hz. Silent frames yield 0.
pub fn spectral_centroid(samples: &[f32], sample_rate: u32) -> Vec<f32> {
    let freqs = bin_frequencies(sample_rate);
    stft(samples)
        .frames
        .iter()
        .map(|frame| {
            let mut weighted = 0.0f32;
            let mut total = 0.0f32;
            for (bin, &freq) in frame.iter().zip(freqs.iter()) {
                let mag = bin.norm();
                weighted += freq * mag;
                total += mag;
            }
            if total > f32::MIN_POSITIVE {
                weighted / total
            } else {
                0.0
            }
        })
        .collect()
}

pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

pub fn rms(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|s| s * s).sum::<f32>() / values.len() as f32).sqrt()
}

pub fn peak_abs(values: &[f32]) -> f32 {
    values.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// `q`-th percentile (0-100) with linear interpolation between closest ranks.
pub fn percentile(values: &[f32], q: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sr: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sr as f32).sin())
            .collect()
    }

    #[test]
    fn centroid_tracks_tone_frequency() {
        let centroid = spectral_centroid(&tone(1000.0, 44100, 8192), 44100);
        let middle = centroid[centroid.len() / 2];
        assert!((middle - 1000.0).abs() < 100.0, "centroid {}", middle);
    }

    #[test]
    fn brighter_tone_has_higher_centroid() {
        let low = mean(&spectral_centroid(&tone(300.0, 44100, 4096), 44100));
        let high = mean(&spectral_centroid(&tone(5000.0, 44100, 4096), 44100));
        assert!(high > low);
    }

    #[test]
    fn silence_has_zero_centroid() {
        let centroid = spectral_centroid(&vec![0.0; 2205], 44100);
        assert_eq!(centroid.len(), 5);
        assert!(centroid.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        assert!((percentile(&values, 90.0) - 4.6).abs() < 1e-6);
        assert!((percentile(&[10.0, 0.0], 70.0) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn rms_of_constant_signal() {
        assert!((rms(&[0.5; 100]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(peak_abs(&[0.1, -0.7, 0.3]), 0.7);
    }
}
