use rustfft::{num_complex::Complex, FftPlanner};

pub const FFT_SIZE: usize = 2048;
pub const HOP_SIZE: usize = 512;

/// Number of non-negative frequency bins for `FFT_SIZE`.
pub const NUM_BINS: usize = FFT_SIZE / 2 + 1;

/// Complex spectrogram stored frame-major: `frames[t][k]`.
#[derive(Clone, Debug)]
pub struct Spectrogram {
    pub frames: Vec<Vec<Complex<f32>>>,
}

impl Spectrogram {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn magnitudes(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }
}

/// Centered STFT: the signal is zero-padded by `FFT_SIZE / 2` on both
/// sides so frame `t` is centered on sample `t * HOP_SIZE`.
pub fn stft(samples: &[f32]) -> Spectrogram {
    let pad = FFT_SIZE / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let num_frames = 1 + (padded.len() - FFT_SIZE) / HOP_SIZE;
    let window = hann_window(FFT_SIZE);

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);

    let mut frames = Vec::with_capacity(num_frames);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); FFT_SIZE];
    for t in 0..num_frames {
        let start = t * HOP_SIZE;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(padded[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);
        frames.push(buffer[..NUM_BINS].to_vec());
    }

    Spectrogram { frames }
}

/// Inverse of [`stft`] by windowed overlap-add, trimmed to `length` samples.
pub fn istft(spec: &Spectrogram, length: usize) -> Vec<f32> {
    let pad = FFT_SIZE / 2;
    let n = spec.num_frames();
    if n == 0 {
        return vec![0.0; length];
    }

    let window = hann_window(FFT_SIZE);
    let total = FFT_SIZE + HOP_SIZE * (n - 1);
    let mut output = vec![0.0f32; total];
    let mut norm = vec![0.0f32; total];

    let mut planner = FftPlanner::<f32>::new();
    let ifft = planner.plan_fft_inverse(FFT_SIZE);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); FFT_SIZE];
    let scale = 1.0 / FFT_SIZE as f32;

    for (t, frame) in spec.frames.iter().enumerate() {
        // Rebuild the Hermitian-symmetric full spectrum.
        buffer[..NUM_BINS].copy_from_slice(frame);
        for k in NUM_BINS..FFT_SIZE {
            buffer[k] = frame[FFT_SIZE - k].conj();
        }
        ifft.process(&mut buffer);

        let start = t * HOP_SIZE;
        for i in 0..FFT_SIZE {
            output[start + i] += buffer[i].re * scale * window[i];
            norm[start + i] += window[i] * window[i];
        }
    }

    for (sample, w) in output.iter_mut().zip(norm.iter()) {
        if *w > f32::MIN_POSITIVE {
            *sample /= *w;
        }
    }

    let mut trimmed: Vec<f32> = output.into_iter().skip(pad).take(length).collect();
    trimmed.resize(length, 0.0);
    trimmed
}

/// Center frequency in Hz of every bin.
pub fn bin_frequencies(sample_rate: u32) -> Vec<f32> {
    (0..NUM_BINS)
        .map(|k| k as f32 * sample_rate as f32 / FFT_SIZE as f32)
        .collect()
}

/// Periodic Hann window.
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()))
        .collect()
}
