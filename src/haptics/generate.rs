use crate::audio::hpss::Decomposition;
use crate::audio::spectral::rms;

use super::classify::{classify, Mode};
use super::event::{HapticEvent, HapticParams, HapticPattern, ONSET_CONTINUOUS_DURATION};
use super::features::{normalize, safe_peak, FeatureExtractor, ScaleFactors};
use super::stem::StemProfile;

/// Everything one pattern generation needs besides the buffers.
#[derive(Clone, Copy, Debug)]
pub struct PatternSettings {
    pub mode: Mode,
    pub stem: StemProfile,
    pub factors: ScaleFactors,
    pub time_step: f64,
}

/// Onset pass: classify every onset and emit a transient, a continuous
/// event, or both at the onset time.
pub fn onset_events(
    extractor: &FeatureExtractor,
    onsets: &[f64],
    mode: Mode,
    decomposition: Option<&Decomposition>,
    stem: StemProfile,
    factors: ScaleFactors,
) -> Vec<HapticEvent> {
    let mut events = Vec::with_capacity(onsets.len());

    for &time in onsets {
        let class = classify(extractor, time, mode, decomposition);

        if class.emits_transient() {
            let params = extractor.parameters(time, stem, factors);
            events.push(HapticEvent::transient(time, params));
        }
        if class.emits_continuous() {
            let params = extractor.parameters(time, stem, factors);
            events.push(HapticEvent::continuous(time, params, ONSET_CONTINUOUS_DURATION));
        }
    }

    events
}

/// Grid pass: one continuous event per `time_step` from 0 up to `duration`.
/// Intensity follows the bass stream and sharpness the harmonic stream,
/// each normalized against its own peak. Windows that clip to nothing are
/// skipped.
pub fn grid_events(
    decomposition: Option<&Decomposition>,
    sample_rate: u32,
    duration: f64,
    time_step: f64,
    factors: ScaleFactors,
) -> Vec<HapticEvent> {
    let Some(decomposition) = decomposition else {
        return Vec::new();
    };
    if duration <= 0.0 || time_step <= 0.0 {
        return Vec::new();
    }

    let bass = &decomposition.bass;
    let harmonic = &decomposition.harmonic;
    let bass_peak = safe_peak(bass);
    let harmonic_peak = safe_peak(harmonic);
    let sr = sample_rate as f64;

    let steps = (duration / time_step).ceil() as usize;
    let mut events = Vec::new();

    for i in 0..steps {
        let t = i as f64 * time_step;
        let start = (t * sr) as usize;
        let end = ((t + time_step) * sr) as usize;

        let bass_window = clip(bass, start, end);
        let harmonic_window = clip(harmonic, start, end);
        if bass_window.is_empty() || harmonic_window.is_empty() {
            continue;
        }

        let params = HapticParams::new(
            normalize(rms(bass_window), bass_peak, factors.intensity),
            normalize(rms(harmonic_window), harmonic_peak, factors.sharpness),
        );
        events.push(HapticEvent::continuous(t, params, time_step));
    }

    events
}

fn clip(samples: &[f32], start: usize, end: usize) -> &[f32] {
    let end = end.min(samples.len());
    let start = start.min(end);
    &samples[start..end]
}

/// Onset events in onset order followed by grid events in grid order.
pub fn generate_pattern(
    samples: &[f32],
    sample_rate: u32,
    onsets: &[f64],
    decomposition: Option<&Decomposition>,
    settings: &PatternSettings,
) -> HapticPattern {
    let extractor = FeatureExtractor::new(samples, sample_rate);
    let duration = if sample_rate > 0 {
        samples.len() as f64 / sample_rate as f64
    } else {
        0.0
    };

    let mut events = onset_events(
        &extractor,
        onsets,
        settings.mode,
        decomposition,
        settings.stem,
        settings.factors,
    );
    let onset_count = events.len();

    events.extend(grid_events(
        decomposition,
        sample_rate,
        duration,
        settings.time_step,
        settings.factors,
    ));

    log::debug!(
        "{:?}: {} onset events, {} grid events",
        settings.stem,
        onset_count,
        events.len() - onset_count
    );

    HapticPattern::new(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    fn tone(freq: f32, amplitude: f32, secs: f64) -> Vec<f32> {
        (0..(secs * SR as f64) as usize)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SR as f32).sin() * amplitude)
            .collect()
    }

    fn silent_triple(len: usize) -> Decomposition {
        Decomposition {
            harmonic: vec![0.0; len],
            percussive: vec![0.0; len],
            bass: vec![0.0; len],
        }
    }

    fn settings(mode: Mode) -> PatternSettings {
        PatternSettings {
            mode,
            stem: StemProfile::Identity,
            factors: ScaleFactors::default(),
            time_step: 0.1,
        }
    }

    #[test]
    fn grid_stops_before_duration() {
        let triple = silent_triple(SR as usize);
        let events = grid_events(Some(&triple), SR, 1.0, 0.1, ScaleFactors::default());
        assert_eq!(events.len(), 10);
        assert_eq!(events[0].time(), 0.0);
        assert!((events[9].time() - 0.9).abs() < 1e-9);
        assert!(events.iter().all(|e| e.time() < 1.0));
        assert!(events.iter().all(|e| e.duration() == Some(0.1)));
    }

    #[test]
    fn silent_grid_is_all_zero() {
        let triple = silent_triple(3 * SR as usize);
        let events = grid_events(Some(&triple), SR, 3.0, 0.1, ScaleFactors::default());
        assert_eq!(events.len(), 30);
        for event in &events {
            assert_eq!(event.params(), HapticParams::ZERO);
            assert!(!event.is_transient());
        }
    }

    #[test]
    fn grid_skips_windows_past_the_buffer() {
        // Duration claims more than the streams hold.
        let triple = silent_triple(SR as usize / 2);
        let events = grid_events(Some(&triple), SR, 1.0, 0.1, ScaleFactors::default());
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn grid_follows_bass_and_harmonic_streams() {
        let len = SR as usize;
        let mut bass = vec![0.0f32; len];
        let harmonic = vec![0.5f32; len];
        for s in &mut bass[..len / 2] {
            *s = 0.8;
        }
        let triple = Decomposition {
            harmonic,
            percussive: vec![0.0; len],
            bass,
        };
        let factors = ScaleFactors {
            intensity: 1.0,
            sharpness: 0.5,
        };
        let events = grid_events(Some(&triple), SR, 1.0, 0.1, factors);

        assert!((events[0].params().intensity - 1.0).abs() < 1e-3);
        assert_eq!(events[9].params().intensity, 0.0);
        assert!(events.iter().all(|e| (e.params().sharpness - 0.5).abs() < 1e-6));
    }

    #[test]
    fn grid_uses_custom_time_step() {
        let triple = silent_triple(SR as usize);
        let events = grid_events(Some(&triple), SR, 1.0, 0.25, ScaleFactors::default());
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.duration() == Some(0.25)));
    }

    #[test]
    fn no_decomposition_means_no_grid() {
        assert!(grid_events(None, SR, 1.0, 0.1, ScaleFactors::default()).is_empty());
    }

    #[test]
    fn both_classification_emits_two_events_at_onset() {
        let samples = tone(440.0, 0.4, 1.0);
        let triple = silent_triple(samples.len());
        let extractor = FeatureExtractor::new(&samples, SR);

        let events = onset_events(
            &extractor,
            &[0.5],
            Mode::Sfx,
            Some(&triple),
            StemProfile::Identity,
            ScaleFactors::default(),
        );

        assert_eq!(events.len(), 2);
        assert!(events[0].is_transient());
        assert!(!events[1].is_transient());
        assert_eq!(events[0].time(), 0.5);
        assert_eq!(events[1].time(), 0.5);
        assert_eq!(events[1].duration(), Some(ONSET_CONTINUOUS_DURATION));
        assert_eq!(events[0].params(), events[1].params());
    }

    #[test]
    fn pattern_keeps_onset_events_before_grid() {
        let samples = tone(440.0, 0.4, 1.0);
        let triple = silent_triple(samples.len());
        let pattern = generate_pattern(&samples, SR, &[0.3, 0.6], Some(&triple), &settings(Mode::Sfx));

        assert_eq!(pattern.version, 1.0);
        assert_eq!(pattern.events.len(), 4 + 10);
        assert_eq!(pattern.events[0].time(), 0.3);
        assert_eq!(pattern.events[2].time(), 0.6);
        assert_eq!(pattern.events[4].time(), 0.0);
    }

    #[test]
    fn all_parameters_stay_in_unit_range() {
        let mut samples = tone(220.0, 0.9, 1.0);
        for i in (0..samples.len()).step_by(5000) {
            samples[i] = 1.0;
        }
        let triple = Decomposition {
            harmonic: samples.clone(),
            percussive: samples.iter().map(|s| s * 0.5).collect(),
            bass: samples.iter().map(|s| -s * 3.0).collect(),
        };
        let onsets: Vec<f64> = (0..20).map(|i| i as f64 * 0.05).collect();

        for mode in [Mode::Sfx, Mode::Music] {
            for stem in [StemProfile::Drums, StemProfile::Vocals, StemProfile::Identity] {
                let settings = PatternSettings {
                    mode,
                    stem,
                    factors: ScaleFactors {
                        intensity: 10.0,
                        sharpness: 10.0,
                    },
                    time_step: 0.05,
                };
                let pattern = generate_pattern(&samples, SR, &onsets, Some(&triple), &settings);
                for event in &pattern.events {
                    let p = event.params();
                    assert!((0.0..=1.0).contains(&p.intensity));
                    assert!((0.0..=1.0).contains(&p.sharpness));
                }
            }
        }
    }
}
