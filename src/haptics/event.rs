/// Fixed length of continuous events emitted from onsets.
pub const ONSET_CONTINUOUS_DURATION: f64 = 0.1;

/// Pattern format version written to every document.
pub const PATTERN_VERSION: f64 = 1.0;

/// Actuator intensity and sharpness, both clamped to [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HapticParams {
    pub intensity: f32,
    pub sharpness: f32,
}

impl HapticParams {
    pub const ZERO: HapticParams = HapticParams { intensity: 0.0, sharpness: 0.0 };

    pub fn new(intensity: f32, sharpness: f32) -> Self {
        Self {
            intensity: unit_clamp(intensity),
            sharpness: unit_clamp(sharpness),
        }
    }
}

/// Clamp into [0, 1], mapping NaN to 0.
pub fn unit_clamp(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[derive(Clone, Debug, PartialEq)]
pub enum HapticEvent {
    Transient {
        time: f64,
        params: HapticParams,
    },
    Continuous {
        time: f64,
        params: HapticParams,
        duration: f64,
    },
}

impl HapticEvent {
    pub fn transient(time: f64, params: HapticParams) -> Self {
        HapticEvent::Transient {
            time,
            params: HapticParams::new(params.intensity, params.sharpness),
        }
    }

    pub fn continuous(time: f64, params: HapticParams, duration: f64) -> Self {
        HapticEvent::Continuous {
            time,
            params: HapticParams::new(params.intensity, params.sharpness),
            duration,
        }
    }

    pub fn time(&self) -> f64 {
        match self {
            HapticEvent::Transient { time, .. } | HapticEvent::Continuous { time, .. } => *time,
        }
    }

    pub fn params(&self) -> HapticParams {
        match self {
            HapticEvent::Transient { params, .. } | HapticEvent::Continuous { params, .. } => *params,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        match self {
            HapticEvent::Transient { .. } => None,
            HapticEvent::Continuous { duration, .. } => Some(*duration),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, HapticEvent::Transient { .. })
    }
}

/// Ordered event list. Events stay in insertion order: onset-derived
/// events first, then the continuous grid.
#[derive(Clone, Debug, PartialEq)]
pub struct HapticPattern {
    pub version: f64,
    pub events: Vec<HapticEvent>,
}

impl HapticPattern {
    pub fn new(events: Vec<HapticEvent>) -> Self {
        Self {
            version: PATTERN_VERSION,
            events,
        }
    }

    pub fn transient_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_transient()).count()
    }

    pub fn continuous_count(&self) -> usize {
        self.events.len() - self.transient_count()
    }
}
