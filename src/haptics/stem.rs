use super::event::HapticParams;

/// Fan-out order for `--split all`.
pub const ALL_STEMS: [StemProfile; 4] = [
    StemProfile::Bass,
    StemProfile::Vocals,
    StemProfile::Drums,
    StemProfile::Other,
];

/// Per-stem calibration applied after base scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StemProfile {
    Vocals,
    Drums,
    Bass,
    Other,
    /// Full mix or an unrecognized stem name; leaves parameters unchanged.
    Identity,
}

impl StemProfile {
    pub fn for_name(name: &str) -> Self {
        match canonical_stem_name(name).as_str() {
            "vocals" => StemProfile::Vocals,
            "drums" => StemProfile::Drums,
            "bass" => StemProfile::Bass,
            "other" => StemProfile::Other,
            _ => StemProfile::Identity,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            StemProfile::Vocals => Some("vocals"),
            StemProfile::Drums => Some("drums"),
            StemProfile::Bass => Some("bass"),
            StemProfile::Other => Some("other"),
            StemProfile::Identity => None,
        }
    }

    /// `(energy, sharpness)` multipliers.
    pub fn multipliers(self) -> (f32, f32) {
        match self {
            StemProfile::Vocals => (1.2, 1.1),
            StemProfile::Drums => (1.5, 1.3),
            StemProfile::Bass => (1.4, 0.9),
            StemProfile::Other => (1.3, 1.2),
            StemProfile::Identity => (1.0, 1.0),
        }
    }

    pub fn calibrate(self, params: HapticParams) -> HapticParams {
        let (energy_mult, sharpness_mult) = self.multipliers();
        HapticParams::new(params.intensity * energy_mult, params.sharpness * sharpness_mult)
    }
}

/// Lowercase and trim; the singular `vocal` is folded into `vocals`.
pub fn canonical_stem_name(name: &str) -> String {
    let value = name.trim().to_lowercase();
    if value == "vocal" {
        return "vocals".to_string();
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocal_spellings_share_a_profile() {
        for name in ["Vocal", "VOCALS", "vocal", "vocals", " Vocals "] {
            assert_eq!(StemProfile::for_name(name), StemProfile::Vocals, "{}", name);
        }
    }

    #[test]
    fn unknown_names_fall_back_to_identity() {
        assert_eq!(StemProfile::for_name("none"), StemProfile::Identity);
        assert_eq!(StemProfile::for_name("guitar"), StemProfile::Identity);
        assert_eq!(StemProfile::Identity.multipliers(), (1.0, 1.0));
        let params = HapticParams::new(0.3, 0.6);
        assert_eq!(StemProfile::Identity.calibrate(params), params);
    }

    #[test]
    fn calibration_reclamps() {
        let out = StemProfile::Drums.calibrate(HapticParams::new(0.9, 0.5));
        assert_eq!(out.intensity, 1.0);
        assert!((out.sharpness - 0.65).abs() < 1e-6);

        let out = StemProfile::Bass.calibrate(HapticParams::new(0.5, 1.0));
        assert!((out.intensity - 0.7).abs() < 1e-6);
        assert!((out.sharpness - 0.9).abs() < 1e-6);
    }

    #[test]
    fn fan_out_order_is_fixed() {
        let names: Vec<_> = ALL_STEMS.iter().filter_map(|s| s.name()).collect();
        assert_eq!(names, vec!["bass", "vocals", "drums", "other"]);
    }
}
