//! AHAP document shape: `{"Version": 1.0, "Pattern": [{"Event": {...}}]}`.

use serde::{Deserialize, Serialize};

#[cfg(test)]
use super::event::HapticParams;
use super::event::{HapticEvent, HapticPattern};

const TRANSIENT: &str = "HapticTransient";
const CONTINUOUS: &str = "HapticContinuous";
const INTENSITY: &str = "HapticIntensity";
const SHARPNESS: &str = "HapticSharpness";

#[derive(Debug, Serialize, Deserialize)]
pub struct AhapDocument {
    #[serde(rename = "Version")]
    pub version: f64,
    #[serde(rename = "Pattern")]
    pub pattern: Vec<PatternEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PatternEntry {
    #[serde(rename = "Event")]
    pub event: AhapEvent,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AhapEvent {
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "EventDuration", default, skip_serializing_if = "Option::is_none")]
    pub event_duration: Option<f64>,
    #[serde(rename = "EventParameters")]
    pub event_parameters: Vec<EventParameter>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventParameter {
    #[serde(rename = "ParameterID")]
    pub parameter_id: String,
    #[serde(rename = "ParameterValue")]
    pub parameter_value: f32,
}

impl From<&HapticEvent> for AhapEvent {
    fn from(event: &HapticEvent) -> Self {
        let params = event.params();
        AhapEvent {
            time: event.time(),
            event_type: if event.is_transient() { TRANSIENT } else { CONTINUOUS }.to_string(),
            event_duration: event.duration(),
            event_parameters: vec![
                EventParameter {
                    parameter_id: INTENSITY.to_string(),
                    parameter_value: params.intensity,
                },
                EventParameter {
                    parameter_id: SHARPNESS.to_string(),
                    parameter_value: params.sharpness,
                },
            ],
        }
    }
}

impl From<&HapticPattern> for AhapDocument {
    fn from(pattern: &HapticPattern) -> Self {
        AhapDocument {
            version: pattern.version,
            pattern: pattern
                .events
                .iter()
                .map(|event| PatternEntry { event: event.into() })
                .collect(),
        }
    }
}

#[cfg(test)]
impl AhapDocument {
    /// Parse back into typed events. Unknown event types and parameters
    /// are skipped.
    pub fn to_pattern(&self) -> HapticPattern {
        let events = self
            .pattern
            .iter()
            .filter_map(|entry| {
                let e = &entry.event;
                let mut params = HapticParams::ZERO;
                for p in &e.event_parameters {
                    match p.parameter_id.as_str() {
                        INTENSITY => params.intensity = p.parameter_value,
                        SHARPNESS => params.sharpness = p.parameter_value,
                        _ => {}
                    }
                }
                match e.event_type.as_str() {
                    TRANSIENT => Some(HapticEvent::transient(e.time, params)),
                    CONTINUOUS => Some(HapticEvent::continuous(
                        e.time,
                        params,
                        e.event_duration.unwrap_or_default(),
                    )),
                    other => {
                        log::warn!("Skipping unknown AHAP event type '{}'", other);
                        None
                    }
                }
            })
            .collect();

        HapticPattern {
            version: self.version,
            events,
        }
    }
}

pub fn to_json(pattern: &HapticPattern) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&AhapDocument::from(pattern))
}
