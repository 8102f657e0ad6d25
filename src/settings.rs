//! Engine configuration, loadable from JSON.

use serde::{Deserialize, Serialize};

/// Tunable parameters shared by the particle-driven animators.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Jitter range added to the acceleration each frame.
    pub shake: u16,
    /// Divisor applied to a velocity component on contact (>= 1).
    pub loss: f32,
    /// Bounce off boundaries and obstacles instead of stopping dead.
    pub bounce: bool,
    /// Brightness ceiling for randomly generated colours.
    pub max_brightness: u8,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            shake: 0,
            loss: 2.0,
            bounce: true,
            max_brightness: 255,
        }
    }
}

impl EngineSettings {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let settings = EngineSettings {
            shake: 120,
            loss: 1.5,
            bounce: false,
            max_brightness: 128,
        };
        let parsed = EngineSettings::from_json(&settings.to_json()).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed = EngineSettings::from_json(r#"{"shake": 40}"#).unwrap();
        assert_eq!(parsed.shake, 40);
        assert_eq!(parsed.loss, 2.0);
        assert!(parsed.bounce);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(EngineSettings::from_json("{shake:").is_err());
    }
}
