//! Feature records: one parsed multi-sensor reading
//!
//! A record carries the six sensor fields of one transport line. Presence is
//! kept as a categorical [`Presence`] until the record is turned into a
//! numeric [`FeatureVector`], at which point it becomes `1.0` or `0.0`.

use serde::{Deserialize, Serialize};

use crate::constants::SENSOR_FIELDS;

/// Numeric form of a record, in transport field order
pub type FeatureVector = [f64; SENSOR_FIELDS];

/// Infrared presence sensor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Something is in front of the sensor
    Detected,
    /// Nothing detected
    Clear,
}

impl Presence {
    /// Decode the firmware's flag convention: `"1"` is detected, anything
    /// else is clear.
    pub fn from_token(token: &str) -> Self {
        if token == "1" {
            Self::Detected
        } else {
            Self::Clear
        }
    }

    /// Normalised 0/1 value used as a model feature
    pub fn as_flag(self) -> i32 {
        match self {
            Self::Detected => 1,
            Self::Clear => 0,
        }
    }

    /// Human-readable label for display
    pub fn label(self) -> &'static str {
        match self {
            Self::Detected => "Detected",
            Self::Clear => "Clear",
        }
    }
}

/// One validated sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Relative humidity (%)
    pub humidity: i32,
    /// Vibration sensor level
    pub vibration: i32,
    /// Infrared presence
    pub presence: Presence,
    /// Auxiliary potentiometer readings
    pub pots: [i32; 3],
}

impl FeatureRecord {
    /// Create a record from its fields
    pub fn new(humidity: i32, vibration: i32, presence: Presence, pots: [i32; 3]) -> Self {
        Self {
            humidity,
            vibration,
            presence,
            pots,
        }
    }

    /// Numeric feature vector with presence normalised to 0/1
    pub fn features(&self) -> FeatureVector {
        [
            self.humidity as f64,
            self.vibration as f64,
            self.presence.as_flag() as f64,
            self.pots[0] as f64,
            self.pots[1] as f64,
            self.pots[2] as f64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_token_convention() {
        assert_eq!(Presence::from_token("1"), Presence::Detected);
        assert_eq!(Presence::from_token("0"), Presence::Clear);
        assert_eq!(Presence::from_token("yes"), Presence::Clear);
    }

    #[test]
    fn features_normalise_presence() {
        let record = FeatureRecord::new(45, 3, Presence::Detected, [512, 100, 1023]);
        assert_eq!(record.features(), [45.0, 3.0, 1.0, 512.0, 100.0, 1023.0]);

        let record = FeatureRecord::new(45, 3, Presence::Clear, [512, 100, 1023]);
        assert_eq!(record.features()[2], 0.0);
    }
}
