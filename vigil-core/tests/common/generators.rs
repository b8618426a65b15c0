//! Sensor line generators
//!
//! Lines follow the device format: humidity, vibration, presence flag and
//! three potentiometer readings, comma separated. Generation is seeded so
//! every run produces the same sequence.

use vigil_core::{FeatureRecord, Presence};

use super::VIBRATION_LIMIT;

/// Deterministic generator of sensor lines
pub struct LineGenerator {
    state: u32,
}

impl LineGenerator {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    fn next(&mut self) -> u32 {
        // xorshift32
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn range(&mut self, low: i32, high: i32) -> i32 {
        low + (self.next() % (high - low) as u32) as i32
    }

    /// Record well inside the calm operating envelope
    pub fn calm_record(&mut self) -> FeatureRecord {
        let presence = if self.next() % 4 == 0 {
            Presence::Detected
        } else {
            Presence::Clear
        };
        FeatureRecord::new(
            self.range(40, 60),
            self.range(0, 10),
            presence,
            [self.range(400, 600), self.range(200, 400), self.range(900, 1023)],
        )
    }

    /// Record with vibration far beyond the calm envelope
    pub fn violent_record(&mut self) -> FeatureRecord {
        let mut record = self.calm_record();
        record.vibration = self.range(VIBRATION_LIMIT as i32 + 20, 1000);
        record
    }

    /// Calm record rendered as a device line
    pub fn calm_line(&mut self) -> String {
        to_line(&self.calm_record())
    }

    /// Violent record rendered as a device line
    pub fn violent_line(&mut self) -> String {
        to_line(&self.violent_record())
    }
}

/// Render a record the way the device prints it
pub fn to_line(record: &FeatureRecord) -> String {
    format!(
        "{},{},{},{},{},{}",
        record.humidity,
        record.vibration,
        record.presence.as_flag(),
        record.pots[0],
        record.pots[1],
        record.pots[2],
    )
}
