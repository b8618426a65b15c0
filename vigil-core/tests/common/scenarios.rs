//! Pre-built line scenarios
//!
//! Each scenario is the raw text a transport would deliver, header and
//! noise included.

use super::generators::LineGenerator;

/// Column header the device prints after a reboot
pub const HEADER: &str = "Humedad,Vibracion,Infrarrojo,Pot1,Pot2,Pot3";

/// Lines that must never reach the pipeline
pub const GARBAGE: &[&str] = &[
    "",
    "   ",
    "Humedad,Vibracion,Infrarrojo,Pot1,Pot2,Pot3",
    "humidity,vibration,ir,p1,p2,p3",
    "48,2,1,512,300",
    "48,2,1,512,300,1020,7",
    "48,x,1,512,300,1020",
    "48.5,2,1,512,300,1020",
    ",,,,,",
];

/// Header, a full calibration batch, then `tail` violent lines
pub fn calibration_then_burst(calibration: usize, tail: usize, seed: u32) -> Vec<String> {
    let mut generator = LineGenerator::new(seed);
    let mut lines = vec![HEADER.to_string()];
    lines.extend((0..calibration).map(|_| generator.calm_line()));
    lines.extend((0..tail).map(|_| generator.violent_line()));
    lines
}

/// Calm lines with garbage interleaved every few lines
pub fn noisy_calm(count: usize, seed: u32) -> Vec<String> {
    let mut generator = LineGenerator::new(seed);
    let mut lines = Vec::new();
    for i in 0..count {
        if i % 3 == 0 {
            lines.push(GARBAGE[i % GARBAGE.len()].to_string());
        }
        lines.push(generator.calm_line());
    }
    lines
}
