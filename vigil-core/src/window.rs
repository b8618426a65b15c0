//! Sliding Window of Anomaly Decisions
//!
//! ## Overview
//!
//! Individual model decisions are noisy: one odd vibration spike flips a
//! single reading to anomalous. The window smooths them into a trend signal
//! by remembering the last `C` decisions and reporting the fraction that were
//! anomalous.
//!
//! ## Ring Layout
//!
//! Flags live in a ring that overwrites the oldest slot once full:
//!
//! ```text
//! AnomalyWindow capacity 5, after 7 pushes:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  F6 │  F7 │  F3 │  F4 │  F5 │   ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!              ↑
//!              └── write_pos = 2 (oldest flag, next to be overwritten)
//! ```
//!
//! The number of `true` flags is maintained on every push, so reading the
//! failure probability is O(1).
//!
//! ## Ramp-up
//!
//! The probability is always divided by the full capacity, also while the
//! window is still filling. Three anomalies in the first three detections of
//! a 50-slot window report `0.06`, not `1.0`.
//!
//! ```rust
//! use core::num::NonZeroUsize;
//! use vigil_core::AnomalyWindow;
//!
//! let mut window = AnomalyWindow::new(NonZeroUsize::new(4).unwrap());
//! window.push(true);
//! window.push(false);
//! assert_eq!(window.failure_probability(), 0.25);
//! ```

use core::num::NonZeroUsize;

/// Fixed-capacity FIFO of boolean anomaly flags
///
/// ## Internal Invariants
///
/// - `write_pos < capacity`
/// - `len <= capacity`
/// - `anomalies` equals the number of `true` flags among the `len` live slots
#[derive(Debug, Clone)]
pub struct AnomalyWindow {
    flags: Vec<bool>,
    write_pos: usize,
    len: usize,
    anomalies: usize,
}

impl AnomalyWindow {
    /// Create an empty window holding at most `capacity` flags
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            flags: vec![false; capacity.get()],
            write_pos: 0,
            len: 0,
            anomalies: 0,
        }
    }

    /// Record one decision, evicting the oldest when full
    pub fn push(&mut self, anomalous: bool) {
        if self.is_full() && self.flags[self.write_pos] {
            self.anomalies -= 1;
        }
        if anomalous {
            self.anomalies += 1;
        }

        self.flags[self.write_pos] = anomalous;
        self.write_pos = (self.write_pos + 1) % self.capacity();

        if self.len < self.capacity() {
            self.len += 1;
        }
    }

    /// Anomalous decisions in the window divided by the capacity
    pub fn failure_probability(&self) -> f64 {
        self.anomalies as f64 / self.capacity() as f64
    }

    /// Anomalous decisions currently in the window
    pub fn anomaly_count(&self) -> usize {
        self.anomalies
    }

    /// Decisions currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no decision has been recorded
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the next push evicts a decision
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Maximum number of decisions held
    pub fn capacity(&self) -> usize {
        self.flags.len()
    }

    /// Iterate over decisions from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        let start = if self.is_full() { self.write_pos } else { 0 };
        (0..self.len).map(move |i| self.flags[(start + i) % self.capacity()])
    }

    /// Forget every decision
    pub fn clear(&mut self) {
        self.flags.fill(false);
        self.write_pos = 0;
        self.len = 0;
        self.anomalies = 0;
    }
}
