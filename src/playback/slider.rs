use serde::Serialize;
use std::sync::{Arc, Mutex};

/// The time-position control the playback cursor moves along.
///
/// `max` is `None` while no control is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PositionSlider {
    pub position: u64,
    pub max: Option<u64>,
}

pub type SharedSlider = Arc<Mutex<PositionSlider>>;

impl PositionSlider {
    pub fn new(max: u64) -> Self {
        Self {
            position: 0,
            max: Some(max),
        }
    }

    fn clamp(&self, position: u64) -> u64 {
        self.max.map_or(position, |max| position.min(max))
    }

    pub fn set_position(&mut self, position: u64) -> u64 {
        self.position = self.clamp(position);
        self.position
    }

    /// Advance by `steps`, stopping at `max`.
    pub fn step_up(&mut self, steps: u64) -> u64 {
        self.set_position(self.position.saturating_add(steps))
    }

    pub fn set_max(&mut self, max: Option<u64>) {
        self.max = max;
        self.position = self.clamp(self.position);
    }
}

/// Two-handle selection over a configurable range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeSelection {
    pub min: f64,
    pub max: f64,
    pub selected: (f64, f64),
    pub enabled: bool,
}

impl Default for RangeSelection {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl RangeSelection {
    pub fn new(min: f64, max: f64) -> Self {
        let (min, max) = ordered(min, max);
        Self {
            min,
            max,
            selected: (min, max),
            enabled: true,
        }
    }

    /// New bounds; the selection resets to cover all of them.
    pub fn configure(&mut self, min: f64, max: f64) -> (f64, f64) {
        let enabled = self.enabled;
        *self = Self::new(min, max);
        self.enabled = enabled;
        self.selected
    }

    /// Returns the clamped selection, or `None` while disabled.
    pub fn select(&mut self, from: f64, to: f64) -> Option<(f64, f64)> {
        if !self.enabled {
            return None;
        }
        let (from, to) = ordered(from, to);
        self.selected = (from.clamp(self.min, self.max), to.clamp(self.min, self.max));
        Some(self.selected)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
