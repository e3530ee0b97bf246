use serde::Serialize;

/// One sampled current measurement.
///
/// Values are carried exactly as decoded. Negative magnitudes or directions
/// outside 0..360 are not rejected; they render as whatever they map to.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VectorReading {
    pub latitude: f32,
    pub longitude: f32,
    pub magnitude: f32,
    pub direction_deg: f32,
}

/// Readings in wire order. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VectorDataset {
    readings: Vec<VectorReading>,
}

impl VectorDataset {
    pub fn new(readings: Vec<VectorReading>) -> Self {
        Self { readings }
    }

    pub fn readings(&self) -> &[VectorReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Smallest and largest magnitude, ignoring NaN.
    pub fn magnitude_range(&self) -> Option<(f32, f32)> {
        self.readings
            .iter()
            .map(|r| r.magnitude)
            .filter(|m| !m.is_nan())
            .fold(None, |acc, m| match acc {
                None => Some((m, m)),
                Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
            })
    }
}

impl From<Vec<VectorReading>> for VectorDataset {
    fn from(readings: Vec<VectorReading>) -> Self {
        Self::new(readings)
    }
}
