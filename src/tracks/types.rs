use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hosts send boat ids as numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoatId {
    Number(i64),
    Text(String),
}

impl fmt::Display for BoatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoatId::Number(n) => write!(f, "{n}"),
            BoatId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for BoatId {
    fn from(id: i64) -> Self {
        BoatId::Number(id)
    }
}

impl From<&str> for BoatId {
    fn from(id: &str) -> Self {
        BoatId::Text(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "heading_rad", default)]
    pub heading_radians: Option<f64>,
}

/// A boat and its recorded positions, ordered by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    pub id: BoatId,
    pub display_color: String,
    points: Vec<TrackPoint>,
}

impl TrackedObject {
    /// Points are sorted (stably) if they did not arrive in time order.
    pub fn new(id: BoatId, mut points: Vec<TrackPoint>, display_color: String) -> Self {
        if !points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
            debug!("track {} arrived out of order, sorting {} points", id, points.len());
            points.sort_by_key(|p| p.timestamp);
        }
        Self {
            id,
            display_color,
            points,
        }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }
}
