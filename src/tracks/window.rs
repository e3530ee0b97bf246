use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::TrackPoint;
use crate::geo::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentPosition {
    pub position: LatLng,
    pub heading_radians: Option<f64>,
}

/// The part of a track between a range start and the inspect time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrackWindow {
    pub visible_path: Vec<LatLng>,
    /// Latest point at or before the inspect time; `None` means the object is
    /// not active yet and should not be drawn.
    pub current: Option<CurrentPosition>,
}

impl TrackWindow {
    pub fn is_empty(&self) -> bool {
        self.visible_path.is_empty()
    }
}

/// Points with `start <= timestamp <= inspect`. `track` must be sorted by
/// timestamp; both ends are found by binary search.
pub fn window_points(
    track: &[TrackPoint],
    start: DateTime<Utc>,
    inspect: DateTime<Utc>,
) -> &[TrackPoint] {
    if start > inspect {
        return &[];
    }
    let from = track.partition_point(|p| p.timestamp < start);
    let to = track.partition_point(|p| p.timestamp <= inspect);
    &track[from..to.max(from)]
}

pub fn window_track(
    track: &[TrackPoint],
    start: DateTime<Utc>,
    inspect: DateTime<Utc>,
) -> TrackWindow {
    let points = window_points(track, start, inspect);

    TrackWindow {
        visible_path: points
            .iter()
            .map(|p| LatLng::new(p.latitude, p.longitude))
            .collect(),
        current: points.last().map(|p| CurrentPosition {
            position: LatLng::new(p.latitude, p.longitude),
            heading_radians: p.heading_radians,
        }),
    }
}
