use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{BoatId, TrackedObject};
use super::window::{window_track, TrackWindow};
use crate::geo::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoatMarker {
    pub position: LatLng,
    pub rotation_rad: Option<f64>,
}

/// What the map layer should show for one boat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoatViewState {
    pub boat_id: BoatId,
    pub track_color: String,
    pub visible: bool,
    pub path: Vec<LatLng>,
    pub marker: Option<BoatMarker>,
}

/// A tracked boat plus its current window. Hidden boats keep updating their
/// window so showing them again needs no recompute.
#[derive(Debug, Clone)]
pub struct BoatView {
    object: TrackedObject,
    window: TrackWindow,
    visible: bool,
}

impl BoatView {
    pub fn new(object: TrackedObject) -> Self {
        Self {
            object,
            window: TrackWindow::default(),
            visible: true,
        }
    }

    pub fn id(&self) -> &BoatId {
        &self.object.id
    }

    pub fn object(&self) -> &TrackedObject {
        &self.object
    }

    pub fn window(&self) -> &TrackWindow {
        &self.window
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_time(&mut self, start: DateTime<Utc>, inspect: DateTime<Utc>) {
        self.window = window_track(self.object.points(), start, inspect);
    }

    pub fn state(&self) -> BoatViewState {
        let (path, marker) = if self.visible {
            (
                self.window.visible_path.clone(),
                self.window.current.map(|c| BoatMarker {
                    position: c.position,
                    rotation_rad: c.heading_radians,
                }),
            )
        } else {
            (Vec::new(), None)
        };

        BoatViewState {
            boat_id: self.object.id.clone(),
            track_color: self.object.display_color.clone(),
            visible: self.visible,
            path,
            marker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::types::TrackPoint;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn boat() -> BoatView {
        let points = (0..5)
            .map(|i| TrackPoint {
                latitude: 42.0,
                longitude: -70.0 + i as f64,
                timestamp: at(i * 60),
                heading_radians: Some(1.0),
            })
            .collect();
        BoatView::new(TrackedObject::new("a".into(), points, "#ff0000".into()))
    }

    #[test]
    fn not_drawn_before_first_time_update() {
        let state = boat().state();
        assert!(state.visible);
        assert!(state.path.is_empty());
        assert!(state.marker.is_none());
    }

    #[test]
    fn marker_follows_inspect_time() {
        let mut boat = boat();
        boat.set_time(at(0), at(130));
        let state = boat.state();
        assert_eq!(state.path.len(), 3);
        assert_eq!(
            state.marker,
            Some(BoatMarker {
                position: LatLng::new(42.0, -68.0),
                rotation_rad: Some(1.0)
            })
        );
    }

    #[test]
    fn hidden_boat_keeps_window() {
        let mut boat = boat();
        boat.set_visible(false);
        boat.set_time(at(0), at(240));

        let hidden = boat.state();
        assert!(!hidden.visible);
        assert!(hidden.path.is_empty());
        assert!(hidden.marker.is_none());
        assert_eq!(boat.window().visible_path.len(), 5);

        boat.set_visible(true);
        assert_eq!(boat.state().path.len(), 5);
    }
}
