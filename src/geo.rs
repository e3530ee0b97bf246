use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// What the map widget last reported. Culling only looks at `zoom_level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    pub center: LatLng,
    pub zoom_level: f64,
    pub bounds: Option<Bounds>,
}

impl ViewportState {
    pub fn new(center: LatLng, zoom_level: f64) -> Self {
        Self {
            center,
            zoom_level,
            bounds: None,
        }
    }
}

pub type SharedViewport = Arc<Mutex<ViewportState>>;
