use std::f64::consts::PI;

use super::context::ScreenPoint;
use crate::geo::LatLng;

/// Maps geographic coordinates to canvas pixels. The map widget owns the real
/// one; [`WebMercator`] covers hosts and tools without a widget.
pub trait Projection {
    fn project(&self, point: LatLng) -> ScreenPoint;
}

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Spherical Web Mercator with `center` in the middle of a `width` x `height`
/// canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    pub center: LatLng,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl WebMercator {
    pub fn new(center: LatLng, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    fn world_pixel(&self, point: LatLng) -> (f64, f64) {
        let scale = TILE_SIZE * 2f64.powf(self.zoom);
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (point.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
        (x, y)
    }
}

impl Projection for WebMercator {
    fn project(&self, point: LatLng) -> ScreenPoint {
        let (x, y) = self.world_pixel(point);
        let (cx, cy) = self.world_pixel(self.center);
        ScreenPoint::new(x - cx + self.width / 2.0, y - cy + self.height / 2.0)
    }
}
