use serde::Serialize;

pub const DEFAULT_FAR_ZOOM_THRESHOLD: f64 = 12.0;

/// Below this magnitude, far-zoom views drop the reading.
pub const FAR_ZOOM_MIN_MAGNITUDE: f32 = 0.2;
/// Below this magnitude, near-zoom views draw a plain dot.
pub const NEAR_ZOOM_DOT_MAGNITUDE: f32 = 0.05;

/// How a reading is drawn at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderVariant {
    Suppressed,
    SimpleDot,
    OrientedGlyph,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityFilter {
    pub far_zoom_threshold: f64,
}

impl Default for VisibilityFilter {
    fn default() -> Self {
        Self {
            far_zoom_threshold: DEFAULT_FAR_ZOOM_THRESHOLD,
        }
    }
}

impl VisibilityFilter {
    pub fn new(far_zoom_threshold: f64) -> Self {
        Self { far_zoom_threshold }
    }

    pub fn is_far(&self, zoom_level: f64) -> bool {
        zoom_level < self.far_zoom_threshold
    }

    pub fn classify(&self, magnitude: f32, zoom_level: f64) -> RenderVariant {
        classify(magnitude, self.is_far(zoom_level))
    }
}

/// Rules are checked in order: no current, near-zoom slow current, far-zoom
/// slow current. Everything else gets a glyph.
pub fn classify(magnitude: f32, far_zoom: bool) -> RenderVariant {
    if magnitude == 0.0 {
        return RenderVariant::Suppressed;
    }
    if !far_zoom && magnitude > 0.0 && magnitude < NEAR_ZOOM_DOT_MAGNITUDE {
        return RenderVariant::SimpleDot;
    }
    if far_zoom && magnitude < FAR_ZOOM_MIN_MAGNITUDE {
        return RenderVariant::Suppressed;
    }
    RenderVariant::OrientedGlyph
}
