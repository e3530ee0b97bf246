use serde::{Deserialize, Serialize};

use super::palette::{color_for, size_for, Rgb};
use super::types::VectorDataset;
use super::visibility::{RenderVariant, VisibilityFilter};
use crate::geo::LatLng;
use crate::render::{render_dot, render_glyph, DrawContext, Projection};

/// Marker dimensions before the magnitude size multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub base_width: f64,
    pub base_height: f64,
    pub dot_radius: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            base_width: 12.0,
            base_height: 6.0,
            dot_radius: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MarkerShape {
    Dot {
        radius: f64,
    },
    Glyph {
        width: f64,
        height: f64,
        direction_deg: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyledMarker {
    pub position: LatLng,
    pub magnitude: f32,
    pub color: Rgb,
    pub shape: MarkerShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VariantCounts {
    pub suppressed: usize,
    pub simple_dot: usize,
    pub oriented_glyph: usize,
}

/// The installed current dataset. Culling and styling are worked out per
/// repaint from the zoom at that moment; nothing drawn is retained.
#[derive(Debug, Clone)]
pub struct MarkerLayer {
    dataset: VectorDataset,
    style: MarkerStyle,
    filter: VisibilityFilter,
}

impl MarkerLayer {
    pub fn new(dataset: VectorDataset, style: MarkerStyle, filter: VisibilityFilter) -> Self {
        Self {
            dataset,
            style,
            filter,
        }
    }

    pub fn dataset(&self) -> &VectorDataset {
        &self.dataset
    }

    pub fn markers(&self, zoom_level: f64) -> impl Iterator<Item = StyledMarker> + '_ {
        let base_color = color_for(0.0);
        self.dataset.readings().iter().filter_map(move |reading| {
            let position = LatLng::new(f64::from(reading.latitude), f64::from(reading.longitude));
            let magnitude = reading.magnitude;
            match self.filter.classify(magnitude, zoom_level) {
                RenderVariant::Suppressed => None,
                RenderVariant::SimpleDot => Some(StyledMarker {
                    position,
                    magnitude,
                    color: base_color,
                    shape: MarkerShape::Dot {
                        radius: self.style.dot_radius,
                    },
                }),
                RenderVariant::OrientedGlyph => {
                    let scale = f64::from(size_for(magnitude));
                    Some(StyledMarker {
                        position,
                        magnitude,
                        color: color_for(magnitude),
                        shape: MarkerShape::Glyph {
                            width: self.style.base_width * scale,
                            height: self.style.base_height * scale,
                            direction_deg: reading.direction_deg,
                        },
                    })
                }
            }
        })
    }

    pub fn variant_counts(&self, zoom_level: f64) -> VariantCounts {
        let mut counts = VariantCounts::default();
        for reading in self.dataset.readings() {
            match self.filter.classify(reading.magnitude, zoom_level) {
                RenderVariant::Suppressed => counts.suppressed += 1,
                RenderVariant::SimpleDot => counts.simple_dot += 1,
                RenderVariant::OrientedGlyph => counts.oriented_glyph += 1,
            }
        }
        counts
    }

    /// Re-issue draw calls for every visible marker. Call on each pan, zoom
    /// or data change.
    pub fn repaint<C, P>(&self, ctx: &mut C, projection: &P, zoom_level: f64) -> usize
    where
        C: DrawContext + ?Sized,
        P: Projection + ?Sized,
    {
        let mut drawn = 0;
        for marker in self.markers(zoom_level) {
            let point = projection.project(marker.position);
            match marker.shape {
                MarkerShape::Dot { radius } => render_dot(ctx, point, radius, marker.color),
                MarkerShape::Glyph {
                    width,
                    height,
                    direction_deg,
                } => render_glyph(ctx, point, marker.magnitude, direction_deg, width, height),
            }
            drawn += 1;
        }
        drawn
    }
}
