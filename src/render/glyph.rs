use std::f64::consts::PI;

use super::context::{DrawContext, PathOp, Saved, ScreenPoint};
use crate::water::palette::{color_for, Rgb};

/// Side length of the square the arrow path is authored in.
pub const GLYPH_DESIGN_SIZE: f64 = 14.0;

/// Open arrow pointing along +x, tail at the origin.
pub const ARROW_PATH: [PathOp; 10] = [
    PathOp::MoveTo { x: 12.765625, y: 7.0 },
    PathOp::LineTo { x: 8.375, y: 10.636719 },
    PathOp::LineTo { x: 8.75, y: 11.082031 },
    PathOp::LineTo { x: 14.0, y: 6.695312 },
    PathOp::LineTo { x: 8.75, y: 2.332031 },
    PathOp::LineTo { x: 8.375, y: 2.777344 },
    PathOp::LineTo { x: 12.765625, y: 6.417969 },
    PathOp::LineTo { x: 0.0, y: 6.417969 },
    PathOp::LineTo { x: 0.0, y: 7.0 },
    PathOp::Close,
];

/// Canvas rotation for a compass direction. The arrow is authored pointing
/// east, so 90 degrees is no rotation and 0 degrees points up.
pub fn glyph_rotation(direction_deg: f32) -> f64 {
    (f64::from(direction_deg) - 90.0) * PI / 180.0
}

/// Rounded pixel extent, never below one pixel.
fn pixel_extent(value: f64) -> f64 {
    let rounded = value.round();
    if rounded >= 1.0 {
        rounded
    } else {
        1.0
    }
}

/// Draw one oriented arrow. Width and height scale the design square
/// independently, so a marker can be stretched along its heading.
pub fn render_glyph<C: DrawContext + ?Sized>(
    ctx: &mut C,
    position: ScreenPoint,
    magnitude: f32,
    direction_deg: f32,
    width: f64,
    height: f64,
) {
    let mut ctx = Saved::new(ctx);
    if !position.is_finite() {
        return;
    }

    let width = pixel_extent(width);
    let height = pixel_extent(height);

    ctx.translate(position.x, position.y);
    ctx.rotate(glyph_rotation(direction_deg));
    ctx.set_stroke_style(color_for(magnitude));
    ctx.scale(width / GLYPH_DESIGN_SIZE, height / GLYPH_DESIGN_SIZE);
    ctx.stroke_path(&ARROW_PATH);
}

/// Draw the undirected dot used for near-still water.
pub fn render_dot<C: DrawContext + ?Sized>(
    ctx: &mut C,
    position: ScreenPoint,
    radius: f64,
    color: Rgb,
) {
    let mut ctx = Saved::new(ctx);
    if !position.is_finite() {
        return;
    }

    ctx.set_fill_style(color);
    ctx.set_stroke_style(color);
    ctx.fill_circle(position, radius);
}
