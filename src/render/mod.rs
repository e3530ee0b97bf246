pub mod context;
pub mod glyph;
pub mod projection;

pub use context::{CommandRecorder, DrawCommand, DrawContext, PathOp, Saved, ScreenPoint};
pub use glyph::{render_dot, render_glyph};
pub use projection::{Projection, WebMercator};
