//! Canvas-like drawing surface.
//!
//! Markers draw through [`DrawContext`], which mirrors the handful of 2D
//! canvas calls they need. Transform and style changes are scoped with
//! [`Saved`], so every draw leaves the context as it found it.

use serde::Serialize;
use std::ops::{Deref, DerefMut};

use crate::water::palette::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathOp {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Close,
}

pub trait DrawContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn set_stroke_style(&mut self, color: Rgb);
    fn set_fill_style(&mut self, color: Rgb);
    fn stroke_path(&mut self, path: &[PathOp]);
    fn fill_circle(&mut self, center: ScreenPoint, radius: f64);
}

/// Saves the context on creation and restores it on drop, including early
/// returns.
pub struct Saved<'a, C: DrawContext + ?Sized> {
    ctx: &'a mut C,
}

impl<'a, C: DrawContext + ?Sized> Saved<'a, C> {
    pub fn new(ctx: &'a mut C) -> Self {
        ctx.save();
        Self { ctx }
    }
}

impl<C: DrawContext + ?Sized> Deref for Saved<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &*self.ctx
    }
}

impl<C: DrawContext + ?Sized> DerefMut for Saved<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut *self.ctx
    }
}

impl<C: DrawContext + ?Sized> Drop for Saved<'_, C> {
    fn drop(&mut self) {
        self.ctx.restore();
    }
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DrawCommand {
    Save,
    Restore,
    Translate { x: f64, y: f64 },
    Rotate { radians: f64 },
    Scale { x: f64, y: f64 },
    StrokeStyle { color: String },
    FillStyle { color: String },
    StrokePath { path: Vec<PathOp> },
    FillCircle { x: f64, y: f64, radius: f64 },
}

/// Records calls instead of drawing them. Hosts can serialize the list and
/// replay it on a real canvas.
#[derive(Debug, Default, Serialize)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    #[serde(skip)]
    depth: usize,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Number of saves not yet restored.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
    }
}

impl DrawContext for CommandRecorder {
    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, radians: f64) {
        self.commands.push(DrawCommand::Rotate { radians });
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::Scale { x, y });
    }

    fn set_stroke_style(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::StrokeStyle {
            color: color.to_string(),
        });
    }

    fn set_fill_style(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::FillStyle {
            color: color.to_string(),
        });
    }

    fn stroke_path(&mut self, path: &[PathOp]) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.to_vec(),
        });
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64) {
        self.commands.push(DrawCommand::FillCircle {
            x: center.x,
            y: center.y,
            radius,
        });
    }
}
