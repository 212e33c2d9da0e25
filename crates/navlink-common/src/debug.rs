//! Renderer-agnostic debug drawing primitives
//!
//! Front ends turn a [`DebugDraw`] into whatever their renderer needs; the
//! link generator only appends lines and arrows to it.

use glam::Vec3;

/// Color representation for debug visualization
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (alpha = 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

/// Common debug colors
impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const CYAN: Color = Color::rgb(0.0, 1.0, 1.0);
    pub const ORANGE: Color = Color::rgb(1.0, 0.5, 0.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
}

/// Debug line for rendering
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
    pub thickness: f32,
}

/// Debug arrow for rendering
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DebugArrow {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
    pub head_size: f32,
}

impl DebugArrow {
    /// Direction from `start` to `end`, or zero for a collapsed arrow
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }
}

/// Collection of debug drawing primitives
#[derive(Debug, Default, Clone)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DebugDraw {
    pub lines: Vec<DebugLine>,
    pub arrows: Vec<DebugArrow>,
}

impl DebugDraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.arrows.clear();
    }

    pub fn line(&mut self, start: Vec3, end: Vec3, color: Color) {
        self.thick_line(start, end, color, 1.0);
    }

    pub fn thick_line(&mut self, start: Vec3, end: Vec3, color: Color, thickness: f32) {
        self.lines.push(DebugLine {
            start,
            end,
            color,
            thickness,
        });
    }

    pub fn arrow(&mut self, start: Vec3, end: Vec3, color: Color) {
        self.sized_arrow(start, end, color, 0.5);
    }

    pub fn sized_arrow(&mut self, start: Vec3, end: Vec3, color: Color, head_size: f32) {
        self.arrows.push(DebugArrow {
            start,
            end,
            color,
            head_size,
        });
    }

    /// Gets the total number of debug primitives
    pub fn primitive_count(&self) -> usize {
        self.lines.len() + self.arrows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitive_count() == 0
    }
}

/// Types that can describe themselves as debug primitives
pub trait DebugVisualize {
    fn debug_draw(&self, draw: &mut DebugDraw);
}
