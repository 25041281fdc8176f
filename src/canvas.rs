//! Drawing surface used by the scene and minimap renderers, plus a software
//! implementation writing into a packed `u32` pixel buffer.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// Packed 0x00RRGGBB, the pixel layout softbuffer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        // Alpha at 0
        Color((b as u32) | ((g as u32) << 8) | ((r as u32) << 16))
    }

    #[inline]
    pub const fn channels(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        c.channels()
    }
}

/// Minimal 2D drawing capability. Coordinates are in user space: the current
/// transform (set with `translate`/`scale`) maps them to pixels, composing the
/// way a canvas context does.
pub trait Canvas {
    fn fill_background(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    /// Line width in user units.
    fn set_line_width(&mut self, width: f64);

    fn stroke_line(&mut self, p1: Vec2, p2: Vec2);
    fn fill_circle(&mut self, center: Vec2, radius: f64);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2);

    fn translate(&mut self, offset: Vec2);
    fn scale(&mut self, factors: Vec2);
    fn reset_transform(&mut self);
}

/// Axis-aligned affine transform: `pixel = user * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    scale: Vec2,
    offset: Vec2,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        scale: Vec2::new(1.0, 1.0),
        offset: Vec2::ZERO,
    };

    #[inline]
    fn apply(&self, p: Vec2) -> Vec2 {
        p.mul(self.scale) + self.offset
    }

    #[inline]
    fn apply_len(&self, len: f64) -> f64 {
        len * 0.5 * (self.scale.x.abs() + self.scale.y.abs())
    }
}

/// Software canvas over a row-major pixel buffer.
pub struct Framebuffer<'a> {
    buf: &'a mut [u32],
    width: usize,
    height: usize,
    transform: Transform,
    stroke: Color,
    fill: Color,
    line_width: f64,
}

impl<'a> Framebuffer<'a> {
    pub fn new(buf: &'a mut [u32], width: usize, height: usize) -> Self {
        debug_assert_eq!(buf.len(), width * height);
        Self {
            buf,
            width,
            height,
            transform: Transform::IDENTITY,
            stroke: Color::WHITE,
            fill: Color::WHITE,
            line_width: 1.0,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| Color(self.buf[y * self.width + x]))
    }

    /// Fill the half-open pixel span [x0, x1) x [y0, y1), clipped to the buffer.
    fn fill_pixels(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
        let clamp_x = |v: f64| v.round().clamp(0.0, self.width as f64) as usize;
        let clamp_y = |v: f64| v.round().clamp(0.0, self.height as f64) as usize;
        let (xa, xb) = (clamp_x(x0.min(x1)), clamp_x(x0.max(x1)));
        let (ya, yb) = (clamp_y(y0.min(y1)), clamp_y(y0.max(y1)));
        if xa >= xb || ya >= yb {
            return;
        }
        for y in ya..yb {
            let row = y * self.width;
            self.buf[row + xa..row + xb].fill(color.0);
        }
    }

    fn stamp(&mut self, center: Vec2, half: f64, color: Color) {
        self.fill_pixels(
            center.x - half,
            center.y - half,
            center.x + half,
            center.y + half,
            color,
        );
    }
}

impl Canvas for Framebuffer<'_> {
    fn fill_background(&mut self, color: Color) {
        self.buf.fill(color.0);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn stroke_line(&mut self, p1: Vec2, p2: Vec2) {
        let a = self.transform.apply(p1);
        let b = self.transform.apply(p2);
        if !a.is_finite() || !b.is_finite() {
            return;
        }
        // Square brush stamped at one-pixel intervals, at least one pixel wide.
        let half = (self.transform.apply_len(self.line_width) * 0.5).max(0.5);
        let steps = (b - a).length().ceil().max(1.0) as usize;
        let color = self.stroke;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.stamp(a.lerp(b, t), half, color);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64) {
        let c = self.transform.apply(center);
        let r = self.transform.apply_len(radius);
        if !c.is_finite() || !(r > 0.0) {
            return;
        }
        let y0 = (c.y - r).floor().max(0.0) as usize;
        let y1 = ((c.y + r).ceil().max(0.0) as usize).min(self.height);
        let color = self.fill;
        for y in y0..y1 {
            // Sample at pixel centers
            let dy = y as f64 + 0.5 - c.y;
            let span = r * r - dy * dy;
            if span < 0.0 {
                continue;
            }
            let dx = span.sqrt();
            self.fill_pixels(c.x - dx, y as f64, c.x + dx, y as f64 + 1.0, color);
        }
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2) {
        let a = self.transform.apply(origin);
        let b = self.transform.apply(origin + size);
        if !a.is_finite() || !b.is_finite() {
            return;
        }
        let color = self.fill;
        self.fill_pixels(a.x, a.y, b.x, b.y, color);
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform.offset = self.transform.offset + offset.mul(self.transform.scale);
    }

    fn scale(&mut self, factors: Vec2) {
        self.transform.scale = self.transform.scale.mul(factors);
    }

    fn reset_transform(&mut self) {
        self.transform = Transform::IDENTITY;
    }
}
