//! # imbridge-core
//!
//! The GUI-library side of **imbridge**: the per-frame input snapshot the
//! platform adapter fills in ([`Io`]), the draw lists it replays
//! ([`DrawData`]) and the font atlas it uploads ([`FontAtlas`]).
//!
//! Pair with `imbridge-adapter` to drive it from a windowing toolkit and a
//! scene-graphics library.

pub mod context;
pub mod draw_list;
pub mod input;
pub mod renderer;

// ─── re-exports ──────────────────────────────────────────────────────────────
pub use context::{ClipboardBackend, Context};
pub use draw_list::{DrawCallback, DrawCmd, DrawIdx, DrawList, DrawVert, TextureId};
pub use input::{Io, Key, Modifiers, MouseButton, MOUSE_POS_ABSENT};
pub use renderer::{DrawData, FontAtlas};

// ─── Prelude ─────────────────────────────────────────────────────────────────
pub mod prelude {
    pub use super::{
        context::Context,
        draw_list::{DrawList, TextureId},
        input::{Io, Key, Modifiers, MouseButton},
        renderer::DrawData,
        Color, Rect, Vec2,
    };
}

// ─── Primitive math types ─────────────────────────────────────────────────── //

/// 2-D floating-point vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    #[inline] pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }
    #[inline] pub const fn splat(v: f32) -> Self { Self { x: v, y: v } }

    /// Component-wise product.
    #[inline] pub fn scale(self, s: Self) -> Self { Self::new(self.x * s.x, self.y * s.y) }
}

impl std::ops::Add    for Vec2 { type Output = Self; fn add(self, r: Self) -> Self { Self::new(self.x + r.x, self.y + r.y) } }
impl std::ops::Sub    for Vec2 { type Output = Self; fn sub(self, r: Self) -> Self { Self::new(self.x - r.x, self.y - r.y) } }
impl std::ops::Mul<f32> for Vec2 { type Output = Self; fn mul(self, r: f32) -> Self { Self::new(self.x * r, self.y * r) } }

impl From<[f32; 2]>    for Vec2 { fn from([x, y]: [f32; 2])   -> Self { Self::new(x, y) } }
impl From<Vec2> for [f32; 2]   { fn from(v: Vec2) -> Self { [v.x, v.y] } }

// ─── Color ───────────────────────────────────────────────────────────────────

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Color {
    pub r: f32, pub g: f32, pub b: f32, pub a: f32,
}

impl Color {
    pub const WHITE:       Self = Self { r:1., g:1., b:1., a:1. };
    pub const BLACK:       Self = Self { r:0., g:0., b:0., a:1. };

    #[inline] pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self { Self { r, g, b, a } }
    #[inline] pub const fn rgb(r: f32, g: f32, b: f32) -> Self { Self { r, g, b, a: 1.0 } }
    #[inline] pub fn with_alpha(self, a: f32) -> Self { Self { a, ..self } }

    /// Pack to 0xAABBGGRR, i.e. bytes R, G, B, A in memory order.
    #[inline]
    pub fn to_rgba_u32(self) -> u32 {
        let r = (self.r.clamp(0., 1.) * 255.) as u32;
        let g = (self.g.clamp(0., 1.) * 255.) as u32;
        let b = (self.b.clamp(0., 1.) * 255.) as u32;
        let a = (self.a.clamp(0., 1.) * 255.) as u32;
        (a << 24) | (b << 16) | (g << 8) | r
    }

    #[inline]
    pub fn from_rgba_u32(c: u32) -> Self {
        Self {
            r: (c & 0xFF) as f32 / 255.,
            g: ((c >> 8)  & 0xFF) as f32 / 255.,
            b: ((c >> 16) & 0xFF) as f32 / 255.,
            a: ((c >> 24) & 0xFF) as f32 / 255.,
        }
    }

    /// Construct from a 0xRRGGBB hex literal.
    #[inline]
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.,
            g: ((hex >> 8)  & 0xFF) as f32 / 255.,
            b: (hex & 0xFF) as f32 / 255.,
            a: 1.0,
        }
    }
}

impl From<[f32; 4]> for Color { fn from([r,g,b,a]: [f32; 4]) -> Self { Self::new(r,g,b,a) } }
impl From<Color> for [f32; 4] { fn from(c: Color)             -> Self { [c.r, c.g, c.b, c.a] } }

// ─── Rect ────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle (min inclusive, max exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect { pub min: Vec2, pub max: Vec2 }

impl Rect {
    pub const ZERO: Self = Self { min: Vec2::ZERO, max: Vec2::ZERO };
    /// Clip rectangle that clips nothing.
    pub const EVERYTHING: Self = Self { min: Vec2::ZERO, max: Vec2::splat(f32::MAX) };

    #[inline] pub const fn new(min: Vec2, max: Vec2) -> Self { Self { min, max } }

    #[inline]
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    #[inline] pub fn width(self)  -> f32  { self.max.x - self.min.x }
    #[inline] pub fn height(self) -> f32  { self.max.y - self.min.y }
    #[inline] pub fn size(self)   -> Vec2 { Vec2::new(self.width(), self.height()) }
    #[inline] pub fn is_empty(self) -> bool { self.min.x >= self.max.x || self.min.y >= self.max.y }

    #[inline] pub fn intersect(self, o: Self) -> Self { Self { min: Vec2::new(self.min.x.max(o.min.x), self.min.y.max(o.min.y)),
                                                               max: Vec2::new(self.max.x.min(o.max.x), self.max.y.min(o.max.y)) } }

    /// Scale both corners component-wise (logical → framebuffer pixels).
    #[inline] pub fn scale(self, s: Vec2) -> Self { Self { min: self.min.scale(s), max: self.max.scale(s) } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_packs_as_rgba_bytes() {
        let c = Color::new(1.0, 0.0, 0.0, 1.0).to_rgba_u32();
        assert_eq!(c.to_le_bytes(), [255, 0, 0, 255]);
        assert_eq!(Color::from_rgba_u32(c), Color::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn rect_scale_and_intersect() {
        let r = Rect::new(Vec2::new(10.0, 20.0), Vec2::new(110.0, 70.0));
        let s = r.scale(Vec2::splat(2.0));
        assert_eq!(s, Rect::new(Vec2::new(20.0, 40.0), Vec2::new(220.0, 140.0)));
        assert_eq!(s.width(), 200.0);

        let clipped = r.intersect(Rect::new(Vec2::ZERO, Vec2::new(50.0, 50.0)));
        assert_eq!(clipped, Rect::new(Vec2::new(10.0, 20.0), Vec2::new(50.0, 50.0)));
        assert!(Rect::new(Vec2::new(5.0, 5.0), Vec2::new(5.0, 9.0)).is_empty());
    }
}
