//! Draw-command batches – what the GUI hands to the platform renderer.
//!
//! One [`DrawList`] is one batch: a vertex buffer, an index buffer and an
//! ordered list of [`DrawCmd`] ranges over that index buffer. Indices are
//! absolute into the batch's vertex buffer; each command covers the next
//! `elem_count` indices after the previous command.

use std::fmt;
use std::rc::Rc;

use crate::{Color, Rect, Vec2};

// ─── Vertex ──────────────────────────────────────────────────────────────────

/// A single render vertex with position, UV, and a packed RGBA colour.
///
/// Tightly packed: 2×f32 position, 2×f32 UV, 4×u8 colour (20 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct DrawVert {
    /// Screen-space position (logical pixels, top-left origin).
    pub pos: [f32; 2],
    /// Normalised texture coordinates.
    pub uv:  [f32; 2],
    /// 0xAABBGGRR packed colour.
    pub col: u32,
}

// SAFETY: all fields are plain scalar types and the layout has no padding.
unsafe impl bytemuck::Pod      for DrawVert {}
unsafe impl bytemuck::Zeroable for DrawVert {}

/// Index element type. 16-bit unless the `index32` feature is enabled.
#[cfg(not(feature = "index32"))]
pub type DrawIdx = u16;
/// Index element type. 16-bit unless the `index32` feature is enabled.
#[cfg(feature = "index32")]
pub type DrawIdx = u32;

// ─── TextureId ───────────────────────────────────────────────────────────────

/// Opaque handle to a backend texture.
///
/// The GUI never interprets it; the platform renderer resolves it to a real
/// texture when replaying draw commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub usize);

impl TextureId {
    /// The font atlas texture.
    pub const FONT: Self = Self(1);
    /// First id handed out for user textures.
    pub const FIRST_USER: Self = Self(16);
}

// ─── DrawCallback ────────────────────────────────────────────────────────────

/// User callback that replaces the default draw of a command.
#[derive(Clone)]
pub struct DrawCallback(Rc<dyn Fn(&DrawList, &DrawCmd)>);

impl DrawCallback {
    pub fn new(f: impl Fn(&DrawList, &DrawCmd) + 'static) -> Self { Self(Rc::new(f)) }

    #[inline]
    pub fn invoke(&self, list: &DrawList, cmd: &DrawCmd) { (self.0)(list, cmd) }
}

impl fmt::Debug for DrawCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("DrawCallback(..)") }
}

// ─── DrawCmd ─────────────────────────────────────────────────────────────────

/// One draw range: `elem_count` indices sharing a texture and clip rect.
#[derive(Debug, Clone)]
pub struct DrawCmd {
    /// Scissor rectangle in logical screen pixels.
    pub clip_rect: Rect,
    /// `None` draws untextured (vertex colour only).
    pub texture_id: Option<TextureId>,
    /// Number of indices covered by this command (a multiple of 3).
    pub elem_count: u32,
    /// When set, the renderer calls this instead of drawing.
    pub callback: Option<DrawCallback>,
}

impl DrawCmd {
    pub fn new(clip_rect: Rect, texture_id: Option<TextureId>) -> Self {
        Self { clip_rect, texture_id, elem_count: 0, callback: None }
    }
}

// ─── DrawList ────────────────────────────────────────────────────────────────

/// CPU-side vertex / index / command buffer for one batch.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    pub vtx_buf: Vec<DrawVert>,
    pub idx_buf: Vec<DrawIdx>,
    pub cmd_buf: Vec<DrawCmd>,

    // Bookkeeping
    clip_stack: Vec<Rect>,
    tex_stack:  Vec<TextureId>,
}

impl DrawList {
    pub fn new() -> Self { Self::default() }

    pub fn clear(&mut self) {
        self.vtx_buf.clear();
        self.idx_buf.clear();
        self.cmd_buf.clear();
        self.clip_stack.clear();
        self.tex_stack.clear();
    }

    // ─── clip stack ──────────────────────────────────────────────────────────

    pub fn push_clip_rect(&mut self, rect: Rect) {
        // Intersect with parent clip
        let clip = match self.clip_stack.last() {
            Some(&parent) => rect.intersect(parent),
            None          => rect,
        };
        self.clip_stack.push(clip);
        self.on_state_changed();
    }

    pub fn pop_clip_rect(&mut self) {
        self.clip_stack.pop();
        self.on_state_changed();
    }

    pub fn clip_rect(&self) -> Rect { self.clip_stack.last().copied().unwrap_or(Rect::EVERYTHING) }

    // ─── texture stack ───────────────────────────────────────────────────────

    pub fn push_texture(&mut self, id: TextureId) {
        self.tex_stack.push(id);
        self.on_state_changed();
    }

    pub fn pop_texture(&mut self) {
        self.tex_stack.pop();
        self.on_state_changed();
    }

    pub fn texture(&self) -> Option<TextureId> { self.tex_stack.last().copied() }

    // ─── callbacks ───────────────────────────────────────────────────────────

    /// Insert a command that runs `callback` instead of drawing. Geometry
    /// added afterwards goes into a fresh command.
    pub fn add_callback(&mut self, callback: DrawCallback) {
        let mut cmd = DrawCmd::new(self.clip_rect(), self.texture());
        cmd.callback = Some(callback);
        self.cmd_buf.push(cmd);
    }

    // ─── internal command management ─────────────────────────────────────────

    fn on_state_changed(&mut self) {
        let clip = self.clip_rect();
        let tex  = self.texture();
        if let Some(last) = self.cmd_buf.last_mut() {
            if last.callback.is_none() {
                // An empty command can simply take over the new state.
                if last.elem_count == 0 {
                    last.clip_rect  = clip;
                    last.texture_id = tex;
                    return;
                }
                if last.clip_rect == clip && last.texture_id == tex { return; }
            }
        }
        self.cmd_buf.push(DrawCmd::new(clip, tex));
    }

    /// Drop a trailing command that never received geometry.
    pub(crate) fn pop_unused_cmd(&mut self) {
        if let Some(last) = self.cmd_buf.last() {
            if last.elem_count == 0 && last.callback.is_none() {
                self.cmd_buf.pop();
            }
        }
    }

    fn current_cmd_mut(&mut self) -> &mut DrawCmd {
        let needs_new = self.cmd_buf.last().map_or(true, |c| c.callback.is_some());
        if needs_new {
            let cmd = DrawCmd::new(self.clip_rect(), self.texture());
            self.cmd_buf.push(cmd);
        }
        let last = self.cmd_buf.len() - 1;
        &mut self.cmd_buf[last]
    }

    // ─── raw primitive helpers ───────────────────────────────────────────────

    fn add_vert(&mut self, pos: Vec2, uv: Vec2, col: u32) {
        debug_assert!(
            self.vtx_buf.len() <= DrawIdx::MAX as usize,
            "draw list exceeds the index range of DrawIdx"
        );
        self.vtx_buf.push(DrawVert { pos: pos.into(), uv: uv.into(), col });
    }

    fn add_idx(&mut self, base: u32, a: u32, b: u32, c: u32) {
        let (a, b, c) = (
            (base + a) as DrawIdx,
            (base + b) as DrawIdx,
            (base + c) as DrawIdx,
        );
        self.idx_buf.extend_from_slice(&[a, b, c]);
        self.current_cmd_mut().elem_count += 3;
    }

    fn add_quad(&mut self, p: [Vec2; 4], uv: [Vec2; 4], col: u32) {
        let base = self.vtx_buf.len() as u32;
        for i in 0..4 { self.add_vert(p[i], uv[i], col); }
        self.add_idx(base, 0, 1, 2);
        self.add_idx(base, 0, 2, 3);
    }

    // ─── Filled primitives ───────────────────────────────────────────────────

    /// Solid filled rectangle.
    pub fn filled_rect(&mut self, rect: Rect, col: Color) {
        if rect.is_empty() { return; }
        let uv = Vec2::ZERO; // white pixel UV
        self.add_quad(
            [rect.min, Vec2::new(rect.max.x, rect.min.y), rect.max, Vec2::new(rect.min.x, rect.max.y)],
            [uv; 4],
            col.to_rgba_u32(),
        );
    }

    /// Outlined rectangle (4 quads).
    pub fn rect_outline(&mut self, rect: Rect, thickness: f32, col: Color) {
        let t = thickness;
        // top
        self.filled_rect(Rect::from_min_size(rect.min, Vec2::new(rect.width(), t)), col);
        // bottom
        self.filled_rect(Rect::from_min_size(Vec2::new(rect.min.x, rect.max.y - t), Vec2::new(rect.width(), t)), col);
        // left
        self.filled_rect(Rect::from_min_size(rect.min, Vec2::new(t, rect.height())), col);
        // right
        self.filled_rect(Rect::from_min_size(Vec2::new(rect.max.x - t, rect.min.y), Vec2::new(t, rect.height())), col);
    }

    /// Filled circle approximation (N-gon).
    pub fn filled_circle(&mut self, center: Vec2, radius: f32, col: Color, segments: usize) {
        let c = col.to_rgba_u32();
        let uv = Vec2::ZERO;
        let segs = segments.max(6);
        let base = self.vtx_buf.len() as u32;
        self.add_vert(center, uv, c);
        for i in 0..=segs {
            let a = 2.0 * std::f32::consts::PI * i as f32 / segs as f32;
            let pt = center + Vec2::new(a.cos(), a.sin()) * radius;
            self.add_vert(pt, uv, c);
        }
        for i in 0..segs as u32 {
            self.add_idx(base, 0, i + 1, i + 2);
        }
    }

    /// Textured quad (an image or a font-atlas region).
    pub fn image_quad(
        &mut self,
        texture: TextureId,
        p_min: Vec2, p_max: Vec2,
        uv_min: Vec2, uv_max: Vec2,
        col: Color,
    ) {
        self.push_texture(texture);
        self.add_quad(
            [p_min, Vec2::new(p_max.x, p_min.y), p_max, Vec2::new(p_min.x, p_max.y)],
            [uv_min, Vec2::new(uv_max.x, uv_min.y), uv_max, Vec2::new(uv_min.x, uv_max.y)],
            col.to_rgba_u32(),
        );
        self.pop_texture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<DrawVert>(), 20);
        assert_eq!(std::mem::offset_of!(DrawVert, uv), 8);
        assert_eq!(std::mem::offset_of!(DrawVert, col), 16);
    }

    #[test]
    fn indices_are_absolute_within_the_batch() {
        let mut dl = DrawList::new();
        dl.filled_rect(Rect::new(Vec2::ZERO, Vec2::splat(10.0)), Color::WHITE);
        dl.filled_rect(Rect::new(Vec2::splat(20.0), Vec2::splat(30.0)), Color::WHITE);
        assert_eq!(dl.vtx_buf.len(), 8);
        assert_eq!(&dl.idx_buf[6..9], &[4, 5, 6]);
        assert_eq!(dl.cmd_buf.len(), 1);
        assert_eq!(dl.cmd_buf[0].elem_count, 12);
    }

    #[test]
    fn state_changes_split_commands() {
        let mut dl = DrawList::new();
        dl.filled_rect(Rect::new(Vec2::ZERO, Vec2::splat(10.0)), Color::WHITE);
        dl.push_clip_rect(Rect::new(Vec2::ZERO, Vec2::splat(5.0)));
        dl.filled_rect(Rect::new(Vec2::ZERO, Vec2::splat(10.0)), Color::WHITE);
        dl.pop_clip_rect();
        dl.image_quad(TextureId(42), Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Vec2::ONE, Color::WHITE);

        let counts: Vec<u32> = dl.cmd_buf.iter().map(|c| c.elem_count).collect();
        assert_eq!(counts.iter().sum::<u32>() as usize, dl.idx_buf.len());
        assert_eq!(dl.cmd_buf[1].clip_rect.max, Vec2::splat(5.0));
        assert!(dl.cmd_buf.iter().any(|c| c.texture_id == Some(TextureId(42))));

        // popping the texture left an empty trailing command
        assert_eq!(dl.cmd_buf.last().map(|c| c.elem_count), Some(0));
        dl.pop_unused_cmd();
        assert!(dl.cmd_buf.iter().all(|c| c.elem_count > 0));
    }

    #[test]
    fn callback_gets_its_own_command() {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let mut dl = DrawList::new();
        dl.filled_rect(Rect::new(Vec2::ZERO, Vec2::splat(10.0)), Color::WHITE);
        dl.add_callback(DrawCallback::new(move |_, _| h.set(h.get() + 1)));
        dl.filled_rect(Rect::new(Vec2::ZERO, Vec2::splat(10.0)), Color::WHITE);

        assert_eq!(dl.cmd_buf.len(), 3);
        assert!(dl.cmd_buf[1].callback.is_some());
        assert_eq!(dl.cmd_buf[1].elem_count, 0);
        assert_eq!(dl.cmd_buf[2].elem_count, 6);

        let cmd = &dl.cmd_buf[1];
        cmd.callback.as_ref().unwrap().invoke(&dl, cmd);
        assert_eq!(hits.get(), 1);
    }
}
