//! What a frame hands to the platform renderer: the draw data and the
//! font atlas pixels.

use crate::draw_list::{DrawList, TextureId};
use crate::Vec2;

// ─── DrawData ────────────────────────────────────────────────────────────────

/// A finished frame ready to hand to a backend.
///
/// Lists are drawn in order; later lists overdraw earlier ones.
#[derive(Debug, Clone, Default)]
pub struct DrawData {
    pub lists:             Vec<DrawList>,
    /// Logical size of the display the lists were built for.
    pub display_size:      Vec2,
    /// Framebuffer pixels per logical pixel.
    pub framebuffer_scale: Vec2,
    pub total_vtx_count:   usize,
    pub total_idx_count:   usize,
}

impl DrawData {
    pub fn new(display_size: Vec2, framebuffer_scale: Vec2) -> Self {
        Self { display_size, framebuffer_scale, ..Self::default() }
    }

    pub fn push(&mut self, list: DrawList) {
        self.total_vtx_count += list.vtx_buf.len();
        self.total_idx_count += list.idx_buf.len();
        self.lists.push(list);
    }

    /// Framebuffer size in pixels (`display_size * framebuffer_scale`, rounded).
    pub fn framebuffer_size(&self) -> (i32, i32) {
        let px = self.display_size.scale(self.framebuffer_scale);
        (px.x.round() as i32, px.y.round() as i32)
    }

    /// True for a minimised or zero-scale target: nothing can be drawn.
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = self.framebuffer_size();
        w <= 0 || h <= 0
    }
}

// ─── FontAtlas ───────────────────────────────────────────────────────────────

/// Side of the default atlas, in pixels.
const DEFAULT_ATLAS_SIZE: u32 = 64;

/// Font atlas pixels plus the texture id the backend assigned to them.
///
/// The atlas is stored as alpha-only; backends that want full-colour data
/// call [`tex_data_as_rgba32`](Self::tex_data_as_rgba32), which expands it
/// to white RGBA once and caches the result.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    width:  u32,
    height: u32,
    alpha:  Vec<u8>,
    rgba:   Option<Vec<u8>>,
    tex_id: Option<TextureId>,
}

impl Default for FontAtlas {
    /// A blank atlas whose top-left 2×2 block is opaque white, the region
    /// untextured geometry samples with UV (0, 0).
    fn default() -> Self {
        let size = DEFAULT_ATLAS_SIZE;
        let mut alpha = vec![0u8; (size * size) as usize];
        for y in 0..2 {
            for x in 0..2 {
                alpha[(y * size + x) as usize] = 0xFF;
            }
        }
        Self::from_alpha8(size, size, alpha)
    }
}

impl FontAtlas {
    /// Build from a row-major alpha bitmap.
    pub fn from_alpha8(width: u32, height: u32, alpha: Vec<u8>) -> Self {
        debug_assert_eq!(alpha.len(), (width * height) as usize);
        Self { width, height, alpha, rgba: None, tex_id: None }
    }

    pub fn size(&self) -> (u32, u32) { (self.width, self.height) }

    /// RGBA 8888 pixels (4 bytes per pixel, row stride `width * 4`).
    pub fn tex_data_as_rgba32(&mut self) -> (&[u8], u32, u32) {
        let alpha = &self.alpha;
        let rgba = self.rgba.get_or_insert_with(|| {
            alpha.iter().flat_map(|&a| [0xFF, 0xFF, 0xFF, a]).collect()
        });
        (rgba.as_slice(), self.width, self.height)
    }

    pub fn tex_id(&self) -> Option<TextureId> { self.tex_id }
    pub fn set_tex_id(&mut self, id: Option<TextureId>) { self.tex_id = id; }
}
