//! CPU triangle rasteriser for the headless onscreen.

use crate::graphics::{BlendMode, HeadlessPipeline, HeadlessPrimitive, IndexRange};
use imbridge_adapter::graphics::{AttributeType, CullFaceMode, IndicesType};

/// Well-known attribute names the rasteriser reads.
pub const POSITION_ATTRIBUTE:  &str = "cogl_position_in";
pub const TEX_COORD_ATTRIBUTE: &str = "cogl_tex_coord0_in";
pub const COLOR_ATTRIBUTE:     &str = "cogl_color_in";

/// Integer pixel rectangle, `x0..x1` by `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect { pub x0: i32, pub y0: i32, pub x1: i32, pub y1: i32 }

impl PixelRect {
    pub fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x0: x, y0: y, x1: x.saturating_add(w.max(0)), y1: y.saturating_add(h.max(0)) }
    }

    pub fn intersect(self, o: Self) -> Self {
        Self { x0: self.x0.max(o.x0), y0: self.y0.max(o.y0), x1: self.x1.min(o.x1), y1: self.y1.min(o.y1) }
    }

    pub fn is_empty(self) -> bool { self.x0 >= self.x1 || self.y0 >= self.y1 }
}

/// Maps projection space onto framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection { pub x1: f32, pub y1: f32, pub x2: f32, pub y2: f32 }

impl Projection {
    fn to_pixels(self, p: [f32; 2], width: i32, height: i32) -> [f32; 2] {
        let sx = width  as f32 / (self.x2 - self.x1);
        let sy = height as f32 / (self.y2 - self.y1);
        [(p[0] - self.x1) * sx, (p[1] - self.y1) * sy]
    }
}

/// RGBA target (row-major, 4 bytes per pixel).
pub struct Target<'a> {
    pub pixels: &'a mut [u8],
    pub width:  i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    pos: [f32; 2],
    uv:  [f32; 2],
    col: [f32; 4],
}

/// Rasterise `primitive` as a triangle list. Returns pixels written.
pub fn draw_triangles(
    target:     &mut Target<'_>,
    clip:       PixelRect,
    projection: Projection,
    primitive:  &HeadlessPrimitive,
    pipeline:   &HeadlessPipeline,
) -> usize {
    let bounds = PixelRect { x0: 0, y0: 0, x1: target.width, y1: target.height }.intersect(clip);
    if bounds.is_empty() { return 0; }

    let order: Vec<usize> = match primitive.indices() {
        Some(range) => read_indices(range),
        None        => (0..primitive.n_vertices()).collect(),
    };

    let texture = pipeline.layer_texture();
    let mut written = 0;
    for tri in order.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (
            fetch(primitive, tri[0]),
            fetch(primitive, tri[1]),
            fetch(primitive, tri[2]),
        ) else { continue };

        let v = [a, b, c].map(|mut v| {
            v.pos = projection.to_pixels(v.pos, target.width, target.height);
            v
        });

        let signed_area = |ax: f32, ay: f32, bx: f32, by: f32, cx: f32, cy: f32| -> f32 {
            (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
        };
        let area = signed_area(v[0].pos[0], v[0].pos[1], v[1].pos[0], v[1].pos[1], v[2].pos[0], v[2].pos[1]);
        if area.abs() < f32::EPSILON { continue; }
        // Clockwise on screen is clockwise in device space too: a back face.
        if pipeline.cull_face_mode() == CullFaceMode::Back && area > 0.0 { continue; }

        // Bounding box
        let min_x = (v[0].pos[0].min(v[1].pos[0]).min(v[2].pos[0]).floor() as i32).max(bounds.x0);
        let min_y = (v[0].pos[1].min(v[1].pos[1]).min(v[2].pos[1]).floor() as i32).max(bounds.y0);
        let max_x = (v[0].pos[0].max(v[1].pos[0]).max(v[2].pos[0]).ceil() as i32).min(bounds.x1);
        let max_y = (v[0].pos[1].max(v[1].pos[1]).max(v[2].pos[1]).ceil() as i32).min(bounds.y1);

        for py in min_y..max_y {
            for px in min_x..max_x {
                let (fx, fy) = (px as f32 + 0.5, py as f32 + 0.5);
                let w0 = signed_area(v[1].pos[0], v[1].pos[1], v[2].pos[0], v[2].pos[1], fx, fy) / area;
                let w1 = signed_area(v[2].pos[0], v[2].pos[1], v[0].pos[0], v[0].pos[1], fx, fy) / area;
                let w2 = 1.0 - w0 - w1;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 { continue; }

                let lerp = |i: usize, get: fn(&Vertex, usize) -> f32| {
                    get(&v[0], i) * w0 + get(&v[1], i) * w1 + get(&v[2], i) * w2
                };
                let mut src = [0.0f32; 4];
                for (i, s) in src.iter_mut().enumerate() {
                    *s = lerp(i, |v, i| v.col[i]);
                }
                if let Some(tex) = texture {
                    let texel = tex.sample(lerp(0, |v, i| v.uv[i]), lerp(1, |v, i| v.uv[i]));
                    for (s, t) in src.iter_mut().zip(texel) { *s *= t; }
                }

                let idx = ((py * target.width + px) * 4) as usize;
                blend(&mut target.pixels[idx..idx + 4], src, pipeline.blend_mode());
                written += 1;
            }
        }
    }
    written
}

fn blend(dst: &mut [u8], src: [f32; 4], mode: BlendMode) {
    let d = [dst[0], dst[1], dst[2], dst[3]].map(|c| c as f32 / 255.0);
    let a = src[3];
    let out = match mode {
        BlendMode::Straight => [
            src[0] * a + d[0] * (1.0 - a),
            src[1] * a + d[1] * (1.0 - a),
            src[2] * a + d[2] * (1.0 - a),
            a + d[3] * (1.0 - a),
        ],
        BlendMode::Premultiplied => [
            src[0] + d[0] * (1.0 - a),
            src[1] + d[1] * (1.0 - a),
            src[2] + d[2] * (1.0 - a),
            a + d[3] * (1.0 - a),
        ],
    };
    for (o, c) in dst.iter_mut().zip(out) {
        *o = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

fn read_indices(range: &IndexRange) -> Vec<usize> {
    let size = range.ty.size();
    let data = range.data.get(range.offset..).unwrap_or(&[]);
    data.chunks_exact(size)
        .take(range.count)
        .map(|b| match range.ty {
            IndicesType::UnsignedShort => u16::from_le_bytes([b[0], b[1]]) as usize,
            IndicesType::UnsignedInt   => u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize,
        })
        .collect()
}

fn fetch(primitive: &HeadlessPrimitive, index: usize) -> Option<Vertex> {
    if index >= primitive.n_vertices() { return None; }
    let mut v = Vertex { pos: [0.0; 2], uv: [0.0; 2], col: [1.0; 4] };
    for (desc, data) in primitive.attributes() {
        let base = index * desc.stride + desc.offset;
        let mut comps = [0.0f32; 4];
        for (c, out) in comps.iter_mut().enumerate().take(desc.components) {
            *out = match desc.ty {
                AttributeType::Float => {
                    let at = base + c * 4;
                    let b = data.get(at..at + 4)?;
                    f32::from_le_bytes([b[0], b[1], b[2], b[3]])
                }
                AttributeType::UnsignedByte => {
                    let b = *data.get(base + c)? as f32;
                    if desc.normalized { b / 255.0 } else { b }
                }
            };
        }
        match desc.name {
            POSITION_ATTRIBUTE  => v.pos = [comps[0], comps[1]],
            TEX_COORD_ATTRIBUTE => v.uv  = [comps[0], comps[1]],
            COLOR_ATTRIBUTE     => v.col = comps,
            _ => {}
        }
    }
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_rects_intersect() {
        let a = PixelRect::from_xywh(0, 0, 10, 10);
        let b = PixelRect::from_xywh(5, 5, 10, 10);
        assert_eq!(a.intersect(b), PixelRect { x0: 5, y0: 5, x1: 10, y1: 10 });
        assert!(a.intersect(PixelRect::from_xywh(20, 20, 1, 1)).is_empty());
    }

    #[test]
    fn projection_scales_to_pixels() {
        let p = Projection { x1: 0.0, y1: 0.0, x2: 100.0, y2: 50.0 };
        assert_eq!(p.to_pixels([50.0, 25.0], 200, 100), [100.0, 50.0]);
    }

    #[test]
    fn straight_blend_over_black() {
        let mut px = [0, 0, 0, 255];
        blend(&mut px, [1.0, 1.0, 1.0, 0.5], BlendMode::Straight);
        assert_eq!(px, [128, 128, 128, 255]);
    }
}
