//! Replays GUI draw data through the graphics context.

use std::mem::size_of;

use imbridge_core::{Context as GuiContext, DrawData, DrawIdx, DrawVert};

use crate::{
    graphics::{AttributeDesc, AttributeType, Context, Draw, Framebuffer, IndicesType, VerticesMode},
    toolkit::Window,
    Adapter,
};

// ─── Vertex layout ───────────────────────────────────────────────────────────

const STRIDE: usize = size_of::<DrawVert>();

pub const POSITION_ATTRIBUTE: AttributeDesc = AttributeDesc {
    name:       "cogl_position_in",
    stride:     STRIDE,
    offset:     0,
    components: 2,
    ty:         AttributeType::Float,
    normalized: false,
};

pub const TEX_COORD_ATTRIBUTE: AttributeDesc = AttributeDesc {
    name:       "cogl_tex_coord0_in",
    stride:     STRIDE,
    offset:     8,
    components: 2,
    ty:         AttributeType::Float,
    normalized: false,
};

pub const COLOR_ATTRIBUTE: AttributeDesc = AttributeDesc {
    name:       "cogl_color_in",
    stride:     STRIDE,
    offset:     16,
    components: 4,
    ty:         AttributeType::UnsignedByte,
    normalized: true,
};

/// Index element type matching [`DrawIdx`].
pub fn draw_indices_type() -> IndicesType {
    if size_of::<DrawIdx>() == 4 { IndicesType::UnsignedInt } else { IndicesType::UnsignedShort }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

impl<W: Window, C: Context> Adapter<W, C> {
    /// Finish the GUI frame in `ctx` and draw it.
    pub fn render(&mut self, ctx: &mut GuiContext) {
        let data = ctx.render();
        self.render_draw_data(data);
    }

    /// Draw one frame of GUI output into the framebuffer.
    ///
    /// A zero-sized target issues no graphics calls at all. Geometry objects
    /// live for one batch and are released before the next one is built.
    pub fn render_draw_data(&mut self, draw_data: &DrawData) {
        if draw_data.is_degenerate() {
            log::trace!("render_draw_data: zero-sized target, skipping");
            return;
        }
        let Self { context, framebuffer, device, textures, .. } = self;
        let Some(device) = device.as_mut() else {
            log::debug!("render_draw_data: device objects missing, frame skipped");
            return;
        };

        let display = draw_data.display_size;
        let scale   = draw_data.framebuffer_scale;
        framebuffer.orthographic(0.0, 0.0, display.x, display.y, -1.0, 1.0);

        let index_type = draw_indices_type();
        for list in &draw_data.lists {
            let vertices = context.new_attribute_buffer(bytemuck::cast_slice(&list.vtx_buf));
            let attributes = [
                context.new_attribute(&vertices, &POSITION_ATTRIBUTE),
                context.new_attribute(&vertices, &TEX_COORD_ATTRIBUTE),
                context.new_attribute(&vertices, &COLOR_ATTRIBUTE),
            ];
            let mut primitive = context.new_primitive(VerticesMode::Triangles, list.vtx_buf.len(), &attributes);
            let mut indices = context.new_indices(index_type, bytemuck::cast_slice(&list.idx_buf), list.idx_buf.len());

            let mut idx_offset = 0usize;
            for cmd in &list.cmd_buf {
                let count = cmd.elem_count as usize;
                context.set_indices_offset(&mut indices, idx_offset * size_of::<DrawIdx>());
                context.set_primitive_indices(&mut primitive, &indices, count);

                if let Some(callback) = &cmd.callback {
                    callback.invoke(list, cmd);
                } else {
                    let texture = cmd.texture_id.and_then(|id| textures.get(id));
                    context.set_pipeline_layer_texture(&mut device.pipeline, 0, texture);

                    let clip = cmd.clip_rect.scale(scale);
                    framebuffer.push_scissor_clip(
                        clip.min.x as i32,
                        clip.min.y as i32,
                        (clip.max.x - clip.min.x) as i32,
                        (clip.max.y - clip.min.y) as i32,
                    );
                    framebuffer.draw_primitive(&primitive, &device.pipeline);
                    framebuffer.pop_clip();
                }
                idx_offset += count;
            }
            // Release this batch's objects before building the next.
            drop(primitive);
            drop(indices);
            drop(attributes);
            drop(vertices);
        }

        framebuffer.flush();
    }
}
