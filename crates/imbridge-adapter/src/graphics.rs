//! Scene-graphics seam: the pipeline, buffer, primitive and framebuffer
//! operations the adapter replays draw data through.
//!
//! Object handles are associated types of [`Context`]; releasing one is
//! dropping it.

use imbridge_core::Color;

use crate::toolkit::{Event, EventMask, NativeWindow};

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    #[error("blend description rejected: {0}")]
    Blend(String),
    #[error("depth state rejected: {0}")]
    DepthState(String),
    #[error("texture creation failed: {0}")]
    Texture(String),
    #[error("context creation failed: {0}")]
    Context(String),
    #[error("onscreen framebuffer creation failed: {0}")]
    Onscreen(String),
}

// ─── Descriptors ─────────────────────────────────────────────────────────────

/// Window-system integration layer the context is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinsysId { EglXlib, EglWayland, Wgl, Stub }

/// Faces wound clockwise in normalized device space are back faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFaceMode { None, Back }

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthState {
    pub test_enabled:  bool,
    pub write_enabled: bool,
    pub range:         (f32, f32),
}

impl Default for DepthState {
    fn default() -> Self {
        Self { test_enabled: false, write_enabled: true, range: (0.0, 1.0) }
    }
}

impl DepthState {
    /// No depth test and no depth writes.
    pub fn disabled() -> Self {
        Self { test_enabled: false, write_enabled: false, ..Self::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat { Rgba8888, A8 }

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 4,
            PixelFormat::A8       => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType { Float, UnsignedByte }

impl AttributeType {
    pub fn size(self) -> usize {
        match self {
            AttributeType::Float        => 4,
            AttributeType::UnsignedByte => 1,
        }
    }
}

/// One named vertex attribute inside an interleaved buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDesc {
    pub name:       &'static str,
    pub stride:     usize,
    pub offset:     usize,
    pub components: usize,
    pub ty:         AttributeType,
    /// Integer components are mapped to 0..1.
    pub normalized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicesType { UnsignedShort, UnsignedInt }

impl IndicesType {
    /// Index type for an index element of `size` bytes.
    pub fn for_size(size: usize) -> Option<Self> {
        match size {
            2 => Some(IndicesType::UnsignedShort),
            4 => Some(IndicesType::UnsignedInt),
            _ => None,
        }
    }

    pub fn size(self) -> usize {
        match self {
            IndicesType::UnsignedShort => 2,
            IndicesType::UnsignedInt   => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticesMode { Triangles }

/// Outcome of offering a native event to the graphics library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReturn {
    /// Let the event through.
    Continue,
    /// The graphics library consumed the event.
    Remove,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Entry point: connects to a window-system layer and yields a [`Context`].
pub trait Renderer {
    type Context: Context;

    fn connect(self, winsys: WinsysId) -> Result<Self::Context, GraphicsError>;
}

/// A graphics context: creates pipelines, textures and geometry objects.
pub trait Context: Sized {
    /// Shared, reference-counted texture handle.
    type Texture: Clone;
    type Pipeline;
    type AttributeBuffer;
    type Attribute;
    type Indices;
    type Primitive;
    type Onscreen: Draw<Self>;

    fn new_onscreen(&mut self, width: i32, height: i32) -> Result<Self::Onscreen, GraphicsError>;

    fn new_pipeline(&mut self) -> Self::Pipeline;
    fn set_pipeline_blend(&mut self, pipeline: &mut Self::Pipeline, description: &str) -> Result<(), GraphicsError>;
    fn set_pipeline_cull_face_mode(&mut self, pipeline: &mut Self::Pipeline, mode: CullFaceMode);
    fn set_pipeline_depth_state(&mut self, pipeline: &mut Self::Pipeline, state: &DepthState) -> Result<(), GraphicsError>;
    /// Bind `texture` to `layer`; `None` leaves the layer untextured.
    fn set_pipeline_layer_texture(&mut self, pipeline: &mut Self::Pipeline, layer: u32, texture: Option<&Self::Texture>);

    fn new_texture_2d(
        &mut self,
        width:     u32,
        height:    u32,
        format:    PixelFormat,
        rowstride: usize,
        data:      &[u8],
    ) -> Result<Self::Texture, GraphicsError>;

    /// Copy `data` into a new GPU-side attribute buffer.
    fn new_attribute_buffer(&mut self, data: &[u8]) -> Self::AttributeBuffer;
    fn new_attribute(&mut self, buffer: &Self::AttributeBuffer, desc: &AttributeDesc) -> Self::Attribute;
    fn new_primitive(&mut self, mode: VerticesMode, n_vertices: usize, attributes: &[Self::Attribute]) -> Self::Primitive;
    fn new_indices(&mut self, ty: IndicesType, data: &[u8], n_indices: usize) -> Self::Indices;
    /// Byte offset at which subsequent draws start reading `indices`.
    fn set_indices_offset(&mut self, indices: &mut Self::Indices, offset: usize);
    fn set_primitive_indices(&mut self, primitive: &mut Self::Primitive, indices: &Self::Indices, n_indices: usize);
}

/// Callback through which a foreign-window framebuffer asks for events.
pub type ForeignEventMask = Box<dyn Fn(EventMask)>;

/// Framebuffer state and clip operations that do not involve context objects.
pub trait Framebuffer {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn set_resizable(&mut self, resizable: bool);
    /// Render into an existing native window instead of a private one.
    ///
    /// `update_mask` is called whenever the graphics library needs the
    /// window to deliver more event classes (X11 only).
    fn set_foreign_window(&mut self, window: NativeWindow, update_mask: Option<ForeignEventMask>);
    /// Offer a native event; the X11 integration needs to see them all.
    fn filter_event(&mut self, _event: &Event) -> FilterReturn { FilterReturn::Continue }

    fn clear(&mut self, color: Color);
    fn orthographic(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, near: f32, far: f32);
    fn set_depth_write_enabled(&mut self, enabled: bool);

    /// Window-space scissor in framebuffer pixels. Pushed clips intersect.
    fn push_scissor_clip(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn pop_clip(&mut self);

    fn flush(&mut self);
    fn swap_buffers(&mut self);
}

/// A framebuffer that can draw `C`'s primitives.
pub trait Draw<C: Context>: Framebuffer {
    fn draw_primitive(&mut self, primitive: &C::Primitive, pipeline: &C::Pipeline);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_type_follows_element_size() {
        assert_eq!(IndicesType::for_size(2), Some(IndicesType::UnsignedShort));
        assert_eq!(IndicesType::for_size(4), Some(IndicesType::UnsignedInt));
        assert_eq!(IndicesType::for_size(1), None);
        assert_eq!(IndicesType::UnsignedInt.size(), 4);
    }

    #[test]
    fn disabled_depth_state_turns_everything_off() {
        let d = DepthState::disabled();
        assert!(!d.test_enabled && !d.write_enabled);
        assert_eq!(d.range, (0.0, 1.0));
    }
}
