//! A recording graphics context.
//!
//! Every operation is appended to a shared [`Call`] log and every object
//! carries a live-count token, so tests can check both what was issued and
//! that everything created was released. Draws are rasterised in software
//! into the onscreen's pixel buffer.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use imbridge_adapter::{
    graphics::{
        AttributeDesc, Context, CullFaceMode, DepthState, Draw, FilterReturn, ForeignEventMask, Framebuffer,
        GraphicsError, IndicesType, PixelFormat, Renderer, VerticesMode, WinsysId,
    },
    toolkit::{Event, EventMask, NativeWindow},
};
use imbridge_core::Color;

use crate::raster::{self, PixelRect, Projection, Target};

// ─── Call log ────────────────────────────────────────────────────────────────

/// One recorded graphics operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect(WinsysId),
    NewOnscreen { width: i32, height: i32 },
    NewPipeline,
    SetBlend(String),
    SetCullFaceMode(CullFaceMode),
    SetDepthState(DepthState),
    SetLayerTexture { layer: u32, texture: Option<u64> },
    NewTexture { serial: u64, width: u32, height: u32, format: PixelFormat },
    NewAttributeBuffer { len: usize },
    NewAttribute { name: &'static str },
    NewPrimitive { n_vertices: usize },
    NewIndices { ty: IndicesType, n_indices: usize },
    SetIndicesOffset(usize),
    SetPrimitiveIndices { n_indices: usize },

    SetResizable(bool),
    SetForeignWindow(NativeWindow),
    FilterEvent,
    Clear(Color),
    Orthographic { x1: f32, y1: f32, x2: f32, y2: f32, near: f32, far: f32 },
    DepthWrite(bool),
    PushScissor { x: i32, y: i32, width: i32, height: i32 },
    PopClip,
    /// `index_offset` is in bytes.
    Draw { n_indices: usize, index_offset: usize, texture: Option<u64> },
    Flush,
    SwapBuffers,
}

impl Call {
    /// True for operations that touch the framebuffer.
    pub fn is_framebuffer_op(&self) -> bool {
        matches!(
            self,
            Call::Clear(_)
                | Call::Orthographic { .. }
                | Call::DepthWrite(_)
                | Call::PushScissor { .. }
                | Call::PopClip
                | Call::Draw { .. }
                | Call::Flush
                | Call::SwapBuffers
        )
    }
}

// ─── Live object accounting ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind { Texture, Pipeline, AttributeBuffer, Attribute, Indices, Primitive }

impl ObjectKind {
    pub const ALL: [ObjectKind; 6] = [
        ObjectKind::Texture,
        ObjectKind::Pipeline,
        ObjectKind::AttributeBuffer,
        ObjectKind::Attribute,
        ObjectKind::Indices,
        ObjectKind::Primitive,
    ];
}

#[derive(Default)]
struct Shared {
    calls:       RefCell<Vec<Call>>,
    live:        [Cell<usize>; 6],
    created:     [Cell<usize>; 6],
    next_serial: Cell<u64>,
    winsys:      Cell<Option<WinsysId>>,

    reject_blend:    Cell<bool>,
    reject_depth:    Cell<bool>,
    reject_textures: Cell<bool>,
    consume_events:  Cell<bool>,
}

impl Shared {
    fn record(&self, call: Call) {
        log::trace!("headless: {call:?}");
        self.calls.borrow_mut().push(call);
    }

    fn serial(&self) -> u64 {
        let s = self.next_serial.get() + 1;
        self.next_serial.set(s);
        s
    }
}

/// Keeps a live count up while the owning object exists.
struct LiveToken {
    shared: Rc<Shared>,
    kind:   ObjectKind,
}

impl LiveToken {
    fn new(shared: &Rc<Shared>, kind: ObjectKind) -> Self {
        let i = kind as usize;
        shared.live[i].set(shared.live[i].get() + 1);
        shared.created[i].set(shared.created[i].get() + 1);
        Self { shared: shared.clone(), kind }
    }
}

impl Drop for LiveToken {
    fn drop(&mut self) {
        let cell = &self.shared.live[self.kind as usize];
        cell.set(cell.get().saturating_sub(1));
    }
}

impl fmt::Debug for LiveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "LiveToken({:?})", self.kind) }
}

/// Read-side view of a headless graphics stack, valid after the context
/// has been handed to an adapter.
#[derive(Clone)]
pub struct GraphicsProbe {
    shared: Rc<Shared>,
}

impl fmt::Debug for GraphicsProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsProbe")
            .field("calls", &self.shared.calls.borrow().len())
            .field("live", &self.total_live())
            .finish()
    }
}

impl GraphicsProbe {
    pub fn calls(&self) -> Vec<Call> { self.shared.calls.borrow().clone() }
    pub fn take_calls(&self) -> Vec<Call> { std::mem::take(&mut *self.shared.calls.borrow_mut()) }
    pub fn clear_calls(&self) { self.shared.calls.borrow_mut().clear(); }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.shared.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn draw_count(&self) -> usize { self.count(|c| matches!(c, Call::Draw { .. })) }

    pub fn live(&self, kind: ObjectKind) -> usize { self.shared.live[kind as usize].get() }
    pub fn created(&self, kind: ObjectKind) -> usize { self.shared.created[kind as usize].get() }
    pub fn total_live(&self) -> usize { ObjectKind::ALL.iter().map(|&k| self.live(k)).sum() }

    pub fn winsys(&self) -> Option<WinsysId> { self.shared.winsys.get() }

    // ── Failure injection ─────────────────────────────────────────────────────

    pub fn set_reject_blend(&self, reject: bool)    { self.shared.reject_blend.set(reject); }
    pub fn set_reject_depth(&self, reject: bool)    { self.shared.reject_depth.set(reject); }
    pub fn set_reject_textures(&self, reject: bool) { self.shared.reject_textures.set(reject); }
    /// Make the onscreen consume every event offered to it.
    pub fn set_consume_events(&self, consume: bool) { self.shared.consume_events.set(consume); }
}

// ─── Objects ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct TextureData {
    serial: u64,
    width:  u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
    _live:  LiveToken,
}

/// Shared texture handle. Clones refer to the same texture.
#[derive(Debug, Clone)]
pub struct HeadlessTexture(Rc<TextureData>);

impl HeadlessTexture {
    pub fn serial(&self) -> u64 { self.0.serial }
    pub fn size(&self) -> (u32, u32) { (self.0.width, self.0.height) }
    pub fn format(&self) -> PixelFormat { self.0.format }

    /// Nearest-neighbour RGBA sample, clamped to the edges.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let t = &self.0;
        if t.width == 0 || t.height == 0 { return [1.0; 4]; }
        let x = ((u * t.width as f32) as i64).clamp(0, t.width as i64 - 1) as usize;
        let y = ((v * t.height as f32) as i64).clamp(0, t.height as i64 - 1) as usize;
        let bpp = t.format.bytes_per_pixel();
        let at = (y * t.width as usize + x) * bpp;
        match t.format {
            PixelFormat::Rgba8888 => [0, 1, 2, 3].map(|c| t.pixels[at + c] as f32 / 255.0),
            PixelFormat::A8       => [1.0, 1.0, 1.0, t.pixels[at] as f32 / 255.0],
        }
    }
}

/// How a pipeline combines source and destination colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Colour weighted by source alpha.
    Straight,
    /// Colour already multiplied by alpha.
    Premultiplied,
}

#[derive(Debug)]
pub struct HeadlessPipeline {
    blend:      Option<String>,
    blend_mode: BlendMode,
    cull:       CullFaceMode,
    depth:      DepthState,
    layer0:     Option<HeadlessTexture>,
    _live:      LiveToken,
}

impl HeadlessPipeline {
    pub fn blend(&self)          -> Option<&str>             { self.blend.as_deref() }
    pub fn blend_mode(&self)     -> BlendMode                { self.blend_mode }
    pub fn cull_face_mode(&self) -> CullFaceMode             { self.cull }
    pub fn depth_state(&self)    -> DepthState               { self.depth }
    pub fn layer_texture(&self)  -> Option<&HeadlessTexture> { self.layer0.as_ref() }
}

#[derive(Debug)]
pub struct HeadlessAttributeBuffer {
    data:  Rc<[u8]>,
    _live: LiveToken,
}

#[derive(Debug)]
pub struct HeadlessAttribute {
    data:  Rc<[u8]>,
    desc:  AttributeDesc,
    _live: LiveToken,
}

#[derive(Debug)]
pub struct HeadlessIndices {
    ty:     IndicesType,
    data:   Rc<[u8]>,
    count:  usize,
    offset: usize,
    _live:  LiveToken,
}

impl HeadlessIndices {
    pub fn len(&self) -> usize { self.count }
    pub fn is_empty(&self) -> bool { self.count == 0 }
}

/// The index range a primitive draws with.
#[derive(Debug, Clone)]
pub struct IndexRange {
    pub ty:     IndicesType,
    pub data:   Rc<[u8]>,
    /// Byte offset of the first index.
    pub offset: usize,
    pub count:  usize,
}

#[derive(Debug)]
pub struct HeadlessPrimitive {
    mode:       VerticesMode,
    n_vertices: usize,
    attributes: Vec<(AttributeDesc, Rc<[u8]>)>,
    indices:    Option<IndexRange>,
    _live:      LiveToken,
}

impl HeadlessPrimitive {
    pub fn mode(&self) -> VerticesMode { self.mode }
    pub fn n_vertices(&self) -> usize { self.n_vertices }
    pub fn attributes(&self) -> &[(AttributeDesc, Rc<[u8]>)] { &self.attributes }
    pub fn indices(&self) -> Option<&IndexRange> { self.indices.as_ref() }
}

// ─── Blend descriptions ──────────────────────────────────────────────────────

/// Validate a blend description (`CHANNELS = FUNC(args)` statements) and
/// work out which mode it describes.
pub fn parse_blend(description: &str) -> Result<BlendMode, String> {
    let compact: String = description.chars().filter(|c| !c.is_whitespace()).collect();
    let mut rest = compact.as_str();
    let mut mode = BlendMode::Premultiplied;
    let mut statements = 0;

    while !rest.is_empty() {
        let (channels, after) = rest.split_once('=').ok_or_else(|| format!("expected '=' in {rest:?}"))?;
        if !matches!(channels, "RGB" | "A" | "RGBA") {
            return Err(format!("unknown channel mask {channels:?}"));
        }
        let open = after.find('(').ok_or_else(|| format!("expected a function after {channels}="))?;
        let func = &after[..open];
        if func != "ADD" {
            return Err(format!("unsupported blend function {func:?}"));
        }

        let mut depth = 0usize;
        let mut close = None;
        for (i, ch) in after[open..].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 { close = Some(open + i); break; }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| format!("unbalanced parentheses in {after:?}"))?;
        let args = &after[open + 1..close];
        if channels != "A" && args.starts_with("SRC_COLOR*(SRC_COLOR[A])") {
            mode = BlendMode::Straight;
        }

        rest = &after[close + 1..];
        statements += 1;
    }

    if statements == 0 {
        return Err("empty blend description".to_owned());
    }
    Ok(mode)
}

// ─── Renderer / Context ──────────────────────────────────────────────────────

/// Connects to the stub window system.
pub struct HeadlessRenderer {
    shared:  Rc<Shared>,
    failure: Option<String>,
}

impl Default for HeadlessRenderer {
    fn default() -> Self { Self::new() }
}

impl HeadlessRenderer {
    pub fn new() -> Self { Self { shared: Rc::new(Shared::default()), failure: None } }

    /// A renderer whose connection attempt fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()), ..Self::new() }
    }

    pub fn probe(&self) -> GraphicsProbe { GraphicsProbe { shared: self.shared.clone() } }
}

impl Renderer for HeadlessRenderer {
    type Context = HeadlessContext;

    fn connect(self, winsys: WinsysId) -> Result<HeadlessContext, GraphicsError> {
        self.shared.record(Call::Connect(winsys));
        if let Some(reason) = self.failure {
            return Err(GraphicsError::Context(reason));
        }
        self.shared.winsys.set(Some(winsys));
        log::debug!("HeadlessRenderer: connected with {winsys:?}");
        Ok(HeadlessContext { shared: self.shared })
    }
}

pub struct HeadlessContext {
    shared: Rc<Shared>,
}

impl fmt::Debug for HeadlessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessContext").field("winsys", &self.shared.winsys.get()).finish()
    }
}

impl HeadlessContext {
    /// A context that was never connected to a window system, for hosts
    /// that own their framebuffer.
    pub fn standalone() -> Self {
        let shared = Rc::new(Shared::default());
        shared.winsys.set(Some(WinsysId::Stub));
        Self { shared }
    }

    pub fn probe(&self) -> GraphicsProbe { GraphicsProbe { shared: self.shared.clone() } }
}

impl Context for HeadlessContext {
    type Texture         = HeadlessTexture;
    type Pipeline        = HeadlessPipeline;
    type AttributeBuffer = HeadlessAttributeBuffer;
    type Attribute       = HeadlessAttribute;
    type Indices         = HeadlessIndices;
    type Primitive       = HeadlessPrimitive;
    type Onscreen        = HeadlessOnscreen;

    fn new_onscreen(&mut self, width: i32, height: i32) -> Result<HeadlessOnscreen, GraphicsError> {
        self.shared.record(Call::NewOnscreen { width, height });
        if width <= 0 || height <= 0 {
            return Err(GraphicsError::Onscreen(format!("invalid size {width}x{height}")));
        }
        HeadlessOnscreen::new(self.shared.clone(), width, height)
    }

    fn new_pipeline(&mut self) -> HeadlessPipeline {
        self.shared.record(Call::NewPipeline);
        HeadlessPipeline {
            blend:      None,
            blend_mode: BlendMode::Premultiplied,
            cull:       CullFaceMode::None,
            depth:      DepthState::default(),
            layer0:     None,
            _live:      LiveToken::new(&self.shared, ObjectKind::Pipeline),
        }
    }

    fn set_pipeline_blend(&mut self, pipeline: &mut HeadlessPipeline, description: &str) -> Result<(), GraphicsError> {
        self.shared.record(Call::SetBlend(description.to_owned()));
        if self.shared.reject_blend.get() {
            return Err(GraphicsError::Blend("blending disabled by the driver".to_owned()));
        }
        pipeline.blend_mode = parse_blend(description).map_err(GraphicsError::Blend)?;
        pipeline.blend = Some(description.to_owned());
        Ok(())
    }

    fn set_pipeline_cull_face_mode(&mut self, pipeline: &mut HeadlessPipeline, mode: CullFaceMode) {
        self.shared.record(Call::SetCullFaceMode(mode));
        pipeline.cull = mode;
    }

    fn set_pipeline_depth_state(&mut self, pipeline: &mut HeadlessPipeline, state: &DepthState) -> Result<(), GraphicsError> {
        self.shared.record(Call::SetDepthState(*state));
        let (near, far) = state.range;
        if self.shared.reject_depth.get() || !(0.0..=1.0).contains(&near) || !(0.0..=1.0).contains(&far) {
            return Err(GraphicsError::DepthState(format!("unsupported depth state {state:?}")));
        }
        pipeline.depth = *state;
        Ok(())
    }

    fn set_pipeline_layer_texture(&mut self, pipeline: &mut HeadlessPipeline, layer: u32, texture: Option<&HeadlessTexture>) {
        self.shared.record(Call::SetLayerTexture { layer, texture: texture.map(HeadlessTexture::serial) });
        if layer == 0 {
            pipeline.layer0 = texture.cloned();
        }
    }

    fn new_texture_2d(
        &mut self,
        width:     u32,
        height:    u32,
        format:    PixelFormat,
        rowstride: usize,
        data:      &[u8],
    ) -> Result<HeadlessTexture, GraphicsError> {
        if self.shared.reject_textures.get() {
            return Err(GraphicsError::Texture("out of texture memory".to_owned()));
        }
        let row = width as usize * format.bytes_per_pixel();
        if rowstride < row || data.len() < rowstride * height as usize {
            return Err(GraphicsError::Texture(format!(
                "{width}x{height} {format:?} needs {} bytes at rowstride {rowstride}, got {}",
                rowstride * height as usize,
                data.len(),
            )));
        }
        let pixels = data.chunks(rowstride).take(height as usize).flat_map(|r| &r[..row]).copied().collect();

        let serial = self.shared.serial();
        self.shared.record(Call::NewTexture { serial, width, height, format });
        Ok(HeadlessTexture(Rc::new(TextureData {
            serial,
            width,
            height,
            format,
            pixels,
            _live: LiveToken::new(&self.shared, ObjectKind::Texture),
        })))
    }

    fn new_attribute_buffer(&mut self, data: &[u8]) -> HeadlessAttributeBuffer {
        self.shared.record(Call::NewAttributeBuffer { len: data.len() });
        HeadlessAttributeBuffer { data: Rc::from(data), _live: LiveToken::new(&self.shared, ObjectKind::AttributeBuffer) }
    }

    fn new_attribute(&mut self, buffer: &HeadlessAttributeBuffer, desc: &AttributeDesc) -> HeadlessAttribute {
        self.shared.record(Call::NewAttribute { name: desc.name });
        HeadlessAttribute {
            data:  buffer.data.clone(),
            desc:  *desc,
            _live: LiveToken::new(&self.shared, ObjectKind::Attribute),
        }
    }

    fn new_primitive(&mut self, mode: VerticesMode, n_vertices: usize, attributes: &[HeadlessAttribute]) -> HeadlessPrimitive {
        self.shared.record(Call::NewPrimitive { n_vertices });
        HeadlessPrimitive {
            mode,
            n_vertices,
            attributes: attributes.iter().map(|a| (a.desc, a.data.clone())).collect(),
            indices:    None,
            _live:      LiveToken::new(&self.shared, ObjectKind::Primitive),
        }
    }

    fn new_indices(&mut self, ty: IndicesType, data: &[u8], n_indices: usize) -> HeadlessIndices {
        self.shared.record(Call::NewIndices { ty, n_indices });
        HeadlessIndices {
            ty,
            data:   Rc::from(data),
            count:  n_indices,
            offset: 0,
            _live:  LiveToken::new(&self.shared, ObjectKind::Indices),
        }
    }

    fn set_indices_offset(&mut self, indices: &mut HeadlessIndices, offset: usize) {
        self.shared.record(Call::SetIndicesOffset(offset));
        indices.offset = offset;
    }

    fn set_primitive_indices(&mut self, primitive: &mut HeadlessPrimitive, indices: &HeadlessIndices, n_indices: usize) {
        self.shared.record(Call::SetPrimitiveIndices { n_indices });
        primitive.indices = Some(IndexRange {
            ty:     indices.ty,
            data:   indices.data.clone(),
            offset: indices.offset,
            count:  n_indices,
        });
    }
}

// ─── Onscreen ────────────────────────────────────────────────────────────────

/// Software framebuffer: an RGBA pixel buffer plus clip and projection state.
pub struct HeadlessOnscreen {
    shared:      Rc<Shared>,
    width:       i32,
    height:      i32,
    pixels:      Vec<u8>,
    resizable:   bool,
    foreign:     Option<NativeWindow>,
    update_mask: Option<ForeignEventMask>,
    projection:  Option<Projection>,
    clip_stack:  Vec<PixelRect>,
    depth_write: bool,
    swaps:       usize,
}

impl fmt::Debug for HeadlessOnscreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessOnscreen")
            .field("size", &(self.width, self.height))
            .field("resizable", &self.resizable)
            .field("foreign", &self.foreign)
            .field("clip_depth", &self.clip_stack.len())
            .field("swaps", &self.swaps)
            .finish()
    }
}

/// RGBA byte count for a `width` x `height` buffer, if it can be allocated.
fn buffer_len(width: i32, height: i32) -> Option<usize> {
    let len = usize::try_from(width).ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(4)?;
    (len <= isize::MAX as usize).then_some(len)
}

impl HeadlessOnscreen {
    fn new(shared: Rc<Shared>, width: i32, height: i32) -> Result<Self, GraphicsError> {
        let len = buffer_len(width, height)
            .ok_or_else(|| GraphicsError::Onscreen(format!("{width}x{height} exceeds addressable memory")))?;
        Ok(Self {
            shared,
            width,
            height,
            pixels:      vec![0; len],
            resizable:   false,
            foreign:     None,
            update_mask: None,
            projection:  None,
            clip_stack:  Vec::new(),
            depth_write: true,
            swaps:       0,
        })
    }

    /// A standalone onscreen for `context`, as a host-owned surface would be.
    pub fn for_context(context: &HeadlessContext, width: i32, height: i32) -> Result<Self, GraphicsError> {
        Self::new(context.shared.clone(), width.max(1), height.max(1))
    }

    /// Follow a window resize. Ignored unless the onscreen is resizable.
    pub fn resize(&mut self, width: i32, height: i32) {
        if !self.resizable || (width, height) == (self.width, self.height) || width <= 0 || height <= 0 {
            return;
        }
        let Some(len) = buffer_len(width, height) else {
            log::warn!("HeadlessOnscreen: resize to {width}x{height} ignored, buffer too large");
            return;
        };
        log::debug!("HeadlessOnscreen: resize {}x{} -> {width}x{height}", self.width, self.height);
        self.width  = width;
        self.height = height;
        self.pixels = vec![0; len];
    }

    pub fn pixels(&self) -> &[u8] { &self.pixels }

    /// Ask the bound foreign window for more event classes, the way an X11
    /// integration does. False when no window asked to be told.
    pub fn request_event_mask(&self, mask: EventMask) -> bool {
        match &self.update_mask {
            Some(update) => { update(mask); true }
            None         => false,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height { return None; }
        let i = ((y * self.width + x) * 4) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    pub fn is_resizable(&self)        -> bool                 { self.resizable }
    pub fn foreign_window(&self)      -> Option<NativeWindow> { self.foreign }
    pub fn depth_write_enabled(&self) -> bool                 { self.depth_write }
    pub fn clip_depth(&self)          -> usize                { self.clip_stack.len() }
    pub fn swap_count(&self)          -> usize                { self.swaps }
}

impl Framebuffer for HeadlessOnscreen {
    fn width(&self)  -> i32 { self.width }
    fn height(&self) -> i32 { self.height }

    fn set_resizable(&mut self, resizable: bool) {
        self.shared.record(Call::SetResizable(resizable));
        self.resizable = resizable;
    }

    fn set_foreign_window(&mut self, window: NativeWindow, update_mask: Option<ForeignEventMask>) {
        self.shared.record(Call::SetForeignWindow(window));
        self.foreign = Some(window);
        self.update_mask = update_mask;
    }

    fn filter_event(&mut self, _event: &Event) -> FilterReturn {
        self.shared.record(Call::FilterEvent);
        if self.shared.consume_events.get() { FilterReturn::Remove } else { FilterReturn::Continue }
    }

    fn clear(&mut self, color: Color) {
        self.shared.record(Call::Clear(color));
        let rgba = [color.r, color.g, color.b, color.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    fn orthographic(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, near: f32, far: f32) {
        self.shared.record(Call::Orthographic { x1, y1, x2, y2, near, far });
        self.projection = Some(Projection { x1, y1, x2, y2 });
    }

    fn set_depth_write_enabled(&mut self, enabled: bool) {
        self.shared.record(Call::DepthWrite(enabled));
        self.depth_write = enabled;
    }

    fn push_scissor_clip(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.shared.record(Call::PushScissor { x, y, width, height });
        let rect = PixelRect::from_xywh(x, y, width, height);
        let clipped = match self.clip_stack.last() {
            Some(top) => top.intersect(rect),
            None      => rect,
        };
        self.clip_stack.push(clipped);
    }

    fn pop_clip(&mut self) {
        self.shared.record(Call::PopClip);
        if self.clip_stack.pop().is_none() {
            log::warn!("HeadlessOnscreen: pop_clip on an empty clip stack");
        }
    }

    fn flush(&mut self) { self.shared.record(Call::Flush); }

    fn swap_buffers(&mut self) {
        self.shared.record(Call::SwapBuffers);
        self.swaps += 1;
    }
}

impl Draw<HeadlessContext> for HeadlessOnscreen {
    fn draw_primitive(&mut self, primitive: &HeadlessPrimitive, pipeline: &HeadlessPipeline) {
        let (n_indices, index_offset) = primitive.indices().map_or((primitive.n_vertices(), 0), |r| (r.count, r.offset));
        self.shared.record(Call::Draw {
            n_indices,
            index_offset,
            texture: pipeline.layer_texture().map(HeadlessTexture::serial),
        });

        let full = PixelRect { x0: 0, y0: 0, x1: self.width, y1: self.height };
        let clip = self.clip_stack.last().copied().unwrap_or(full);
        let projection = self.projection.unwrap_or(Projection {
            x1: 0.0,
            y1: 0.0,
            x2: self.width as f32,
            y2: self.height as f32,
        });
        let mut target = Target { pixels: &mut self.pixels, width: self.width, height: self.height };
        let written = raster::draw_triangles(&mut target, clip, projection, primitive, pipeline);
        log::trace!("HeadlessOnscreen: draw wrote {written} pixels");
    }
}
