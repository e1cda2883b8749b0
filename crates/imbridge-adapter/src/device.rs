//! Device objects (GUI pipeline and font texture) and the texture registry
//! draw commands resolve their ids through.

use std::collections::HashMap;

use ahash::RandomState;
use imbridge_core::{Context as GuiContext, TextureId};

use crate::{
    error::{AdapterError, PipelineStage, Result},
    graphics::{Context, CullFaceMode, DepthState, Framebuffer, PixelFormat},
    toolkit::Window,
    Adapter,
};

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Never created.
    Uninitialized,
    Ready,
    /// Released; the next frame setup recreates them.
    Invalidated,
}

pub(crate) struct DeviceObjects<C: Context> {
    pub(crate) pipeline:     C::Pipeline,
    pub(crate) font_texture: C::Texture,
}

// ─── Texture registry ────────────────────────────────────────────────────────

/// Fixed-seed ahash map: no TLS, no runtime RNG.
type TextureMap<T> = HashMap<TextureId, T, RandomState>;

/// Maps GUI texture ids to graphics textures.
pub(crate) struct TextureRegistry<T> {
    textures: TextureMap<T>,
    next_id:  usize,
}

impl<T> TextureRegistry<T> {
    pub(crate) fn new() -> Self {
        let hasher = RandomState::with_seeds(0x1b2d_3c4e, 0x5f60_7182, 0x93a4_b5c6, 0xd7e8_f90a);
        Self { textures: HashMap::with_hasher(hasher), next_id: TextureId::FIRST_USER.0 }
    }

    /// Store under a fresh user id.
    pub(crate) fn register(&mut self, texture: T) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(id, texture);
        id
    }

    pub(crate) fn insert(&mut self, id: TextureId, texture: T) -> Option<T> { self.textures.insert(id, texture) }
    pub(crate) fn remove(&mut self, id: TextureId) -> Option<T> { self.textures.remove(&id) }
    pub(crate) fn get(&self, id: TextureId) -> Option<&T> { self.textures.get(&id) }
    pub(crate) fn len(&self) -> usize { self.textures.len() }
    pub(crate) fn clear(&mut self) { self.textures.clear(); }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

impl<W: Window, C: Context> Adapter<W, C> {
    pub fn device_state(&self) -> DeviceState {
        match (&self.device, self.device_created) {
            (Some(_), _)  => DeviceState::Ready,
            (None, true)  => DeviceState::Invalidated,
            (None, false) => DeviceState::Uninitialized,
        }
    }

    /// Build the GUI pipeline and upload the font atlas.
    ///
    /// Replaces any existing device objects. On error nothing is kept and
    /// the state is unchanged.
    pub fn create_device_objects(&mut self, ctx: &mut GuiContext) -> Result<()> {
        let mut pipeline = self.context.new_pipeline();

        self.context
            .set_pipeline_blend(&mut pipeline, &self.config.blend)
            .map_err(|source| AdapterError::Pipeline { stage: PipelineStage::Blend, source })
            .inspect_err(|err| log::warn!("create_device_objects: {err}"))?;

        self.context.set_pipeline_cull_face_mode(&mut pipeline, CullFaceMode::None);

        self.context
            .set_pipeline_depth_state(&mut pipeline, &DepthState::disabled())
            .map_err(|source| AdapterError::Pipeline { stage: PipelineStage::Depth, source })
            .inspect_err(|err| log::warn!("create_device_objects: {err}"))?;

        let font_texture = self.create_fonts_texture(ctx)?;
        self.framebuffer.set_depth_write_enabled(false);

        self.device = Some(DeviceObjects { pipeline, font_texture });
        self.device_created = true;
        log::debug!("create_device_objects: ready ({} textures registered)", self.textures.len());
        Ok(())
    }

    fn create_fonts_texture(&mut self, ctx: &mut GuiContext) -> Result<C::Texture> {
        let (pixels, width, height) = ctx.fonts_mut().tex_data_as_rgba32();
        let rowstride = width as usize * PixelFormat::Rgba8888.bytes_per_pixel();
        let texture = self.context
            .new_texture_2d(width, height, PixelFormat::Rgba8888, rowstride, pixels)
            .map_err(AdapterError::FontTexture)?;

        self.textures.insert(TextureId::FONT, texture.clone());
        ctx.fonts_mut().set_tex_id(Some(TextureId::FONT));
        log::debug!("create_fonts_texture: uploaded {width}x{height} atlas");
        Ok(texture)
    }

    /// Release the pipeline and font texture. User textures stay registered.
    pub fn invalidate_device_objects(&mut self, ctx: &mut GuiContext) {
        if self.device.take().is_some() {
            log::debug!("invalidate_device_objects: released");
        }
        self.textures.remove(TextureId::FONT);
        ctx.fonts_mut().set_tex_id(None);
    }

    // ── User textures ─────────────────────────────────────────────────────────

    /// Make `texture` drawable through the returned id.
    pub fn register_texture(&mut self, texture: C::Texture) -> TextureId {
        self.textures.register(texture)
    }

    /// Forget a registered texture and hand it back.
    pub fn unregister_texture(&mut self, id: TextureId) -> Option<C::Texture> {
        if id == TextureId::FONT {
            log::warn!("unregister_texture: the font texture is owned by the adapter");
            return None;
        }
        self.textures.remove(id)
    }

    pub(crate) fn release_textures(&mut self) {
        self.textures.clear();
    }
}
