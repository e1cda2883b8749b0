use crate::{backend::Backend, toolkit::EventMask};

/// Straight-alpha "over" blending: colour weighted by source alpha,
/// alpha accumulated.
pub const DEFAULT_BLEND: &str = "RGB = ADD(SRC_COLOR*(SRC_COLOR[A]), DST_COLOR*(1-SRC_COLOR[A])) \
                                 A = ADD(SRC_COLOR[A], DST_COLOR*(1-SRC_COLOR[A]))";

/// Frames of paint requests scheduled after an input event.
pub const DEFAULT_REDRAW_FRAMES: u32 = 2;

/// Delta time reported on the very first frame.
pub const DEFAULT_DELTA_TIME: f32 = 1.0 / 60.0;

/// Tunables for an [`Adapter`](crate::Adapter). `Default` matches the
/// behaviour most toolkits expect.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// Redraw frames scheduled by each handled event.
    pub redraw_frames:       u32,
    /// Delta time for the first frame.
    pub fallback_delta_time: f32,
    /// Blend description for the GUI pipeline.
    pub blend:               String,
    /// Mark the whole window opaque and keep the hint in sync on resize.
    pub opaque_region:       bool,
    /// Events requested from the window at init.
    pub event_mask:          EventMask,
    /// Install the window event hook in [`Adapter::new_shared`](crate::Adapter::new_shared).
    pub handle_events:       bool,
    /// Force a backend instead of detecting it from the window.
    pub backend:             Option<Backend>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            redraw_frames:       DEFAULT_REDRAW_FRAMES,
            fallback_delta_time: DEFAULT_DELTA_TIME,
            blend:               DEFAULT_BLEND.to_owned(),
            opaque_region:       true,
            event_mask:          EventMask::ADAPTER,
            handle_events:       true,
            backend:             None,
        }
    }
}

impl AdapterConfig {
    pub fn with_redraw_frames(mut self, frames: u32) -> Self { self.redraw_frames = frames; self }
    pub fn with_fallback_delta_time(mut self, dt: f32) -> Self { self.fallback_delta_time = dt; self }
    pub fn with_blend(mut self, blend: impl Into<String>) -> Self { self.blend = blend.into(); self }
    pub fn with_opaque_region(mut self, enabled: bool) -> Self { self.opaque_region = enabled; self }
    pub fn with_event_mask(mut self, mask: EventMask) -> Self { self.event_mask = mask; self }
    pub fn with_handle_events(mut self, enabled: bool) -> Self { self.handle_events = enabled; self }
    pub fn with_backend(mut self, backend: Backend) -> Self { self.backend = Some(backend); self }
}
