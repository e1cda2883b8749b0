//! Per-windowing-system glue, chosen once at init.

use crate::{
    graphics::{FilterReturn, ForeignEventMask, Framebuffer, WinsysId},
    toolkit::{Event, EventMask, Window, Windowing},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    X11,
    Wayland,
    Win32,
    /// No native integration: a stub window system, nothing bound.
    Headless,
}

impl Backend {
    pub fn detect(windowing: Windowing) -> Self {
        match windowing {
            Windowing::X11     => Backend::X11,
            Windowing::Wayland => Backend::Wayland,
            Windowing::Win32   => Backend::Win32,
            Windowing::Other   => Backend::Headless,
        }
    }

    /// Window-system layer the graphics context is connected with.
    pub fn winsys(self) -> WinsysId {
        match self {
            Backend::X11      => WinsysId::EglXlib,
            Backend::Wayland  => WinsysId::EglWayland,
            Backend::Win32    => WinsysId::Wgl,
            Backend::Headless => WinsysId::Stub,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::X11      => "x11",
            Backend::Wayland  => "wayland",
            Backend::Win32    => "win32",
            Backend::Headless => "headless",
        }
    }

    /// Point `onscreen` at the toolkit window's native surface.
    ///
    /// On X11 the graphics library may widen the window's event mask later;
    /// `mask` is kept in every such update.
    pub fn bind_window<F: Framebuffer, W: Window + 'static>(self, onscreen: &mut F, window: &W, mask: EventMask) {
        let native = window.native_handle();
        let update_mask: Option<ForeignEventMask> = match self {
            Backend::X11 => {
                let window = window.clone();
                Some(Box::new(move |requested: EventMask| {
                    log::debug!("x11: foreign event mask {requested:?}");
                    window.set_events(requested | mask);
                }))
            }
            Backend::Wayland | Backend::Win32 => None,
            Backend::Headless => return,
        };
        log::debug!("{}: binding onscreen to {native:?}", self.name());
        onscreen.set_foreign_window(native, update_mask);
    }

    /// Give the graphics library first look at an event. Only X11 needs it.
    pub fn preprocess_event<F: Framebuffer>(self, onscreen: &mut F, event: &Event) -> FilterReturn {
        match self {
            Backend::X11 => onscreen.filter_event(event),
            _            => FilterReturn::Continue,
        }
    }
}
