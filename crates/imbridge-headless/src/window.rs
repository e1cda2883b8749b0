//! A scripted toolkit window: geometry, focus and pointer state are set by
//! the host, and everything the adapter asks of the window is recorded.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use imbridge_adapter::toolkit::{
    CursorShape, Event, EventHandler, EventMask, ModifierType, NativeWindow, RegionRect, Window, Windowing,
};

struct WindowInner {
    geometry:       Cell<(i32, i32, i32, i32)>,
    scale:          Cell<i32>,
    focused:        Cell<bool>,
    pointer:        Cell<ModifierType>,
    windowing:      Cell<Windowing>,
    native:         Cell<bool>,
    events:         Cell<EventMask>,
    cursor:         Cell<Option<CursorShape>>,
    opaque_region:  Cell<Option<RegionRect>>,
    paint_requests: Cell<usize>,
    clipboard:      RefCell<Option<String>>,
    handler:        RefCell<Option<EventHandler>>,
    handler_gen:    Cell<u64>,
}

/// Reference-counted headless window. Clones share state.
#[derive(Clone)]
pub struct HeadlessWindow {
    inner: Rc<WindowInner>,
}

impl fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWindow")
            .field("geometry", &self.inner.geometry.get())
            .field("scale", &self.inner.scale.get())
            .field("focused", &self.inner.focused.get())
            .field("windowing", &self.inner.windowing.get())
            .finish_non_exhaustive()
    }
}

impl HeadlessWindow {
    /// A focused, scale-1 window at the origin.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            inner: Rc::new(WindowInner {
                geometry:       Cell::new((0, 0, width, height)),
                scale:          Cell::new(1),
                focused:        Cell::new(true),
                pointer:        Cell::new(ModifierType::empty()),
                windowing:      Cell::new(Windowing::Other),
                native:         Cell::new(false),
                events:         Cell::new(EventMask::empty()),
                cursor:         Cell::new(None),
                opaque_region:  Cell::new(None),
                paint_requests: Cell::new(0),
                clipboard:      RefCell::new(None),
                handler:        RefCell::new(None),
                handler_gen:    Cell::new(0),
            }),
        }
    }

    /// Pretend to live on `windowing`.
    pub fn with_windowing(self, windowing: Windowing) -> Self {
        self.inner.windowing.set(windowing);
        self
    }

    // ── Host-side controls ────────────────────────────────────────────────────

    pub fn resize(&self, width: i32, height: i32) {
        let (x, y, _, _) = self.inner.geometry.get();
        self.inner.geometry.set((x, y, width, height));
    }

    pub fn set_scale_factor(&self, scale: i32)           { self.inner.scale.set(scale); }
    pub fn set_focused(&self, focused: bool)             { self.inner.focused.set(focused); }
    pub fn set_pointer_state(&self, state: ModifierType) { self.inner.pointer.set(state); }

    /// Deliver `event` to the installed handler. Returns `false` when no
    /// handler is installed.
    pub fn dispatch(&self, event: &Event) -> bool {
        // Taken out for the call so the handler may touch the window.
        let Some(mut handler) = self.inner.handler.borrow_mut().take() else { return false };
        let generation = self.inner.handler_gen.get();
        handler(event);
        if self.inner.handler_gen.get() == generation {
            *self.inner.handler.borrow_mut() = Some(handler);
        }
        true
    }

    // ── Observations ─────────────────────────────────────────────────────────

    pub fn paint_requests(&self) -> usize { self.inner.paint_requests.get() }

    /// Paint requests since the last call.
    pub fn take_paint_requests(&self) -> usize { self.inner.paint_requests.replace(0) }

    pub fn cursor(&self)            -> Option<CursorShape> { self.inner.cursor.get() }
    pub fn opaque_region(&self)     -> Option<RegionRect>  { self.inner.opaque_region.get() }
    pub fn is_native(&self)         -> bool                { self.inner.native.get() }
    pub fn has_event_handler(&self) -> bool {
        self.inner.handler.try_borrow().map(|h| h.is_some()).unwrap_or(true)
    }
}

impl Window for HeadlessWindow {
    fn geometry(&self) -> (i32, i32, i32, i32) { self.inner.geometry.get() }
    fn scale_factor(&self) -> i32 { self.inner.scale.get() }
    fn is_focused(&self) -> bool { self.inner.focused.get() }
    fn pointer_state(&self) -> ModifierType { self.inner.pointer.get() }

    fn set_cursor(&self, cursor: CursorShape) {
        if self.inner.cursor.replace(Some(cursor)) != Some(cursor) {
            log::trace!("HeadlessWindow: cursor -> {}", cursor.name());
        }
    }

    fn set_opaque_region(&self, region: Option<RegionRect>) { self.inner.opaque_region.set(region); }
    fn set_events(&self, mask: EventMask) { self.inner.events.set(mask); }
    fn events(&self) -> EventMask { self.inner.events.get() }
    fn ensure_native(&self) { self.inner.native.set(true); }

    fn windowing(&self) -> Windowing { self.inner.windowing.get() }

    fn native_handle(&self) -> NativeWindow {
        match self.inner.windowing.get() {
            Windowing::X11     => NativeWindow::Xid(0x0040_0001),
            Windowing::Wayland => NativeWindow::WaylandSurface(1),
            Windowing::Win32   => NativeWindow::Win32(1),
            Windowing::Other   => NativeWindow::None,
        }
    }

    fn request_paint(&self) {
        self.inner.paint_requests.set(self.inner.paint_requests.get() + 1);
    }

    fn set_event_handler(&self, handler: Option<EventHandler>) {
        self.inner.handler_gen.set(self.inner.handler_gen.get() + 1);
        *self.inner.handler.borrow_mut() = handler;
    }

    fn clipboard_text(&self) -> Option<String> { self.inner.clipboard.borrow().clone() }

    fn set_clipboard_text(&self, text: &str) {
        *self.inner.clipboard.borrow_mut() = Some(text.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = HeadlessWindow::new(100, 50);
        let b = a.clone();
        b.resize(200, 80);
        b.request_paint();
        assert_eq!(a.geometry(), (0, 0, 200, 80));
        assert_eq!(a.take_paint_requests(), 1);
        assert_eq!(a.paint_requests(), 0);
    }

    #[test]
    fn dispatch_reaches_handler() {
        let window = HeadlessWindow::new(10, 10);
        assert!(!window.dispatch(&Event::Expose));

        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        window.set_event_handler(Some(Box::new(move |_: &Event| counter.set(counter.get() + 1))));
        assert!(window.dispatch(&Event::Expose));
        assert!(window.dispatch(&Event::Other));
        assert_eq!(seen.get(), 2);
        assert!(window.has_event_handler());
    }

    #[test]
    fn handler_may_replace_itself() {
        let window = HeadlessWindow::new(10, 10);
        let inner = window.clone();
        window.set_event_handler(Some(Box::new(move |_: &Event| inner.set_event_handler(None))));
        window.dispatch(&Event::Other);
        // The removal installed during dispatch is not undone.
        assert!(!window.has_event_handler());
    }
}
