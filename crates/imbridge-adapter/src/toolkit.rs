//! Windowing-toolkit seam: the events the adapter consumes and the window
//! operations it needs.
//!
//! Modifier masks, event masks and keyvals use GDK's numeric values so a
//! GDK-backed [`Window`] can pass them through unchanged.

use std::time::Instant;

// ─── Masks ───────────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Modifier and pointer-button state carried by events and returned by
    /// pointer polling.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModifierType: u32 {
        const SHIFT   = 1 << 0;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
        const SUPER   = 1 << 26;
        const META    = 1 << 28;
    }
}

impl ModifierType {
    /// Mask bit of pointer button `n` (1-based). Empty outside 1..=5.
    pub fn button(n: u32) -> Self {
        match n {
            1..=5 => Self::from_bits_truncate(Self::BUTTON1.bits() << (n - 1)),
            _     => Self::empty(),
        }
    }
}

bitflags::bitflags! {
    /// Event classes a window delivers.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const EXPOSURE        = 1 << 1;
        const POINTER_MOTION  = 1 << 2;
        const BUTTON_PRESS    = 1 << 8;
        const BUTTON_RELEASE  = 1 << 9;
        const KEY_PRESS       = 1 << 10;
        const KEY_RELEASE     = 1 << 11;
        const ENTER_NOTIFY    = 1 << 12;
        const LEAVE_NOTIFY    = 1 << 13;
        const FOCUS_CHANGE    = 1 << 14;
        const STRUCTURE       = 1 << 15;
        const PROPERTY_CHANGE = 1 << 16;
        const SCROLL          = 1 << 21;
        const TOUCH           = 1 << 22;

        /// Everything the adapter listens to.
        const ADAPTER = Self::STRUCTURE.bits()
            | Self::FOCUS_CHANGE.bits()
            | Self::EXPOSURE.bits()
            | Self::PROPERTY_CHANGE.bits()
            | Self::ENTER_NOTIFY.bits()
            | Self::LEAVE_NOTIFY.bits()
            | Self::KEY_PRESS.bits()
            | Self::KEY_RELEASE.bits()
            | Self::BUTTON_PRESS.bits()
            | Self::BUTTON_RELEASE.bits()
            | Self::POINTER_MOTION.bits()
            | Self::TOUCH.bits()
            | Self::SCROLL.bits();
    }
}

// ─── Keyvals ─────────────────────────────────────────────────────────────────

/// Toolkit key codes (X11 keysym values).
pub mod keyval {
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB:       u32 = 0xff09;
    pub const LINEFEED:  u32 = 0xff0a;
    pub const CLEAR:     u32 = 0xff0b;
    pub const RETURN:    u32 = 0xff0d;
    pub const ESCAPE:    u32 = 0xff1b;
    pub const HOME:      u32 = 0xff50;
    pub const LEFT:      u32 = 0xff51;
    pub const UP:        u32 = 0xff52;
    pub const RIGHT:     u32 = 0xff53;
    pub const DOWN:      u32 = 0xff54;
    pub const PAGE_UP:   u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;
    pub const END:       u32 = 0xff57;
    pub const KP_SPACE:  u32 = 0xff80;
    pub const KP_TAB:    u32 = 0xff89;
    pub const KP_ENTER:  u32 = 0xff8d;
    pub const KP_MULTIPLY:  u32 = 0xffaa;
    pub const KP_ADD:       u32 = 0xffab;
    pub const KP_SEPARATOR: u32 = 0xffac;
    pub const KP_SUBTRACT:  u32 = 0xffad;
    pub const KP_DECIMAL:   u32 = 0xffae;
    pub const KP_DIVIDE:    u32 = 0xffaf;
    pub const KP_0:      u32 = 0xffb0;
    pub const KP_9:      u32 = 0xffb9;
    pub const KP_EQUAL:  u32 = 0xffbd;
    pub const SHIFT_L:   u32 = 0xffe1;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const DELETE:    u32 = 0xffff;

    pub const A: u32 = 0x0061;
    pub const C: u32 = 0x0063;
    pub const V: u32 = 0x0076;
    pub const X: u32 = 0x0078;
    pub const Y: u32 = 0x0079;
    pub const Z: u32 = 0x007a;

    /// Unicode code point a keyval produces, or 0 when it produces none.
    pub fn to_unicode(keyval: u32) -> u32 {
        match keyval {
            // Latin-1 keysyms are their own code points.
            0x0020..=0x007e | 0x00a0..=0x00ff => keyval,
            // Directly encoded Unicode keysyms.
            k if k & 0xff00_0000 == 0x0100_0000 => k & 0x00ff_ffff,
            BACKSPACE => 0x08,
            TAB | KP_TAB => 0x09,
            LINEFEED => 0x0a,
            CLEAR => 0x0b,
            RETURN | KP_ENTER => 0x0d,
            ESCAPE => 0x1b,
            DELETE => 0x7f,
            KP_SPACE => 0x20,
            KP_MULTIPLY => u32::from('*'),
            KP_ADD => u32::from('+'),
            KP_SEPARATOR => u32::from(','),
            KP_SUBTRACT => u32::from('-'),
            KP_DECIMAL => u32::from('.'),
            KP_DIVIDE => u32::from('/'),
            KP_EQUAL => u32::from('='),
            KP_0..=KP_9 => u32::from('0') + (keyval - KP_0),
            _ => 0,
        }
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection { Up, Down, Left, Right, Smooth }

/// Payload of key press/release events. Fields are optional because the
/// toolkit may fail to provide them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub keyval: Option<u32>,
    pub state:  Option<ModifierType>,
}

impl KeyEvent {
    pub fn new(keyval: u32, state: ModifierType) -> Self {
        Self { keyval: Some(keyval), state: Some(state) }
    }
}

/// One windowing-system event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Motion        { position: Option<(f64, f64)> },
    ButtonPress   { button: Option<u32> },
    ButtonRelease { button: Option<u32> },
    Scroll        { direction: Option<ScrollDirection> },
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    Configure     { x: i32, y: i32, width: i32, height: i32 },
    Focus         { focused: bool },
    Expose,
    Delete,
    Other,
}

pub type EventHandler = Box<dyn FnMut(&Event)>;

// ─── Window ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape { Default, None }

impl CursorShape {
    /// Cursor-theme name.
    pub fn name(self) -> &'static str {
        match self {
            CursorShape::Default => "default",
            CursorShape::None    => "none",
        }
    }
}

/// Integer rectangle used for region hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionRect { pub x: i32, pub y: i32, pub width: i32, pub height: i32 }

/// Windowing system a window lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Windowing { X11, Wayland, Win32, Other }

/// Native handle the graphics library binds an onscreen framebuffer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeWindow {
    Xid(u64),
    WaylandSurface(usize),
    Win32(isize),
    None,
}

/// The toolkit window the adapter drives.
///
/// Implementations are cheap reference-counted handles (cloning shares the
/// window), so methods take `&self`.
pub trait Window: Clone {
    /// `(x, y, width, height)` in logical pixels.
    fn geometry(&self) -> (i32, i32, i32, i32);
    /// Framebuffer pixels per logical pixel.
    fn scale_factor(&self) -> i32;
    fn is_focused(&self) -> bool;
    /// Live pointer state: pressed buttons and modifiers.
    fn pointer_state(&self) -> ModifierType;

    fn set_cursor(&self, cursor: CursorShape);
    /// Compositor hint; `None` clears it.
    fn set_opaque_region(&self, region: Option<RegionRect>);
    fn set_events(&self, mask: EventMask);
    fn events(&self) -> EventMask;
    fn ensure_native(&self);

    fn windowing(&self) -> Windowing;
    fn native_handle(&self) -> NativeWindow;

    /// Ask the frame clock for a paint cycle.
    fn request_paint(&self);

    /// Replace the toolkit-level event handler.
    fn set_event_handler(&self, handler: Option<EventHandler>);

    fn clipboard_text(&self) -> Option<String> { None }
    fn set_clipboard_text(&self, _text: &str) {}
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Monotonic time source in microseconds.
pub trait MonotonicClock {
    fn now_micros(&self) -> u64;
}

/// [`Instant`]-backed clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self { Self { origin: Instant::now() } }
}

impl MonotonicClock for SystemClock {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_and_unicode_keysyms_decode() {
        assert_eq!(keyval::to_unicode(keyval::A), u32::from('a'));
        assert_eq!(keyval::to_unicode(0x00e9), 0xe9);
        assert_eq!(keyval::to_unicode(0x0100_20ac), 0x20ac);
        assert_eq!(keyval::to_unicode(keyval::KP_0 + 7), u32::from('7'));
        assert_eq!(keyval::to_unicode(keyval::RETURN), 0x0d);
    }

    #[test]
    fn non_text_keys_decode_to_zero() {
        assert_eq!(keyval::to_unicode(keyval::LEFT), 0);
        assert_eq!(keyval::to_unicode(keyval::SHIFT_L), 0);
        assert_eq!(keyval::to_unicode(keyval::CONTROL_L), 0);
    }

    #[test]
    fn button_masks() {
        assert_eq!(ModifierType::button(1), ModifierType::BUTTON1);
        assert_eq!(ModifierType::button(3), ModifierType::BUTTON3);
        assert!(ModifierType::button(0).is_empty());
        assert!(ModifierType::button(6).is_empty());
    }

    #[test]
    fn adapter_mask_listens_for_input() {
        assert!(EventMask::ADAPTER.contains(EventMask::KEY_PRESS | EventMask::SCROLL));
        assert!(EventMask::ADAPTER.contains(EventMask::STRUCTURE));
    }
}
