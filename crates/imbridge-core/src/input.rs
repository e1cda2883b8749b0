//! Per-frame input snapshot filled in by the platform adapter.

use crate::Vec2;

/// Published mouse position when there is no usable pointer (unfocused
/// window, pointer never seen).
pub const MOUSE_POS_ABSENT: Vec2 = Vec2 { x: -1.0, y: -1.0 };

/// Number of tracked mouse buttons.
pub const MOUSE_BUTTON_COUNT: usize = 5;

// ─── MouseButton ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton { Left = 0, Right = 1, Middle = 2, Extra1 = 3, Extra2 = 4 }

// ─── Key ─────────────────────────────────────────────────────────────────────

/// Logical keys the GUI reacts to. Indexes [`Io::keys_down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Key {
    // Navigation
    Tab,
    Left, Right, Up, Down,
    PageUp, PageDown,
    Home, End,
    // Editing
    Delete, Backspace, Enter, Escape,
    // Clipboard / undo shortcuts
    A, C, V, X, Y, Z,
    // Sentinel
    COUNT,
}

impl Key {
    /// Every real key, in index order.
    pub const ALL: [Key; Key::COUNT as usize] = [
        Key::Tab, Key::Left, Key::Right, Key::Up, Key::Down,
        Key::PageUp, Key::PageDown, Key::Home, Key::End,
        Key::Delete, Key::Backspace, Key::Enter, Key::Escape,
        Key::A, Key::C, Key::V, Key::X, Key::Y, Key::Z,
    ];

    #[inline] pub fn index(self) -> usize { self as usize }
}

// ─── Modifiers ───────────────────────────────────────────────────────────────

bitflags::bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const CTRL  = 1 << 0;
        const SHIFT = 1 << 1;
        const ALT   = 1 << 2;
        const SUPER = 1 << 3;
    }
}

// ─── Io ──────────────────────────────────────────────────────────────────────

/// Input and display state for one frame.
///
/// The platform adapter writes the "input" half before
/// [`Context::new_frame`](crate::Context::new_frame); the context derives
/// the edge-triggered fields (`mouse_clicked`, `keys_pressed`, …) when the
/// frame starts.
#[derive(Debug, Clone)]
pub struct Io {
    // Display
    pub display_size:              Vec2,
    pub display_framebuffer_scale: Vec2,
    pub delta_time:                f32,

    // Mouse
    pub mouse_pos:   Vec2,
    pub mouse_down:  [bool; MOUSE_BUTTON_COUNT],
    pub mouse_wheel: f32,
    /// Set by the application when the GUI draws its own cursor; the
    /// adapter hides the OS cursor while it is set.
    pub mouse_draw_cursor: bool,

    // Keyboard / text
    pub modifiers:        Modifiers,
    pub keys_down:        [bool; Key::COUNT as usize],
    pub input_characters: String,

    // Backend bookkeeping
    pub backend_name: Option<&'static str>,

    // Derived in `Context::new_frame`
    pub mouse_delta:    Vec2,
    pub mouse_clicked:  [bool; MOUSE_BUTTON_COUNT],
    pub mouse_released: [bool; MOUSE_BUTTON_COUNT],
    pub keys_pressed:   [bool; Key::COUNT as usize],
    pub framerate:      f32,
    pub frame_count:    u64,
}

impl Default for Io {
    fn default() -> Self {
        Self {
            display_size:              Vec2::ZERO,
            display_framebuffer_scale: Vec2::ONE,
            delta_time:                1.0 / 60.0,
            mouse_pos:                 MOUSE_POS_ABSENT,
            mouse_down:                [false; MOUSE_BUTTON_COUNT],
            mouse_wheel:               0.0,
            mouse_draw_cursor:         false,
            modifiers:                 Modifiers::empty(),
            keys_down:                 [false; Key::COUNT as usize],
            input_characters:          String::new(),
            backend_name:              None,
            mouse_delta:               Vec2::ZERO,
            mouse_clicked:             [false; MOUSE_BUTTON_COUNT],
            mouse_released:            [false; MOUSE_BUTTON_COUNT],
            keys_pressed:              [false; Key::COUNT as usize],
            framerate:                 60.0,
            frame_count:               0,
        }
    }
}

impl Io {
    /// Append UTF-8 text typed since the last frame.
    pub fn add_input_characters(&mut self, text: &str) { self.input_characters.push_str(text); }

    /// Whether the published mouse position refers to a real pointer.
    #[inline] pub fn mouse_pos_valid(&self) -> bool { self.mouse_pos.x >= 0.0 && self.mouse_pos.y >= 0.0 }

    // ── query helpers ─────────────────────────────────────────────────────────

    #[inline] pub fn mouse_clicked(&self, btn: MouseButton)  -> bool { self.mouse_clicked[btn as usize] }
    #[inline] pub fn mouse_released(&self, btn: MouseButton) -> bool { self.mouse_released[btn as usize] }

    #[inline] pub fn key_down(&self, k: Key) -> bool { self.keys_down[k as usize] }
}
