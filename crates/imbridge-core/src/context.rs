//! Per-frame context – owns the GUI-side state a platform adapter talks to.

use crate::{
    draw_list::DrawList,
    input::{Io, Key, MOUSE_BUTTON_COUNT},
    renderer::{DrawData, FontAtlas},
    Vec2,
};

// ─── Clipboard ───────────────────────────────────────────────────────────────

/// Clipboard hooks installed by the platform adapter.
pub trait ClipboardBackend {
    fn get(&mut self) -> Option<String>;
    fn set(&mut self, text: &str);
}

// ─── Context ─────────────────────────────────────────────────────────────────

/// The central state container. Create one per render target.
///
/// ```rust
/// use imbridge_core::{Color, Context, Rect, Vec2};
///
/// let mut ctx = Context::new();
/// ctx.io_mut().display_size = Vec2::new(1280.0, 720.0);
/// ctx.new_frame();
/// ctx.draw_list().filled_rect(Rect::new(Vec2::ZERO, Vec2::splat(32.0)), Color::WHITE);
/// let draw_data = ctx.render();
/// assert_eq!(draw_data.lists.len(), 1);
/// ```
pub struct Context {
    io:        Io,
    fonts:     FontAtlas,
    clipboard: Option<Box<dyn ClipboardBackend>>,

    // Lists being built for the current frame
    lists:     Vec<DrawList>,
    draw_data: DrawData,

    // Previous-frame state for edge detection
    prev_mouse_pos:  Vec2,
    prev_mouse_down: [bool; MOUSE_BUTTON_COUNT],
    prev_keys_down:  [bool; Key::COUNT as usize],

    frame_started: bool,
}

impl Default for Context {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("io", &self.io)
            .field("lists", &self.lists.len())
            .field("has_clipboard", &self.clipboard.is_some())
            .field("frame_started", &self.frame_started)
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            io:              Io::default(),
            fonts:           FontAtlas::default(),
            clipboard:       None,
            lists:           Vec::new(),
            draw_data:       DrawData::default(),
            prev_mouse_pos:  Vec2::new(-1.0, -1.0),
            prev_mouse_down: [false; MOUSE_BUTTON_COUNT],
            prev_keys_down:  [false; Key::COUNT as usize],
            frame_started:   false,
        }
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    pub fn io(&self)             -> &Io            { &self.io }
    pub fn io_mut(&mut self)     -> &mut Io        { &mut self.io }
    pub fn fonts(&self)          -> &FontAtlas     { &self.fonts }
    pub fn fonts_mut(&mut self)  -> &mut FontAtlas { &mut self.fonts }

    pub fn set_clipboard_backend(&mut self, backend: Option<Box<dyn ClipboardBackend>>) {
        self.clipboard = backend;
    }

    pub fn clipboard_text(&mut self) -> Option<String> {
        self.clipboard.as_mut().and_then(|c| c.get())
    }

    pub fn set_clipboard_text(&mut self, text: &str) {
        if let Some(c) = self.clipboard.as_mut() { c.set(text); }
    }

    // ── Frame lifecycle ───────────────────────────────────────────────────────

    /// Begin a new frame. The platform adapter fills [`Io`] first.
    pub fn new_frame(&mut self) {
        let io = &mut self.io;

        for i in 0..MOUSE_BUTTON_COUNT {
            io.mouse_clicked[i]  =  io.mouse_down[i] && !self.prev_mouse_down[i];
            io.mouse_released[i] = !io.mouse_down[i] &&  self.prev_mouse_down[i];
        }
        for i in 0..Key::COUNT as usize {
            io.keys_pressed[i] = io.keys_down[i] && !self.prev_keys_down[i];
        }
        io.mouse_delta = if io.mouse_pos_valid() && self.prev_mouse_pos.x >= 0.0 {
            io.mouse_pos - self.prev_mouse_pos
        } else {
            Vec2::ZERO
        };
        self.prev_mouse_pos  = io.mouse_pos;
        self.prev_mouse_down = io.mouse_down;
        self.prev_keys_down  = io.keys_down;

        if io.delta_time > 0.0 {
            // Exponential moving average, roughly a 60-frame window.
            io.framerate += (1.0 / io.delta_time - io.framerate) * (1.0 / 60.0);
        }
        io.frame_count += 1;

        if self.fonts.tex_id().is_none() {
            log::trace!("new_frame: font atlas has no texture yet");
        }

        self.lists.clear();
        self.frame_started = true;
    }

    /// Start a new draw batch for this frame and return it.
    pub fn draw_list(&mut self) -> &mut DrawList {
        self.lists.push(DrawList::new());
        let last = self.lists.len() - 1;
        &mut self.lists[last]
    }

    /// Finish the frame and return its draw data.
    ///
    /// Empty batches are dropped. Text typed during the frame and the wheel
    /// delta are consumed.
    pub fn render(&mut self) -> &DrawData {
        let mut data = DrawData::new(self.io.display_size, self.io.display_framebuffer_scale);
        for mut list in self.lists.drain(..) {
            list.pop_unused_cmd();
            if list.cmd_buf.is_empty() { continue; }
            data.push(list);
        }
        self.draw_data = data;

        self.io.input_characters.clear();
        self.io.mouse_wheel = 0.0;
        self.frame_started  = false;
        &self.draw_data
    }

    pub fn frame_started(&self) -> bool { self.frame_started }
}
