//! Frame setup: publish display metrics, timing and pending input to the GUI.

use imbridge_core::{input::MOUSE_BUTTON_COUNT, Context as GuiContext, Vec2, MOUSE_POS_ABSENT};

use crate::{
    graphics::Context,
    toolkit::{CursorShape, ModifierType, Window},
    Adapter,
};

/// Buttons whose live state is polled from the pointer each frame.
const POLLED_BUTTONS: usize = 3;

impl<W: Window, C: Context> Adapter<W, C> {
    /// Prepare `ctx` for a new GUI frame and start it.
    ///
    /// Creates device objects on first use; a failed creation is logged and
    /// retried on the next call.
    pub fn new_frame(&mut self, ctx: &mut GuiContext) {
        if self.device.is_none() {
            if let Err(err) = self.create_device_objects(ctx) {
                log::warn!("new_frame: device objects unavailable, retrying next frame: {err}");
            }
        }

        if self.redraws > 0 {
            self.window.request_paint();
            self.redraws -= 1;
        }

        let (_, _, width, height) = self.window.geometry();
        let scale = self.window.scale_factor() as f32;

        let now = self.clock.now_micros();
        let delta_time = match self.last_frame_micros {
            Some(last) => now.saturating_sub(last).max(1) as f32 / 1_000_000.0,
            None       => self.config.fallback_delta_time,
        };
        self.last_frame_micros = Some(now);

        let io = ctx.io_mut();
        io.display_size              = Vec2::new(width as f32, height as f32);
        io.display_framebuffer_scale = Vec2::splat(scale);
        io.delta_time                = delta_time;

        io.mouse_pos = match self.pending.mouse_pos {
            Some(pos) if self.window.is_focused() => pos,
            _ => MOUSE_POS_ABSENT,
        };

        let polled = self.window.pointer_state();
        for i in 0..MOUSE_BUTTON_COUNT {
            let live = i < POLLED_BUTTONS && polled.contains(ModifierType::button(i as u32 + 1));
            io.mouse_down[i] = self.pending.mouse_pressed[i] || live;
            self.pending.mouse_pressed[i] = false;
        }

        io.mouse_wheel = std::mem::take(&mut self.pending.mouse_wheel);

        io.modifiers = self.pending.modifiers;
        io.keys_down = self.pending.keys_down;
        io.add_input_characters(&self.pending.text);
        self.pending.text.clear();

        let cursor = if io.mouse_draw_cursor { CursorShape::None } else { CursorShape::Default };
        self.window.set_cursor(cursor);

        ctx.new_frame();
    }
}
