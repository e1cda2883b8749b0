//! Event translation: toolkit events become pending input that the next
//! frame setup publishes.

use imbridge_core::{input::MOUSE_BUTTON_COUNT, Key, Modifiers, Vec2};

use crate::{
    graphics::{Context, FilterReturn},
    toolkit::{keyval, Event, KeyEvent, ModifierType, RegionRect, ScrollDirection, Window},
    Adapter,
};

// ─── Key table ───────────────────────────────────────────────────────────────

/// Toolkit keyvals mapped onto GUI keys. Anything else never sets a key flag.
pub const KEY_TABLE: [(u32, Key); Key::COUNT as usize] = [
    (keyval::TAB,       Key::Tab),
    (keyval::LEFT,      Key::Left),
    (keyval::RIGHT,     Key::Right),
    (keyval::UP,        Key::Up),
    (keyval::DOWN,      Key::Down),
    (keyval::PAGE_UP,   Key::PageUp),
    (keyval::PAGE_DOWN, Key::PageDown),
    (keyval::HOME,      Key::Home),
    (keyval::END,       Key::End),
    (keyval::DELETE,    Key::Delete),
    (keyval::BACKSPACE, Key::Backspace),
    (keyval::RETURN,    Key::Enter),
    (keyval::ESCAPE,    Key::Escape),
    (keyval::A,         Key::A),
    (keyval::C,         Key::C),
    (keyval::V,         Key::V),
    (keyval::X,         Key::X),
    (keyval::Y,         Key::Y),
    (keyval::Z,         Key::Z),
];

pub fn key_for_keyval(kv: u32) -> Option<Key> {
    KEY_TABLE.iter().find(|(code, _)| *code == kv).map(|(_, key)| *key)
}

/// GUI modifiers carried by a toolkit modifier mask. Alt is `MOD1` on X11
/// and `META` elsewhere.
pub fn modifiers_from_state(state: ModifierType) -> Modifiers {
    let mut m = Modifiers::empty();
    m.set(Modifiers::CTRL,  state.contains(ModifierType::CONTROL));
    m.set(Modifiers::SHIFT, state.contains(ModifierType::SHIFT));
    m.set(Modifiers::ALT,   state.intersects(ModifierType::MOD1 | ModifierType::META));
    m.set(Modifiers::SUPER, state.contains(ModifierType::SUPER));
    m
}

// ─── Pending input ───────────────────────────────────────────────────────────

/// Input accumulated between two frame setups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingInput {
    /// Last pointer position seen, window coordinates.
    pub mouse_pos:     Option<Vec2>,
    /// Set by a press, cleared when published. Releases never clear it.
    pub mouse_pressed: [bool; MOUSE_BUTTON_COUNT],
    pub mouse_wheel:   f32,
    pub modifiers:     Modifiers,
    pub keys_down:     [bool; Key::COUNT as usize],
    /// Text produced by key events, in arrival order.
    pub text:          String,
}

impl PendingInput {
    fn apply_key(&mut self, event: &KeyEvent, pressed: bool) {
        if let Some(state) = event.state {
            self.modifiers = modifiers_from_state(state);
        }
        let Some(kv) = event.keyval else { return };

        if let Some(key) = key_for_keyval(kv) {
            self.keys_down[key.index()] = pressed;
        }
        // Text is recorded for releases too.
        let cp = keyval::to_unicode(kv);
        if cp != 0 {
            if let Some(ch) = char::from_u32(cp) {
                self.text.push(ch);
            }
        }
    }
}

// ─── Event handling ──────────────────────────────────────────────────────────

impl<W: Window, C: Context> Adapter<W, C> {
    /// Fold one toolkit event into the pending input.
    ///
    /// Returns `true` when the event was one the adapter understands; that
    /// also schedules redraws. Unrecognised events change nothing.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        if self.backend.preprocess_event(&mut self.framebuffer, event) == FilterReturn::Remove {
            log::trace!("handle_event: {event:?} consumed by the graphics library");
            return false;
        }

        let p = &mut self.pending;
        match event {
            Event::Motion { position } => {
                if let Some((x, y)) = *position {
                    p.mouse_pos = Some(Vec2::new(x as f32, y as f32));
                }
            }
            Event::ButtonPress { button } => {
                if let Some(b) = button.filter(|b| (1..=MOUSE_BUTTON_COUNT as u32).contains(b)) {
                    p.mouse_pressed[b as usize - 1] = true;
                }
            }
            // Release state comes from polling at frame setup.
            Event::ButtonRelease { .. } => {}
            Event::Scroll { direction } => {
                if let Some(dir) = *direction {
                    p.mouse_wheel = if dir == ScrollDirection::Up { 1.0 } else { -1.0 };
                }
            }
            Event::KeyPress(key)   => p.apply_key(key, true),
            Event::KeyRelease(key) => p.apply_key(key, false),
            Event::Configure { width, height, .. } => {
                if self.config.opaque_region {
                    self.window.set_opaque_region(Some(RegionRect { x: 0, y: 0, width: *width, height: *height }));
                }
            }
            Event::Focus { .. } | Event::Expose | Event::Delete | Event::Other => return false,
        }

        self.redraws = self.config.redraw_frames;
        self.window.request_paint();
        true
    }
}
