//! # imbridge
//!
//! Immediate-mode GUI platform glue. Toolkit window events go in, the GUI
//! frame comes out as scene-graphics draw calls. Single umbrella crate that
//! re-exports the GUI core, the adapter and the optional headless backend.
//!
//! ## Feature flags
//!
//! | Flag       | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `headless` | Scripted window and recording software renderer   |
//! | `index32`  | 32-bit draw indices instead of 16-bit ones        |
//!
//! ## Minimal example
//!
//! ```rust
//! # #[cfg(feature = "headless")] {
//! use imbridge::prelude::*;
//! use imbridge::headless::{HeadlessRenderer, HeadlessWindow};
//!
//! let mut gui = Context::new();
//! let window = HeadlessWindow::new(640, 480);
//! let mut adapter = Adapter::new(window, HeadlessRenderer::new(), &mut gui, AdapterConfig::default()).unwrap();
//!
//! adapter.new_frame(&mut gui);
//! gui.draw_list().filled_rect(Rect::from_min_size(Vec2::ZERO, Vec2::splat(32.0)), Color::WHITE);
//! adapter.render(&mut gui);
//! adapter.framebuffer_mut().swap_buffers();
//! # }
//! ```

// ─── Core re-exports ─────────────────────────────────────────────────────────

pub use imbridge_core::*;
pub use imbridge_core as core;
pub use imbridge_adapter as adapter;

pub use imbridge_adapter::{Adapter, AdapterConfig, AdapterError, Backend, DeviceState};

// ─── Backend modules ─────────────────────────────────────────────────────────

#[cfg(feature = "headless")]
pub mod headless {
    //! Windowless toolkit and graphics implementations for tests, CI and
    //! offscreen rendering.
    pub use imbridge_headless::*;
}

// ─── Prelude ─────────────────────────────────────────────────────────────────

pub mod prelude {
    pub use crate::{
        adapter::{
            graphics::{Context as _, Draw as _, Framebuffer as _, Renderer as _},
            toolkit::{Event, Window as _},
        },
        Adapter, AdapterConfig, Backend, Color, Context, DrawData, DrawList, Io, Key, Modifiers, Rect,
        TextureId, Vec2,
    };
}
