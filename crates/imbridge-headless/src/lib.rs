//! # imbridge-headless
//!
//! Headless stand-ins for both sides of the adapter:
//!
//! * [`HeadlessWindow`] – a toolkit window whose geometry, focus and pointer
//!   are scripted by the host, and which records paint requests, cursor
//!   changes and region hints.
//! * [`HeadlessRenderer`] / [`HeadlessContext`] – a graphics stack that
//!   logs every [`Call`], counts live objects per [`ObjectKind`] and
//!   rasterises draws into an RGBA buffer on the CPU.
//! * [`ManualClock`] – a clock that only moves when told to.
//!
//! Useful for tests, CI, and offscreen snapshots.

pub mod graphics;
pub mod raster;
pub mod window;

use std::{cell::Cell, rc::Rc};

use imbridge_adapter::toolkit::MonotonicClock;

pub use graphics::{
    parse_blend, BlendMode, Call, GraphicsProbe, HeadlessContext, HeadlessOnscreen, HeadlessPipeline,
    HeadlessPrimitive, HeadlessRenderer, HeadlessTexture, ObjectKind,
};
pub use window::HeadlessWindow;

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self { Self::default() }

    pub fn advance_micros(&self, micros: u64) { self.0.set(self.0.get() + micros); }
    pub fn advance_secs(&self, secs: f32) { self.advance_micros((secs * 1_000_000.0) as u64); }
    pub fn set_micros(&self, micros: u64) { self.0.set(micros); }
}

impl MonotonicClock for ManualClock {
    fn now_micros(&self) -> u64 { self.0.get() }
}

pub use imbridge_adapter as adapter;
pub use imbridge_core as core;
