#![allow(dead_code)]

use imbridge_adapter::{Adapter, AdapterConfig};
use imbridge_core::{Color, Context, DrawList, Rect, Vec2};
use imbridge_headless::{GraphicsProbe, HeadlessContext, HeadlessRenderer, HeadlessWindow, ManualClock};

pub type TestAdapter = Adapter<HeadlessWindow, HeadlessContext>;

pub struct Harness {
    pub gui:     Context,
    pub adapter: TestAdapter,
    pub window:  HeadlessWindow,
    pub probe:   GraphicsProbe,
    pub clock:   ManualClock,
}

pub fn harness(width: i32, height: i32) -> Harness {
    harness_with(HeadlessWindow::new(width, height), AdapterConfig::default())
}

pub fn harness_with(window: HeadlessWindow, config: AdapterConfig) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let renderer = HeadlessRenderer::new();
    let probe = renderer.probe();
    let mut gui = Context::new();
    let mut adapter = Adapter::new(window.clone(), renderer, &mut gui, config).expect("headless adapter");
    let clock = ManualClock::new();
    adapter.set_clock(clock.clone());
    Harness { gui, adapter, window, probe, clock }
}

impl Harness {
    /// Frame setup followed by an empty render.
    pub fn frame(&mut self) {
        self.adapter.new_frame(&mut self.gui);
        self.adapter.render(&mut self.gui);
    }

    pub fn new_frame(&mut self) {
        self.adapter.new_frame(&mut self.gui);
    }
}

/// A list with one opaque quad covering `rect`.
pub fn quad_list(rect: Rect, color: Color) -> DrawList {
    let mut list = DrawList::new();
    list.filled_rect(rect, color);
    list
}

pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::from_min_size(Vec2::new(x, y), Vec2::new(w, h))
}
