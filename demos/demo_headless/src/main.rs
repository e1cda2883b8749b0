//! demo_headless – imbridge driven by a scripted window and the software
//! renderer.
//!
//! Run with:  `RUST_LOG=debug cargo run -p demo_headless`
//!
//! The adapter installs its own event hook on the window; the demo plays a
//! few pointer and key events through it and renders a handful of frames.

use imbridge::{
    headless::{HeadlessRenderer, HeadlessWindow, ManualClock},
    prelude::*,
    AdapterError,
};
use imbridge::adapter::toolkit::{keyval, KeyEvent, ModifierType, ScrollDirection};

const FRAMES: usize = 4;

fn main() -> Result<(), AdapterError> {
    env_logger::init();

    let window = HeadlessWindow::new(320, 200);
    let renderer = HeadlessRenderer::new();
    let probe = renderer.probe();
    let mut gui = Context::new();

    let adapter = Adapter::new_shared(window.clone(), renderer, &mut gui, AdapterConfig::default())?;
    let clock = ManualClock::new();
    adapter.borrow_mut().set_clock(clock.clone());

    // Scripted input, delivered through the window like a toolkit would.
    let script = [
        Event::Motion { position: Some((40.0, 30.0)) },
        Event::ButtonPress { button: Some(1) },
        Event::ButtonRelease { button: Some(1) },
        Event::Scroll { direction: Some(ScrollDirection::Down) },
        Event::KeyPress(KeyEvent::new(keyval::A, ModifierType::CONTROL)),
        Event::KeyRelease(KeyEvent::new(keyval::A, ModifierType::CONTROL)),
    ];

    let mut progress = 0.0f32;
    for frame in 0..FRAMES {
        if let Some(event) = script.get(frame) {
            window.dispatch(event);
        }
        clock.advance_secs(1.0 / 60.0);

        let mut adapter = adapter.borrow_mut();
        adapter.new_frame(&mut gui);

        let io = gui.io();
        log::info!(
            "frame {frame}: mouse {:?} down {:?} wheel {} mods {:?} text {:?}",
            io.mouse_pos, io.mouse_down, io.mouse_wheel, io.modifiers, io.input_characters,
        );
        progress = (progress + 0.25).min(1.0);
        build_ui(&mut gui, progress);

        adapter.framebuffer_mut().clear(Color::from_hex(0x1e1e28));
        adapter.render(&mut gui);
        adapter.framebuffer_mut().swap_buffers();
    }

    let adapter = match std::rc::Rc::try_unwrap(adapter) {
        Ok(cell) => cell.into_inner(),
        Err(_) => {
            log::error!("adapter still shared at exit");
            return Ok(());
        }
    };
    let lit = adapter.framebuffer().pixels().chunks_exact(4).filter(|px| px[..3] != [0x1e, 0x1e, 0x28]).count();
    println!(
        "demo_headless: {FRAMES} frames, {} draws, {} swaps, {lit} pixels drawn over the background",
        probe.draw_count(),
        adapter.framebuffer().swap_count(),
    );

    adapter.shutdown(&mut gui);
    println!("demo_headless: {} graphics objects live after shutdown", probe.total_live());
    Ok(())
}

fn build_ui(gui: &mut Context, progress: f32) {
    let list = gui.draw_list();
    let panel = Rect::from_min_size(Vec2::new(20.0, 20.0), Vec2::new(280.0, 160.0));
    list.filled_rect(panel, Color::from_hex(0x303040));
    list.rect_outline(panel, 1.0, Color::from_hex(0x9b27af));

    list.push_clip_rect(panel);
    let bar = Rect::from_min_size(Vec2::new(40.0, 80.0), Vec2::new(240.0 * progress, 20.0));
    list.filled_rect(bar, Color::rgb(0.2, 0.7, 0.3));
    list.filled_circle(Vec2::new(160.0, 140.0), 24.0, Color::WHITE.with_alpha(0.5), 24);
    list.pop_clip_rect();
}
