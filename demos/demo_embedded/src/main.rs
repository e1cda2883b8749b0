//! demo_embedded – imbridge inside a host that owns the graphics context.
//!
//! Run with:  `cargo run -p demo_embedded`
//!
//! The host creates the context and framebuffer itself (as a widget with
//! its own GL area would) and forwards window events to the adapter by hand
//! instead of letting it install a hook.

use imbridge::{
    headless::{HeadlessContext, HeadlessOnscreen, HeadlessWindow},
    prelude::*,
};
use imbridge::adapter::{toolkit::Windowing, GraphicsError};

fn main() -> Result<(), GraphicsError> {
    env_logger::init();

    let window = HeadlessWindow::new(256, 256).with_windowing(Windowing::Wayland);
    let context = HeadlessContext::standalone();
    let probe = context.probe();
    let framebuffer = HeadlessOnscreen::for_context(&context, 256, 256)?;

    let mut gui = Context::new();
    let config = AdapterConfig::default().with_handle_events(false).with_opaque_region(false);
    let mut adapter = Adapter::with_framebuffer(window.clone(), context, framebuffer, &mut gui, config);

    let host_events = [
        Event::Focus { focused: true },
        Event::Motion { position: Some((128.0, 128.0)) },
        Event::ButtonPress { button: Some(1) },
        Event::Expose,
    ];

    for (frame, event) in host_events.iter().enumerate() {
        // The host sees every event first and decides what to forward.
        let handled = adapter.handle_event(event);
        log::debug!("frame {frame}: {event:?} handled={handled}");

        adapter.new_frame(&mut gui);
        let hot = gui.io().mouse_down[0];
        let fill = if hot { Color::rgb(0.9, 0.4, 0.2) } else { Color::rgb(0.2, 0.4, 0.9) };
        gui.draw_list().filled_rect(Rect::from_min_size(Vec2::splat(64.0), Vec2::splat(128.0)), fill);

        adapter.framebuffer_mut().clear(Color::BLACK);
        adapter.render(&mut gui);
    }

    let centre = adapter.framebuffer().pixel(128, 128);
    println!(
        "demo_embedded: {} backend, {} draws, centre pixel {centre:?}, {} paint requests",
        adapter.backend().name(),
        probe.draw_count(),
        window.paint_requests(),
    );
    adapter.shutdown(&mut gui);
    Ok(())
}
