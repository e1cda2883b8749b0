mod common;

use std::{cell::RefCell, rc::Rc};

use common::{harness, harness_with};
use imbridge_adapter::{
    graphics::{Context as _, CullFaceMode, DepthState, PixelFormat, WinsysId},
    toolkit::{Event, EventMask, NativeWindow, Window as _, Windowing},
    Adapter, AdapterConfig, AdapterError, Backend, DeviceState, PipelineStage, BACKEND_NAME,
};
use imbridge_core::{Context, TextureId};
use imbridge_headless::{Call, HeadlessRenderer, HeadlessWindow, ObjectKind};

#[test]
fn init_prepares_window_and_onscreen() {
    let window = HeadlessWindow::new(320, 200).with_windowing(Windowing::X11);
    window.set_scale_factor(2);
    let h = harness_with(window, AdapterConfig::default());

    assert!(h.window.is_native());
    assert!(h.window.events().contains(EventMask::ADAPTER));
    assert_eq!(h.probe.winsys(), Some(WinsysId::EglXlib));

    let calls = h.probe.calls();
    assert!(calls.contains(&Call::NewOnscreen { width: 640, height: 400 }));
    assert!(calls.contains(&Call::SetResizable(true)));
    assert!(calls.contains(&Call::SetForeignWindow(NativeWindow::Xid(0x0040_0001))));
    assert_eq!(h.gui.io().backend_name, Some(BACKEND_NAME));
}

#[test]
fn x11_event_mask_requests_keep_the_adapter_mask() {
    let window = HeadlessWindow::new(64, 64).with_windowing(Windowing::X11);
    let h = harness_with(window, AdapterConfig::default());
    h.window.set_events(EventMask::empty());

    assert!(h.adapter.framebuffer().request_event_mask(EventMask::PROPERTY_CHANGE));
    assert_eq!(h.window.events(), EventMask::PROPERTY_CHANGE | EventMask::ADAPTER);
}

#[test]
fn only_x11_binds_an_event_mask_callback() {
    let window = HeadlessWindow::new(64, 64).with_windowing(Windowing::Wayland);
    let h = harness_with(window, AdapterConfig::default());
    assert!(h.probe.calls().contains(&Call::SetForeignWindow(NativeWindow::WaylandSurface(1))));
    assert!(!h.adapter.framebuffer().request_event_mask(EventMask::EXPOSURE));
}

#[test]
fn headless_backend_binds_nothing() {
    let h = harness(100, 100);
    assert_eq!(h.adapter.backend(), Backend::Headless);
    assert_eq!(h.probe.winsys(), Some(WinsysId::Stub));
    assert_eq!(h.probe.count(|c| matches!(c, Call::SetForeignWindow(_))), 0);
}

#[test]
fn connection_failure_is_reported() {
    let mut gui = Context::new();
    let result = Adapter::new(
        HeadlessWindow::new(10, 10),
        HeadlessRenderer::failing("no display"),
        &mut gui,
        AdapterConfig::default(),
    );
    assert!(matches!(result, Err(AdapterError::Graphics(_))));
}

#[test]
fn pipeline_is_configured_for_gui_drawing() {
    let mut h = harness(100, 100);
    h.adapter.create_device_objects(&mut h.gui).unwrap();

    let calls = h.probe.calls();
    assert!(calls.contains(&Call::SetBlend(imbridge_adapter::config::DEFAULT_BLEND.to_owned())));
    assert!(calls.contains(&Call::SetCullFaceMode(CullFaceMode::None)));
    assert!(calls.contains(&Call::SetDepthState(DepthState::disabled())));
    assert!(calls.contains(&Call::DepthWrite(false)));
    assert!(calls.contains(&Call::NewTexture { serial: 1, width: 64, height: 64, format: PixelFormat::Rgba8888 }));
    assert_eq!(h.gui.fonts().tex_id(), Some(TextureId::FONT));
}

#[test]
fn pipeline_errors_name_the_stage() {
    let mut h = harness(100, 100);
    h.probe.set_reject_depth(true);
    let err = h.adapter.create_device_objects(&mut h.gui).unwrap_err();
    assert!(matches!(err, AdapterError::Pipeline { stage: PipelineStage::Depth, .. }));
    assert_eq!(h.adapter.device_state(), DeviceState::Uninitialized);
    assert_eq!(h.probe.total_live(), 0);

    let err = {
        let mut h = harness_with(HeadlessWindow::new(10, 10), AdapterConfig::default().with_blend("nonsense"));
        h.adapter.create_device_objects(&mut h.gui).unwrap_err()
    };
    assert!(matches!(err, AdapterError::Pipeline { stage: PipelineStage::Blend, .. }));
}

#[test]
fn font_upload_failure_is_reported() {
    let mut h = harness(100, 100);
    h.probe.set_reject_textures(true);
    let err = h.adapter.create_device_objects(&mut h.gui).unwrap_err();
    assert!(matches!(err, AdapterError::FontTexture(_)));
    assert!(h.gui.fonts().tex_id().is_none());
}

#[test]
fn invalidate_then_recreate_returns_to_baseline() {
    let mut h = harness(100, 100);
    h.new_frame();
    h.adapter.render(&mut h.gui);
    let baseline_textures = h.probe.live(ObjectKind::Texture);
    let baseline_pipelines = h.probe.live(ObjectKind::Pipeline);
    assert_eq!((baseline_textures, baseline_pipelines), (1, 1));

    h.adapter.invalidate_device_objects(&mut h.gui);
    assert_eq!(h.adapter.device_state(), DeviceState::Invalidated);
    assert_eq!(h.probe.total_live(), 0);
    assert!(h.gui.fonts().tex_id().is_none());

    // Invalidating twice is harmless.
    h.adapter.invalidate_device_objects(&mut h.gui);

    h.probe.clear_calls();
    h.new_frame();
    assert_eq!(h.adapter.device_state(), DeviceState::Ready);
    assert_eq!(h.probe.live(ObjectKind::Texture), baseline_textures);
    assert_eq!(h.probe.live(ObjectKind::Pipeline), baseline_pipelines);
    let calls = h.probe.calls();
    assert!(calls.contains(&Call::SetBlend(h.adapter.config().blend.clone())));
    assert!(calls.contains(&Call::SetDepthState(DepthState::disabled())));
}

#[test]
fn recreating_while_ready_replaces_objects() {
    let mut h = harness(100, 100);
    h.adapter.create_device_objects(&mut h.gui).unwrap();
    h.adapter.create_device_objects(&mut h.gui).unwrap();
    assert_eq!(h.probe.live(ObjectKind::Pipeline), 1);
    assert_eq!(h.probe.live(ObjectKind::Texture), 1);
    assert_eq!(h.probe.created(ObjectKind::Texture), 2);
}

#[test]
fn user_textures_survive_invalidation() {
    let mut h = harness(100, 100);
    h.new_frame();
    let tex = h.adapter.context_mut().new_texture_2d(2, 2, PixelFormat::Rgba8888, 8, &[0; 16]).unwrap();
    let id = h.adapter.register_texture(tex);
    h.adapter.invalidate_device_objects(&mut h.gui);
    assert_eq!(h.probe.live(ObjectKind::Texture), 1);
    assert!(h.adapter.unregister_texture(id).is_some());
    assert_eq!(h.probe.live(ObjectKind::Texture), 0);
}

#[test]
fn shutdown_releases_everything_and_detaches() {
    let mut h = harness(100, 100);
    h.new_frame();
    h.gui.draw_list().filled_rect(common::rect(0.0, 0.0, 4.0, 4.0), imbridge_core::Color::WHITE);
    h.adapter.render(&mut h.gui);
    let tex = h.adapter.context_mut().new_texture_2d(1, 1, PixelFormat::A8, 1, &[255]).unwrap();
    h.adapter.register_texture(tex);

    h.gui.set_clipboard_text("before");
    assert_eq!(h.gui.clipboard_text().as_deref(), Some("before"));

    let common::Harness { mut gui, adapter, probe, .. } = h;
    adapter.shutdown(&mut gui);
    assert_eq!(probe.total_live(), 0);
    assert_eq!(gui.io().backend_name, None);
    assert_eq!(gui.clipboard_text(), None);
}

#[test]
fn event_hook_feeds_the_adapter() {
    let window = HeadlessWindow::new(100, 100);
    let mut gui = Context::new();
    let adapter = Adapter::new_shared(window.clone(), HeadlessRenderer::new(), &mut gui, AdapterConfig::default()).unwrap();
    assert!(window.has_event_handler());

    window.dispatch(&Event::ButtonPress { button: Some(3) });
    assert!(adapter.borrow().pending().mouse_pressed[2]);

    // Events arriving while the adapter is borrowed are dropped, not fatal.
    {
        let _busy = adapter.borrow_mut();
        window.dispatch(&Event::ButtonPress { button: Some(1) });
    }
    assert!(!adapter.borrow().pending().mouse_pressed[0]);

    let adapter = Rc::try_unwrap(adapter).ok().map(RefCell::into_inner).unwrap();
    adapter.shutdown(&mut gui);
    assert!(!window.has_event_handler());
}

#[test]
fn event_hook_can_be_left_to_the_host() {
    let window = HeadlessWindow::new(100, 100);
    let mut gui = Context::new();
    let config = AdapterConfig::default().with_handle_events(false);
    let _adapter = Adapter::new_shared(window.clone(), HeadlessRenderer::new(), &mut gui, config).unwrap();
    assert!(!window.has_event_handler());
}

#[test]
fn dropped_adapter_leaves_hook_inert() {
    let window = HeadlessWindow::new(100, 100);
    let mut gui = Context::new();
    let adapter = Adapter::new_shared(window.clone(), HeadlessRenderer::new(), &mut gui, AdapterConfig::default()).unwrap();
    drop(adapter);
    assert!(window.dispatch(&Event::Motion { position: Some((1.0, 1.0)) }));
}

#[test]
fn host_owned_framebuffer_is_used_as_is() {
    let context = imbridge_headless::HeadlessContext::standalone();
    let probe = context.probe();
    let onscreen = imbridge_headless::HeadlessOnscreen::for_context(&context, 50, 40).unwrap();
    let window = HeadlessWindow::new(50, 40).with_windowing(Windowing::Wayland);
    let mut gui = Context::new();

    let mut adapter = Adapter::with_framebuffer(window.clone(), context, onscreen, &mut gui, AdapterConfig::default());
    assert_eq!(adapter.backend(), Backend::Wayland);
    assert!(!window.is_native());
    assert_eq!(probe.count(|c| matches!(c, Call::SetForeignWindow(_) | Call::NewOnscreen { .. })), 0);

    adapter.new_frame(&mut gui);
    gui.draw_list().filled_rect(common::rect(0.0, 0.0, 4.0, 4.0), imbridge_core::Color::WHITE);
    adapter.render(&mut gui);
    assert_eq!(probe.draw_count(), 1);
}
