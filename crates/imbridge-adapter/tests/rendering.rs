mod common;

use std::{cell::Cell, rc::Rc};

use common::{harness, harness_with, quad_list, rect};
use imbridge_adapter::{
    graphics::{Context as _, Framebuffer, PixelFormat},
    AdapterConfig,
};
use imbridge_core::{Color, DrawCallback, DrawData, DrawList, TextureId, Vec2};
use imbridge_headless::{Call, HeadlessWindow, ObjectKind};

fn frame_data(h: &common::Harness, lists: Vec<DrawList>) -> DrawData {
    let mut data = DrawData::new(h.gui.io().display_size, h.gui.io().display_framebuffer_scale);
    for list in lists {
        data.push(list);
    }
    data
}

#[test]
fn zero_sized_target_issues_no_graphics_calls() {
    let mut h = harness(640, 480);
    h.new_frame();
    h.probe.clear_calls();

    let list = quad_list(rect(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    h.adapter.render_draw_data(&{
        let mut d = DrawData::new(Vec2::new(640.0, 480.0), Vec2::ZERO);
        d.push(list.clone());
        d
    });
    h.adapter.render_draw_data(&{
        let mut d = DrawData::new(Vec2::new(0.0, 480.0), Vec2::ONE);
        d.push(list);
        d
    });
    assert!(h.probe.calls().is_empty());
}

#[test]
fn batch_without_commands_uploads_but_never_draws() {
    let mut h = harness(640, 480);
    h.new_frame();
    let live_before = h.probe.total_live();
    h.probe.clear_calls();

    let mut list = quad_list(rect(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    list.cmd_buf.clear();
    assert!(!list.vtx_buf.is_empty() && !list.idx_buf.is_empty());
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    assert_eq!(h.probe.count(|c| matches!(c, Call::NewAttributeBuffer { .. })), 1);
    assert_eq!(h.probe.count(|c| matches!(c, Call::NewAttribute { .. })), 3);
    assert_eq!(h.probe.count(|c| matches!(c, Call::NewPrimitive { .. })), 1);
    assert_eq!(h.probe.count(|c| matches!(c, Call::NewIndices { .. })), 1);
    assert_eq!(h.probe.count(|c| matches!(c, Call::SetPrimitiveIndices { .. })), 0);
    assert_eq!(h.probe.draw_count(), 0);
    assert_eq!(h.probe.calls().last(), Some(&Call::Flush));
    assert_eq!(h.probe.total_live(), live_before);
}

#[test]
fn zero_count_commands_draw_nothing_visible() {
    let mut h = harness(64, 64);
    h.new_frame();
    h.adapter.framebuffer_mut().clear(Color::BLACK);
    let live_before = h.probe.total_live();
    h.probe.clear_calls();

    let mut list = quad_list(rect(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    for cmd in &mut list.cmd_buf {
        cmd.elem_count = 0;
    }
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    assert_eq!(h.probe.count(|c| matches!(c, Call::SetPrimitiveIndices { n_indices: 0 })), 1);
    assert_eq!(h.probe.count(|c| matches!(c, Call::Draw { n_indices: 0, .. })), 1);
    assert_eq!(h.adapter.framebuffer().pixel(4, 4), Some([0, 0, 0, 255]));
    assert_eq!(h.probe.total_live(), live_before);
}

#[test]
fn batch_objects_are_released_per_batch() {
    let mut h = harness(640, 480);
    h.new_frame();
    let lists = (0..3).map(|i| quad_list(rect(i as f32 * 20.0, 0.0, 10.0, 10.0), Color::WHITE)).collect();
    let data = frame_data(&h, lists);
    h.adapter.render_draw_data(&data);

    assert_eq!(h.probe.draw_count(), 3);
    for kind in [ObjectKind::AttributeBuffer, ObjectKind::Attribute, ObjectKind::Indices, ObjectKind::Primitive] {
        assert_eq!(h.probe.live(kind), 0, "{kind:?}");
    }
    assert_eq!(h.probe.created(ObjectKind::Attribute), 9);
}

#[test]
fn command_sequence_follows_draw_data() {
    let mut h = harness(640, 480);
    h.new_frame();
    h.probe.clear_calls();

    let mut list = DrawList::new();
    list.filled_rect(rect(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    list.push_clip_rect(rect(5.0, 6.0, 100.0, 50.0));
    list.filled_rect(rect(10.0, 10.0, 10.0, 10.0), Color::WHITE);
    list.filled_rect(rect(30.0, 10.0, 10.0, 10.0), Color::WHITE);
    list.pop_clip_rect();
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    let fb: Vec<Call> = h.probe.calls().into_iter().filter(Call::is_framebuffer_op).collect();
    assert_eq!(fb.first(), Some(&Call::Orthographic { x1: 0.0, y1: 0.0, x2: 640.0, y2: 480.0, near: -1.0, far: 1.0 }));
    assert_eq!(fb.last(), Some(&Call::Flush));

    // The trailing command left by the final pop is empty but still drawn.
    let draws: Vec<&Call> = fb.iter().filter(|c| matches!(c, Call::Draw { .. })).collect();
    assert_eq!(draws.len(), 3);
    let idx = std::mem::size_of::<imbridge_core::DrawIdx>();
    assert!(matches!(draws[0], Call::Draw { n_indices: 6, index_offset: 0, .. }));
    assert!(matches!(draws[1], Call::Draw { n_indices: 12, index_offset, .. } if *index_offset == 6 * idx));
    assert!(matches!(draws[2], Call::Draw { n_indices: 0, index_offset, .. } if *index_offset == 18 * idx));

    assert!(fb.contains(&Call::PushScissor { x: 5, y: 6, width: 100, height: 50 }));
    let pushes = fb.iter().filter(|c| matches!(c, Call::PushScissor { .. })).count();
    let pops = fb.iter().filter(|c| matches!(c, Call::PopClip)).count();
    assert_eq!((pushes, pops), (3, 3));
    assert_eq!(h.adapter.framebuffer().clip_depth(), 0);
}

#[test]
fn scissor_is_scaled_to_framebuffer_pixels() {
    let window = HeadlessWindow::new(320, 240);
    window.set_scale_factor(2);
    let mut h = harness_with(window, AdapterConfig::default());
    h.new_frame();
    h.probe.clear_calls();

    let mut list = DrawList::new();
    list.push_clip_rect(rect(10.0, 20.0, 30.0, 40.0));
    list.filled_rect(rect(10.0, 20.0, 30.0, 40.0), Color::WHITE);
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    assert!(h.probe.calls().contains(&Call::PushScissor { x: 20, y: 40, width: 60, height: 80 }));
    assert!(h.probe.calls().contains(&Call::Orthographic { x1: 0.0, y1: 0.0, x2: 320.0, y2: 240.0, near: -1.0, far: 1.0 }));
}

#[test]
fn fractional_clip_rects_truncate_toward_zero() {
    let mut h = harness(640, 480);
    h.new_frame();
    h.probe.clear_calls();

    let mut list = DrawList::new();
    list.push_clip_rect(rect(2.5, 3.75, 10.5, 4.5));
    list.filled_rect(rect(0.0, 0.0, 16.0, 16.0), Color::WHITE);
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    assert!(h.probe.calls().contains(&Call::PushScissor { x: 2, y: 3, width: 10, height: 4 }));
}

#[test]
fn callbacks_replace_the_draw() {
    let mut h = harness(640, 480);
    h.new_frame();
    h.probe.clear_calls();

    let hits = Rc::new(Cell::new(0));
    let seen = hits.clone();
    let mut list = quad_list(rect(0.0, 0.0, 10.0, 10.0), Color::WHITE);
    list.add_callback(DrawCallback::new(move |_, cmd| {
        assert_eq!(cmd.elem_count, 0);
        seen.set(seen.get() + 1);
    }));
    list.filled_rect(rect(20.0, 0.0, 10.0, 10.0), Color::WHITE);
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    assert_eq!(hits.get(), 1);
    assert_eq!(h.probe.draw_count(), 2);
    // Indices are still rebound for the callback command.
    assert_eq!(h.probe.count(|c| matches!(c, Call::SetPrimitiveIndices { .. })), 3);
}

#[test]
fn textures_resolve_through_the_registry() {
    let mut h = harness(64, 64);
    h.new_frame();

    let texture = h.adapter.context_mut().new_texture_2d(1, 1, PixelFormat::Rgba8888, 4, &[255, 0, 0, 255]).unwrap();
    let serial = texture.serial();
    let id = h.adapter.register_texture(texture);
    assert!(id.0 >= TextureId::FIRST_USER.0);
    h.probe.clear_calls();

    let mut list = DrawList::new();
    list.image_quad(id, Vec2::ZERO, Vec2::splat(8.0), Vec2::ZERO, Vec2::ONE, Color::WHITE);
    list.image_quad(TextureId(999), Vec2::ZERO, Vec2::splat(8.0), Vec2::ZERO, Vec2::ONE, Color::WHITE);
    list.filled_rect(rect(0.0, 0.0, 4.0, 4.0), Color::WHITE);
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    let binds: Vec<Option<u64>> = h.probe.calls().into_iter()
        .filter_map(|c| match c { Call::SetLayerTexture { texture, .. } => Some(texture), _ => None })
        .collect();
    assert_eq!(binds, vec![Some(serial), None, None]);

    let gone = h.adapter.unregister_texture(id);
    assert_eq!(gone.map(|t| t.serial()), Some(serial));
    assert!(h.adapter.unregister_texture(TextureId::FONT).is_none());
}

#[test]
fn rasterised_output_respects_the_scissor() {
    let mut h = harness(64, 64);
    h.new_frame();
    h.adapter.framebuffer_mut().clear(Color::BLACK);

    let mut list = DrawList::new();
    list.push_clip_rect(rect(0.0, 0.0, 16.0, 64.0));
    list.filled_rect(rect(0.0, 0.0, 32.0, 32.0), Color::rgb(1.0, 0.0, 0.0));
    list.pop_clip_rect();
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    let fb = h.adapter.framebuffer();
    assert_eq!(fb.pixel(8, 8), Some([255, 0, 0, 255]));
    assert_eq!(fb.pixel(24, 8), Some([0, 0, 0, 255]), "outside the scissor");
    assert_eq!(fb.pixel(8, 40), Some([0, 0, 0, 255]), "outside the quad");
}

#[test]
fn font_texture_modulates_textured_draws() {
    let mut h = harness(64, 64);
    h.new_frame();
    h.adapter.framebuffer_mut().clear(Color::BLACK);

    // The default atlas is white only in its top-left corner.
    let mut list = DrawList::new();
    list.image_quad(TextureId::FONT, Vec2::ZERO, Vec2::splat(8.0), Vec2::ZERO, Vec2::splat(0.01), Color::rgb(0.0, 1.0, 0.0));
    list.image_quad(TextureId::FONT, Vec2::new(16.0, 0.0), Vec2::new(24.0, 8.0), Vec2::splat(0.5), Vec2::splat(0.6), Color::rgb(0.0, 1.0, 0.0));
    let data = frame_data(&h, vec![list]);
    h.adapter.render_draw_data(&data);

    let fb = h.adapter.framebuffer();
    assert_eq!(fb.pixel(4, 4), Some([0, 255, 0, 255]));
    assert_eq!(fb.pixel(20, 4), Some([0, 0, 0, 255]), "transparent atlas texels");
}

#[test]
fn missing_device_objects_skip_the_frame() {
    let mut h = harness(64, 64);
    h.probe.clear_calls();
    let data = frame_data(&h, vec![quad_list(rect(0.0, 0.0, 8.0, 8.0), Color::WHITE)]);
    h.adapter.render_draw_data(&DrawData { display_size: Vec2::splat(64.0), ..data });
    assert!(h.probe.calls().is_empty());
}

#[test]
fn render_consumes_the_gui_frame() {
    let mut h = harness(64, 64);
    h.new_frame();
    h.gui.draw_list().filled_rect(rect(0.0, 0.0, 8.0, 8.0), Color::WHITE);
    h.adapter.render(&mut h.gui);
    assert_eq!(h.probe.draw_count(), 1);
    assert!(!h.gui.frame_started());
    h.adapter.framebuffer_mut().swap_buffers();
    assert_eq!(h.adapter.framebuffer().swap_count(), 1);
}
