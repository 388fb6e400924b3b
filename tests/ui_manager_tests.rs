//! UI Manager Tests
//!
//! Tests for:
//! - Layer-sorted, insertion-stable render order
//! - Dropdown open/close layer promotion and occlusion
//! - Reverse-order hit-testing with event emission
//! - Slider mouse capture

use glam::Vec2;

use lumen::ui::{
    px, Checkbox, Dropdown, DrawCommand, Panel, Slider, UiEvent, UiHandle, UiKind, UiManager,
    LAYER_DROPDOWN, LAYER_DROPDOWN_OPEN,
};

fn manager() -> UiManager {
    UiManager::new(Vec2::new(1280.0, 720.0))
}

fn place(ui: &mut UiManager, handle: UiHandle, x: f32, y: f32, w: f32, h: f32) {
    let base = &mut ui.get_mut(handle).unwrap().base;
    base.x = Some(px(x));
    base.y = Some(px(y));
    base.width = Some(px(w));
    base.height = Some(px(h));
}

// ============================================================================
// Render order
// ============================================================================

#[test]
fn render_order_is_stable_sort_by_layer() {
    let mut ui = manager();
    let a = ui.create(UiKind::Panel(Panel::default()));
    let b = ui.create(UiKind::Panel(Panel::default()));
    let c = ui.create(UiKind::Panel(Panel::default()));

    ui.get_mut(a).unwrap().base.layer = 100;
    ui.get_mut(b).unwrap().base.layer = 50;
    ui.get_mut(c).unwrap().base.layer = 100;

    for h in [a, b, c] {
        ui.add_element(h);
    }

    // Ascending layer; a before c because a was inserted first.
    assert_eq!(ui.render_order(), vec![b, a, c]);
}

#[test]
fn children_are_collected_recursively() {
    let mut ui = manager();
    let root = ui.create(UiKind::Panel(Panel::default()));
    let child = ui.create(UiKind::Panel(Panel::default()));
    let grandchild = ui.create(UiKind::Panel(Panel::default()));
    ui.add_child(root, child);
    ui.add_child(child, grandchild);
    ui.add_element(root);

    let order = ui.render_order();
    assert_eq!(order.len(), 3);
    assert!(order.contains(&grandchild));
}

#[test]
fn invisible_subtrees_are_skipped() {
    let mut ui = manager();
    let root = ui.create(UiKind::Panel(Panel::default()));
    let child = ui.create(UiKind::Panel(Panel::default()));
    ui.add_child(root, child);
    ui.add_element(root);
    ui.get_mut(root).unwrap().base.visible = false;

    assert!(ui.render_order().is_empty());
}

// ============================================================================
// Dropdown layering and occlusion
// ============================================================================

#[test]
fn open_dropdown_raises_its_layer_above_siblings() {
    let mut ui = manager();
    let checkbox = ui.create(UiKind::Checkbox(Checkbox::new("Shadows", true)));
    let dropdown = ui.create(UiKind::Dropdown(Dropdown::new(
        vec!["Low".into(), "High".into(), "Ultra".into()],
        0,
    )));
    place(&mut ui, checkbox, 100.0, 140.0, 150.0, 24.0);
    place(&mut ui, dropdown, 100.0, 100.0, 150.0, 24.0);
    ui.add_element(checkbox);
    ui.add_element(dropdown);
    ui.compile();

    assert_eq!(ui.get(dropdown).unwrap().base.layer, LAYER_DROPDOWN);

    // Click the header: opens and promotes the layer.
    ui.on_mouse_button(true, Vec2::new(110.0, 110.0));
    assert!(ui.dropdown(dropdown).unwrap().open);
    assert_eq!(ui.get(dropdown).unwrap().base.layer, LAYER_DROPDOWN_OPEN);
    assert!(ui.get(dropdown).unwrap().base.layer >= ui.get(checkbox).unwrap().base.layer);

    // Every dropdown quad now renders after the checkbox.
    let order = ui.render_order();
    let checkbox_pos = order.iter().position(|h| *h == checkbox).unwrap();
    let dropdown_pos = order.iter().position(|h| *h == dropdown).unwrap();
    assert!(dropdown_pos > checkbox_pos);
}

#[test]
fn open_dropdown_draws_an_opaque_cover_over_the_expanded_region() {
    let mut ui = manager();
    let checkbox = ui.create(UiKind::Checkbox(Checkbox::new("Shadows", true)));
    let dropdown = ui.create(UiKind::Dropdown(Dropdown::new(
        vec!["Low".into(), "High".into(), "Ultra".into()],
        0,
    )));
    // The expanded list (3 rows of 24px below y=124) overlaps the checkbox.
    place(&mut ui, checkbox, 100.0, 140.0, 150.0, 24.0);
    place(&mut ui, dropdown, 100.0, 100.0, 150.0, 24.0);
    ui.add_element(checkbox);
    ui.add_element(dropdown);
    ui.compile();
    ui.on_mouse_button(true, Vec2::new(110.0, 110.0));

    let list = ui.build_draw_list();
    let cover = list
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect(rect) => Some(rect),
            DrawCommand::Text(_) => None,
        })
        .find(|rect| {
            rect.color.w >= 1.0
                && rect.min.y >= 123.9
                && rect.max.y >= 195.9
                && rect.min.x <= 100.1
                && rect.max.x >= 249.9
        })
        .expect("opaque cover rect over the expanded region");

    // The cover fully contains the checkbox's intersection with the list.
    assert!(cover.min.y <= 140.0);
    assert!(cover.max.y >= 164.0);
}

#[test]
fn selecting_an_option_closes_and_demotes_the_dropdown() {
    let mut ui = manager();
    let dropdown = ui.create(UiKind::Dropdown(Dropdown::new(
        vec!["Low".into(), "High".into()],
        0,
    )));
    place(&mut ui, dropdown, 0.0, 0.0, 100.0, 20.0);
    ui.add_element(dropdown);
    ui.compile();

    ui.on_mouse_button(true, Vec2::new(10.0, 10.0)); // open
    // Click the second option row (rows start at y=20, 20px tall).
    ui.on_mouse_button(true, Vec2::new(10.0, 50.0));

    assert!(!ui.dropdown(dropdown).unwrap().open);
    assert_eq!(ui.dropdown(dropdown).unwrap().selected, 1);
    assert_eq!(ui.get(dropdown).unwrap().base.layer, LAYER_DROPDOWN);
    assert_eq!(
        ui.poll_events(),
        vec![UiEvent::DropdownSelected(dropdown, 1)]
    );
}

// ============================================================================
// Hit-testing
// ============================================================================

#[test]
fn topmost_element_consumes_the_click() {
    let mut ui = manager();
    let below = ui.create(UiKind::Checkbox(Checkbox::new("Below", false)));
    let above = ui.create(UiKind::Checkbox(Checkbox::new("Above", false)));
    place(&mut ui, below, 0.0, 0.0, 100.0, 30.0);
    place(&mut ui, above, 0.0, 0.0, 100.0, 30.0);
    ui.get_mut(above).unwrap().base.layer = 500;
    ui.add_element(below);
    ui.add_element(above);
    ui.compile();

    assert!(ui.on_mouse_button(true, Vec2::new(10.0, 10.0)));
    let events = ui.poll_events();
    assert_eq!(events, vec![UiEvent::CheckboxToggled(above, true)]);
}

#[test]
fn click_outside_everything_is_not_consumed() {
    let mut ui = manager();
    let panel = ui.create(UiKind::Panel(Panel::default()));
    place(&mut ui, panel, 0.0, 0.0, 100.0, 100.0);
    ui.add_element(panel);
    ui.compile();

    assert!(!ui.on_mouse_button(true, Vec2::new(500.0, 500.0)));
    assert!(ui.on_mouse_button(true, Vec2::new(50.0, 50.0)));
}

#[test]
fn button_fires_on_release_inside() {
    let mut ui = manager();
    let button = ui.create(UiKind::Button(lumen::ui::Button::new("Apply")));
    place(&mut ui, button, 0.0, 0.0, 120.0, 32.0);
    ui.add_element(button);
    ui.compile();

    ui.on_mouse_button(true, Vec2::new(20.0, 10.0));
    assert!(ui.poll_events().is_empty(), "no event until release");
    ui.on_mouse_button(false, Vec2::new(20.0, 10.0));
    assert_eq!(ui.poll_events(), vec![UiEvent::ButtonClicked(button)]);
}

// ============================================================================
// Slider capture
// ============================================================================

#[test]
fn slider_captures_the_mouse_while_dragging() {
    let mut ui = manager();
    let slider = ui.create(UiKind::Slider(Slider::new(0.0, 100.0, 50.0)));
    place(&mut ui, slider, 0.0, 0.0, 200.0, 20.0);
    ui.add_element(slider);
    ui.compile();

    // Press at 25%.
    ui.on_mouse_button(true, Vec2::new(50.0, 10.0));
    let events = ui.poll_events();
    assert_eq!(events, vec![UiEvent::SliderChanged(slider, 25.0)]);

    // Dragging far outside the rect still updates (captured).
    assert!(ui.on_mouse_move(Vec2::new(400.0, 300.0)));
    let events = ui.poll_events();
    assert_eq!(events, vec![UiEvent::SliderChanged(slider, 100.0)]);

    // Release ends the capture; further movement is ignored.
    ui.on_mouse_button(false, Vec2::new(400.0, 300.0));
    ui.on_mouse_move(Vec2::new(100.0, 300.0));
    assert!(ui.poll_events().is_empty());
}

#[test]
fn checkbox_toggles_on_press() {
    let mut ui = manager();
    let checkbox = ui.create(UiKind::Checkbox(Checkbox::new("VSync", false)));
    place(&mut ui, checkbox, 0.0, 0.0, 100.0, 24.0);
    ui.add_element(checkbox);
    ui.compile();

    ui.on_mouse_button(true, Vec2::new(10.0, 10.0));
    assert_eq!(ui.poll_events(), vec![UiEvent::CheckboxToggled(checkbox, true)]);
    ui.on_mouse_button(false, Vec2::new(10.0, 10.0));
    ui.on_mouse_button(true, Vec2::new(10.0, 10.0));
    assert_eq!(ui.poll_events(), vec![UiEvent::CheckboxToggled(checkbox, false)]);
}
