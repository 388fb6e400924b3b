//! Flex and Grid Layout Tests
//!
//! Tests for:
//! - Main-axis placement with gaps and every justify mode
//! - Cross-axis alignment including stretch
//! - Reverse directions
//! - Grid cell math and cell-relative child compilation

use glam::Vec2;

use lumen::ui::flex::{self, AlignItems, FlexChild, FlexDirection, FlexProps, JustifyContent};
use lumen::ui::grid::{self, GridProps};
use lumen::ui::{percent, px, Panel, UiHandle, UiKind, UiManager};

const EPSILON: f32 = 1e-3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn three_children(main: f32, cross: f32) -> Vec<FlexChild> {
    vec![
        FlexChild {
            main_size: main,
            cross_size: cross,
            stretchable: false,
        };
        3
    ]
}

// ============================================================================
// Flex: justify
// ============================================================================

#[test]
fn space_between_distributes_free_space() {
    // Inner width 600, three 100-wide children, gap 0.
    let props = FlexProps {
        justify: JustifyContent::SpaceBetween,
        ..Default::default()
    };
    let placements = flex::layout(&props, 600.0, 100.0, &three_children(100.0, 50.0));
    let offsets: Vec<f32> = placements.iter().map(|p| p.main_offset).collect();
    assert!(approx(offsets[0], 0.0));
    assert!(approx(offsets[1], 250.0));
    assert!(approx(offsets[2], 500.0));
}

#[test]
fn flex_start_packs_with_gap() {
    let props = FlexProps {
        gap: 10.0,
        ..Default::default()
    };
    let placements = flex::layout(&props, 600.0, 100.0, &three_children(100.0, 50.0));
    let offsets: Vec<f32> = placements.iter().map(|p| p.main_offset).collect();
    assert!(approx(offsets[0], 0.0));
    assert!(approx(offsets[1], 110.0));
    assert!(approx(offsets[2], 220.0));
}

#[test]
fn flex_end_right_aligns() {
    let props = FlexProps {
        justify: JustifyContent::FlexEnd,
        ..Default::default()
    };
    let placements = flex::layout(&props, 600.0, 100.0, &three_children(100.0, 50.0));
    assert!(approx(placements[0].main_offset, 300.0));
    assert!(approx(placements[2].main_offset, 500.0));
}

#[test]
fn center_splits_free_space() {
    let props = FlexProps {
        justify: JustifyContent::Center,
        ..Default::default()
    };
    let placements = flex::layout(&props, 600.0, 100.0, &three_children(100.0, 50.0));
    assert!(approx(placements[0].main_offset, 150.0));
    assert!(approx(placements[2].main_offset, 350.0));
}

#[test]
fn space_around_puts_half_units_at_the_edges() {
    let props = FlexProps {
        justify: JustifyContent::SpaceAround,
        ..Default::default()
    };
    let placements = flex::layout(&props, 600.0, 100.0, &three_children(100.0, 50.0));
    // free = 300, unit = 100: offsets 50, 250, 450.
    assert!(approx(placements[0].main_offset, 50.0));
    assert!(approx(placements[1].main_offset, 250.0));
    assert!(approx(placements[2].main_offset, 450.0));
}

#[test]
fn space_evenly_spreads_equal_gaps() {
    let props = FlexProps {
        justify: JustifyContent::SpaceEvenly,
        ..Default::default()
    };
    let placements = flex::layout(&props, 600.0, 100.0, &three_children(100.0, 50.0));
    // free = 300, unit = 75: offsets 75, 250, 425.
    assert!(approx(placements[0].main_offset, 75.0));
    assert!(approx(placements[1].main_offset, 250.0));
    assert!(approx(placements[2].main_offset, 425.0));
}

// ============================================================================
// Flex: cross axis and reverse
// ============================================================================

#[test]
fn stretch_expands_only_unsized_children() {
    let props = FlexProps {
        align: AlignItems::Stretch,
        ..Default::default()
    };
    let children = vec![
        FlexChild {
            main_size: 100.0,
            cross_size: 40.0,
            stretchable: true,
        },
        FlexChild {
            main_size: 100.0,
            cross_size: 40.0,
            stretchable: false,
        },
    ];
    let placements = flex::layout(&props, 600.0, 120.0, &children);
    assert!(approx(placements[0].cross_size, 120.0), "unsized child stretches");
    assert!(approx(placements[1].cross_size, 40.0), "authored size kept");
}

#[test]
fn cross_axis_center_and_end() {
    let children = three_children(100.0, 40.0);

    let center = FlexProps {
        align: AlignItems::Center,
        ..Default::default()
    };
    let placements = flex::layout(&center, 600.0, 120.0, &children);
    assert!(approx(placements[0].cross_offset, 40.0));

    let end = FlexProps {
        align: AlignItems::FlexEnd,
        ..Default::default()
    };
    let placements = flex::layout(&end, 600.0, 120.0, &children);
    assert!(approx(placements[0].cross_offset, 80.0));
}

#[test]
fn row_reverse_flips_visual_order() {
    let props = FlexProps {
        direction: FlexDirection::RowReverse,
        ..Default::default()
    };
    let placements = flex::layout(&props, 600.0, 100.0, &three_children(100.0, 50.0));
    // First child lands last visually.
    assert!(approx(placements[0].main_offset, 200.0));
    assert!(approx(placements[2].main_offset, 0.0));
}

// ============================================================================
// Flex: through the manager
// ============================================================================

fn sized_panel(ui: &mut UiManager, w: f32, h: f32) -> UiHandle {
    let handle = ui.create(UiKind::Panel(Panel::default()));
    let base = &mut ui.get_mut(handle).unwrap().base;
    base.width = Some(px(w));
    base.height = Some(px(h));
    handle
}

#[test]
fn flex_container_places_children_in_absolute_pixels() {
    let mut ui = UiManager::new(Vec2::new(1280.0, 720.0));
    let container = ui.create(UiKind::Flex(FlexProps {
        justify: JustifyContent::SpaceBetween,
        ..Default::default()
    }));
    {
        let base = &mut ui.get_mut(container).unwrap().base;
        base.x = Some(px(40.0));
        base.y = Some(px(20.0));
        base.width = Some(px(600.0));
        base.height = Some(px(100.0));
    }
    let children: Vec<UiHandle> = (0..3).map(|_| sized_panel(&mut ui, 100.0, 50.0)).collect();
    for &child in &children {
        ui.add_child(container, child);
    }
    ui.add_element(container);
    ui.compile();

    let xs: Vec<f32> = children
        .iter()
        .map(|&c| ui.get(c).unwrap().base.compiled_x)
        .collect();
    assert!(approx(xs[0], 40.0));
    assert!(approx(xs[1], 290.0));
    assert!(approx(xs[2], 540.0));
    for &child in &children {
        assert!(approx(ui.get(child).unwrap().base.compiled_y, 20.0));
    }
}

#[test]
fn column_flex_uses_height_as_main_axis() {
    let mut ui = UiManager::new(Vec2::new(1280.0, 720.0));
    let container = ui.create(UiKind::Flex(FlexProps {
        direction: FlexDirection::Column,
        gap: 10.0,
        ..Default::default()
    }));
    {
        let base = &mut ui.get_mut(container).unwrap().base;
        base.width = Some(px(200.0));
        base.height = Some(px(500.0));
    }
    let a = sized_panel(&mut ui, 200.0, 50.0);
    let b = sized_panel(&mut ui, 200.0, 50.0);
    ui.add_child(container, a);
    ui.add_child(container, b);
    ui.add_element(container);
    ui.compile();

    assert!(approx(ui.get(a).unwrap().base.compiled_y, 0.0));
    assert!(approx(ui.get(b).unwrap().base.compiled_y, 60.0));
}

// ============================================================================
// Grid
// ============================================================================

#[test]
fn grid_cell_math_with_gaps() {
    let props = GridProps {
        columns: 3,
        rows: None,
        column_gap: 10.0,
        row_gap: 20.0,
    };
    // 6 children: 3 columns x 2 rows. Inner 320x220.
    let cells = grid::cell_rects(&props, Vec2::new(320.0, 220.0), 6);
    assert_eq!(cells.len(), 6);

    // cw = (320 - 2*10) / 3 = 100; ch = (220 - 20) / 2 = 100.
    let (offset, cell) = cells[0];
    assert!(approx(cell.x, 100.0) && approx(cell.y, 100.0));
    assert!(approx(offset.x, 0.0) && approx(offset.y, 0.0));

    let (offset, _) = cells[4]; // column 1, row 1
    assert!(approx(offset.x, 110.0));
    assert!(approx(offset.y, 120.0));
}

#[test]
fn grid_rows_default_to_ceil_of_children_over_columns() {
    let props = GridProps::new(4);
    let cells = grid::cell_rects(&props, Vec2::new(400.0, 300.0), 10);
    // ceil(10/4) = 3 rows; cell height 100.
    assert!(approx(cells[0].1.y, 100.0));
    // Child 9 sits at column 1, row 2.
    assert!(approx(cells[9].0.x, 100.0));
    assert!(approx(cells[9].0.y, 200.0));
}

#[test]
fn grid_children_compile_against_their_cell() {
    let mut ui = UiManager::new(Vec2::new(1280.0, 720.0));
    let container = ui.create(UiKind::Grid(GridProps::new(2).with_gap(0.0)));
    {
        let base = &mut ui.get_mut(container).unwrap().base;
        base.width = Some(px(400.0));
        base.height = Some(px(200.0));
    }
    let child = ui.create(UiKind::Panel(Panel::default()));
    {
        let base = &mut ui.get_mut(child).unwrap().base;
        // Percent of the cell (200x200), not of the whole container.
        base.width = Some(percent(50.0));
        base.height = Some(percent(100.0));
    }
    let sibling = ui.create(UiKind::Panel(Panel::default()));
    ui.add_child(container, child);
    ui.add_child(container, sibling);
    ui.add_element(container);
    ui.compile();

    let base = &ui.get(child).unwrap().base;
    assert!(approx(base.compiled_width, 100.0));
    assert!(approx(base.compiled_height, 200.0));

    // The second child starts at its cell origin.
    let base = &ui.get(sibling).unwrap().base;
    assert!(approx(base.compiled_x, 200.0));
}

#[test]
fn grid_columns_minimum_is_one() {
    let props = GridProps::new(0);
    assert_eq!(props.columns, 1);
}
