//! UI Unit and Calc Tests
//!
//! Tests for:
//! - Resolution of px / % / vw / vh / rem / em against a context
//! - Raw numbers authoring as px
//! - Calc: left-to-right evaluation, nesting, division by zero

use glam::Vec2;

use lumen::ui::{
    em, percent, px, rem, vh, vw, Axis, CalcOp, ResolveCtx, UiCalc, UiLength, UiSize, UiUnit,
    ROOT_FONT_SIZE,
};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn ctx_1280x720() -> ResolveCtx {
    ResolveCtx {
        viewport: Vec2::new(1280.0, 720.0),
        parent_size: Vec2::new(400.0, 300.0),
        parent_font_size: 20.0,
    }
}

fn resolve(length: &UiLength, ctx: &ResolveCtx, axis: Axis) -> f32 {
    let mut divided = false;
    let value = length.resolve(ctx, axis, &mut divided);
    assert!(!divided, "no division by zero expected here");
    value
}

// ============================================================================
// Units
// ============================================================================

#[test]
fn px_resolves_to_itself() {
    let ctx = ctx_1280x720();
    assert!(approx(resolve(&px(42.0), &ctx, Axis::Horizontal), 42.0));
}

#[test]
fn percent_uses_the_parent_axis() {
    let ctx = ctx_1280x720();
    assert!(approx(resolve(&percent(50.0), &ctx, Axis::Horizontal), 200.0));
    assert!(approx(resolve(&percent(50.0), &ctx, Axis::Vertical), 150.0));
}

#[test]
fn percent_boundaries() {
    let ctx = ctx_1280x720();
    assert!(approx(resolve(&percent(0.0), &ctx, Axis::Horizontal), 0.0));
    assert!(approx(resolve(&percent(100.0), &ctx, Axis::Horizontal), 400.0));
    assert!(approx(resolve(&percent(100.0), &ctx, Axis::Vertical), 300.0));
}

#[test]
fn vw_vh_use_the_viewport() {
    let ctx = ctx_1280x720();
    assert!(approx(resolve(&vw(100.0), &ctx, Axis::Horizontal), 1280.0));
    assert!(approx(resolve(&vw(50.0), &ctx, Axis::Vertical), 640.0));
    assert!(approx(resolve(&vh(100.0), &ctx, Axis::Horizontal), 720.0));
    assert!(approx(resolve(&vh(10.0), &ctx, Axis::Vertical), 72.0));
}

#[test]
fn vw_tracks_viewport_resize() {
    let mut ctx = ctx_1280x720();
    assert!(approx(resolve(&vw(100.0), &ctx, Axis::Horizontal), 1280.0));
    ctx.viewport = Vec2::new(1920.0, 1080.0);
    assert!(approx(resolve(&vw(100.0), &ctx, Axis::Horizontal), 1920.0));
}

#[test]
fn rem_uses_root_font_size() {
    let ctx = ctx_1280x720();
    assert!(approx(
        resolve(&rem(2.0), &ctx, Axis::Horizontal),
        2.0 * ROOT_FONT_SIZE
    ));
}

#[test]
fn em_uses_parent_font_size() {
    let ctx = ctx_1280x720();
    assert!(approx(resolve(&em(1.5), &ctx, Axis::Horizontal), 30.0));
}

#[test]
fn raw_number_authors_as_px() {
    let length: UiLength = 77.0f32.into();
    let ctx = ctx_1280x720();
    assert!(approx(resolve(&length, &ctx, Axis::Horizontal), 77.0));
    assert_eq!(length, px(77.0));
}

// ============================================================================
// Calc
// ============================================================================

#[test]
fn calc_basic_ops() {
    let ctx = ctx_1280x720();
    let cases = [
        (CalcOp::Add, 130.0),
        (CalcOp::Sub, 70.0),
        (CalcOp::Mul, 3000.0),
        (CalcOp::Div, 100.0 / 30.0),
    ];
    for (op, expected) in cases {
        let calc: UiLength = UiCalc::new(px(100.0), op, px(30.0)).into();
        assert!(
            approx(resolve(&calc, &ctx, Axis::Horizontal), expected),
            "op {op:?}"
        );
    }
}

#[test]
fn calc_mixes_units() {
    let ctx = ctx_1280x720();
    // 50vw - 300px = 640 - 300 = 340 (window centering for a 600px element)
    let calc: UiLength = UiCalc::new(vw(50.0), CalcOp::Sub, px(300.0)).into();
    assert!(approx(resolve(&calc, &ctx, Axis::Horizontal), 340.0));

    // The same centering authored with a negative addend.
    let calc: UiLength = UiCalc::new(vw(50.0), CalcOp::Add, px(-300.0)).into();
    assert!(approx(resolve(&calc, &ctx, Axis::Horizontal), 340.0));
}

#[test]
fn nested_calc_expresses_grouping() {
    let ctx = ctx_1280x720();
    // (100 + 20) * 2 = 240: nesting, not precedence.
    let inner = UiCalc::new(px(100.0), CalcOp::Add, px(20.0));
    let outer: UiLength = UiCalc::new(inner, CalcOp::Mul, 2.0).into();
    assert!(approx(resolve(&outer, &ctx, Axis::Horizontal), 240.0));
}

#[test]
fn calc_chain_evaluates_left_to_right_without_precedence() {
    let ctx = ctx_1280x720();
    // Authored as ((2 + 3) * 4): a left-to-right chain, result 20 and not
    // the precedence answer 14.
    let chain = UiCalc::new(
        UiCalc::new(UiSize::new(2.0, UiUnit::Px), CalcOp::Add, 3.0),
        CalcOp::Mul,
        4.0,
    );
    let length: UiLength = chain.into();
    assert!(approx(resolve(&length, &ctx, Axis::Horizontal), 20.0));
}

#[test]
fn division_by_zero_yields_zero_with_flag() {
    let ctx = ctx_1280x720();
    let calc: UiLength = UiCalc::new(px(100.0), CalcOp::Div, px(0.0)).into();

    let mut divided = false;
    let value = calc.resolve(&ctx, Axis::Horizontal, &mut divided);
    assert!(approx(value, 0.0));
    assert!(divided, "division by zero must be reported");
}

#[test]
fn division_by_zero_inside_nested_operand_propagates() {
    let ctx = ctx_1280x720();
    let inner = UiCalc::new(px(10.0), CalcOp::Div, 0.0);
    let outer: UiLength = UiCalc::new(inner, CalcOp::Add, px(5.0)).into();

    let mut divided = false;
    let value = outer.resolve(&ctx, Axis::Horizontal, &mut divided);
    assert!(approx(value, 5.0), "0 + 5 after the failed division");
    assert!(divided);
}
