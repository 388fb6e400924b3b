//! UI Size Compilation
//!
//! Turns authored sizes into absolute pixels. A tree compiles top-down so
//! children can read the parent's resolved dimensions for `%` and `em`.
//!
//! Per component the order is fixed: font size first (for `em`
//! inheritance), then width, then height (so width-driven aspect ratios
//! can compute height), then x, then y. Min/max clamp the authored axes
//! before aspect-ratio derivation; after derivation both axes re-clamp.
//!
//! Layout containers are the exception to pure top-down flow: flex
//! measures its children, places them (writing absolute x/y and stretched
//! cross sizes directly), and only then descends into grandchildren. Grid
//! children compile against their cell as parent.

use glam::Vec2;
use slotmap::SlotMap;

use crate::ui::component::{UiHandle, UiKind, UiNode};
use crate::ui::flex::{self, FlexChild, FlexProps};
use crate::ui::grid::{self, GridProps};
use crate::ui::unit::{Axis, ResolveCtx, ROOT_FONT_SIZE};

/// Resolved parent context a component compiles against.
#[derive(Debug, Clone, Copy)]
struct ParentCtx {
    origin: Vec2,
    size: Vec2,
    font_size: f32,
}

impl ParentCtx {
    fn resolve_ctx(&self, viewport: Vec2) -> ResolveCtx {
        ResolveCtx {
            viewport,
            parent_size: self.size,
            parent_font_size: self.font_size,
        }
    }
}

/// Compiles every root tree against the current viewport.
pub(crate) fn compile_tree(
    arena: &mut SlotMap<UiHandle, UiNode>,
    roots: &[UiHandle],
    viewport: Vec2,
) {
    let root_ctx = ParentCtx {
        origin: Vec2::ZERO,
        size: viewport,
        font_size: ROOT_FONT_SIZE,
    };
    for &root in roots {
        compile_recursive(arena, root, root_ctx, viewport);
    }
}

fn compile_recursive(
    arena: &mut SlotMap<UiHandle, UiNode>,
    handle: UiHandle,
    ctx: ParentCtx,
    viewport: Vec2,
) {
    if !arena.contains_key(handle) {
        return;
    }
    compile_sizes(arena, handle, ctx, viewport);
    compile_position(arena, handle, ctx, viewport);
    compile_children(arena, handle, viewport);
}

/// Container behavior copied out of the arena before child compilation.
enum ChildLayout {
    Flex(FlexProps),
    Grid(GridProps),
    Absolute,
}

/// Dispatches child compilation per container kind.
fn compile_children(arena: &mut SlotMap<UiHandle, UiNode>, handle: UiHandle, viewport: Vec2) {
    let (children, my_ctx, layout) = {
        let Some(node) = arena.get(handle) else {
            return;
        };
        let children: Vec<UiHandle> = node.children.to_vec();
        let my_ctx = ParentCtx {
            origin: Vec2::new(node.base.compiled_x, node.base.compiled_y),
            size: Vec2::new(node.base.compiled_width, node.base.compiled_height),
            font_size: node.base.compiled_font_size,
        };
        let layout = match &node.kind {
            UiKind::Flex(props) => ChildLayout::Flex(*props),
            UiKind::Grid(props) => ChildLayout::Grid(*props),
            _ => ChildLayout::Absolute,
        };
        (children, my_ctx, layout)
    };
    if children.is_empty() {
        return;
    }

    match layout {
        ChildLayout::Flex(props) => {
            compile_flex_children(arena, &children, &props, my_ctx, viewport);
        }
        ChildLayout::Grid(props) => {
            compile_grid_children(arena, &children, &props, my_ctx, viewport);
        }
        ChildLayout::Absolute => {
            for child in children {
                compile_recursive(arena, child, my_ctx, viewport);
            }
        }
    }
}

fn compile_flex_children(
    arena: &mut SlotMap<UiHandle, UiNode>,
    children: &[UiHandle],
    props: &FlexProps,
    ctx: ParentCtx,
    viewport: Vec2,
) {
    let horizontal = props.direction.is_horizontal();

    // 1. Measure: children compile their own sizes against the container.
    let mut measured = Vec::with_capacity(children.len());
    for &child in children {
        compile_sizes(arena, child, ctx, viewport);
        let base = &arena[child].base;
        let (main_size, cross_size) = if horizontal {
            (base.compiled_width, base.compiled_height)
        } else {
            (base.compiled_height, base.compiled_width)
        };
        let stretchable = if horizontal {
            base.height.is_none()
        } else {
            base.width.is_none()
        };
        measured.push(FlexChild {
            main_size,
            cross_size,
            stretchable,
        });
    }

    // 2. Place along main and cross axes.
    let (inner_main, inner_cross) = if horizontal {
        (ctx.size.x, ctx.size.y)
    } else {
        (ctx.size.y, ctx.size.x)
    };
    let placements = flex::layout(props, inner_main, inner_cross, &measured);

    // 3. Write absolute positions (and stretched sizes) back.
    for (&child, placement) in children.iter().zip(&placements) {
        let base = &mut arena[child].base;
        if horizontal {
            base.compiled_x = ctx.origin.x + placement.main_offset;
            base.compiled_y = ctx.origin.y + placement.cross_offset;
            base.compiled_height = placement.cross_size;
        } else {
            base.compiled_y = ctx.origin.y + placement.main_offset;
            base.compiled_x = ctx.origin.x + placement.cross_offset;
            base.compiled_width = placement.cross_size;
        }
        // 4. Grandchildren compile against the child's final geometry.
        compile_children(arena, child, viewport);
    }
}

fn compile_grid_children(
    arena: &mut SlotMap<UiHandle, UiNode>,
    children: &[UiHandle],
    props: &GridProps,
    ctx: ParentCtx,
    viewport: Vec2,
) {
    let cells = grid::cell_rects(props, ctx.size, children.len());
    for (&child, (offset, cell)) in children.iter().zip(&cells) {
        let cell_ctx = ParentCtx {
            origin: ctx.origin + *offset,
            size: *cell,
            font_size: ctx.font_size,
        };
        compile_recursive(arena, child, cell_ctx, viewport);
    }
}

// ============================================================================
// Per-component passes
// ============================================================================

fn compile_sizes(
    arena: &mut SlotMap<UiHandle, UiNode>,
    handle: UiHandle,
    ctx: ParentCtx,
    viewport: Vec2,
) {
    let rctx = ctx.resolve_ctx(viewport);
    let base = &mut arena[handle].base;
    let mut divided_by_zero = false;

    // Font size first: children inherit it through `em`.
    base.compiled_font_size = base
        .font_size
        .as_ref()
        .map_or(ctx.font_size, |l| l.resolve(&rctx, Axis::Vertical, &mut divided_by_zero));

    let authored_w = base
        .width
        .as_ref()
        .map(|l| l.resolve(&rctx, Axis::Horizontal, &mut divided_by_zero));
    let authored_h = base
        .height
        .as_ref()
        .map(|l| l.resolve(&rctx, Axis::Vertical, &mut divided_by_zero));

    let min_w = base
        .min_width
        .as_ref()
        .map(|l| l.resolve(&rctx, Axis::Horizontal, &mut divided_by_zero));
    let max_w = base
        .max_width
        .as_ref()
        .map(|l| l.resolve(&rctx, Axis::Horizontal, &mut divided_by_zero));
    let min_h = base
        .min_height
        .as_ref()
        .map(|l| l.resolve(&rctx, Axis::Vertical, &mut divided_by_zero));
    let max_h = base
        .max_height
        .as_ref()
        .map(|l| l.resolve(&rctx, Axis::Vertical, &mut divided_by_zero));

    let mut w = clamp_axis(authored_w.unwrap_or(base.natural_size.x), min_w, max_w);
    let mut h = clamp_axis(authored_h.unwrap_or(base.natural_size.y), min_h, max_h);

    if let Some(ar) = base.aspect_ratio {
        if ar > 0.0 {
            match (authored_w.is_some(), authored_h.is_some()) {
                // Both authored: authored values win over the ratio.
                (true, true) | (false, false) => {}
                (true, false) => h = w / ar,
                (false, true) => w = h * ar,
            }
            w = clamp_axis(w, min_w, max_w);
            h = clamp_axis(h, min_h, max_h);
        } else if !base.calc_diagnosed {
            log::warn!("ui: non-positive aspect ratio {ar} ignored");
        }
    }

    if (w < 0.0 || h < 0.0) && !base.calc_diagnosed {
        log::warn!("ui: component compiled to a negative size ({w} x {h}); clamping to 0");
        base.calc_diagnosed = true;
    }
    base.compiled_width = w.max(0.0);
    base.compiled_height = h.max(0.0);

    if divided_by_zero && !base.calc_diagnosed {
        log::warn!("ui: calc division by zero; dimension compiled to 0");
        base.calc_diagnosed = true;
    }
}

fn compile_position(
    arena: &mut SlotMap<UiHandle, UiNode>,
    handle: UiHandle,
    ctx: ParentCtx,
    viewport: Vec2,
) {
    let rctx = ctx.resolve_ctx(viewport);
    let base = &mut arena[handle].base;

    let mut divided_by_zero = false;
    let x = base
        .x
        .as_ref()
        .map_or(0.0, |l| l.resolve(&rctx, Axis::Horizontal, &mut divided_by_zero));
    let y = base
        .y
        .as_ref()
        .map_or(0.0, |l| l.resolve(&rctx, Axis::Vertical, &mut divided_by_zero));

    base.compiled_x = ctx.origin.x + x;
    base.compiled_y = ctx.origin.y + y;

    if divided_by_zero && !base.calc_diagnosed {
        log::warn!("ui: calc division by zero; position compiled to 0");
        base.calc_diagnosed = true;
    }
}

fn clamp_axis(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let mut v = value;
    if let Some(max) = max {
        v = v.min(max);
    }
    if let Some(min) = min {
        v = v.max(min);
    }
    v
}
