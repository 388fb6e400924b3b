//! Responsive Retained UI
//!
//! A CSS-like retained UI subsystem:
//!
//! - [`unit`] - responsive length units (`px`, `%`, `vw`, `vh`, `rem`, `em`)
//! - [`calc`] - left-to-right arithmetic over lengths, no precedence
//! - [`component`] - the widget arena: authored sizes, compiled pixels, layers
//! - [`compile`] - the top-down size-compilation pass
//! - [`flex`] / [`grid`] - layout containers
//! - [`manager`] - root storage, layer-sorted rendering, input hit-testing
//!
//! Components live in a `SlotMap` arena: parents own an ordered child list,
//! children keep a non-owning parent handle, and removal cascades downward.
//! The render order is a stable sort by layer; an open dropdown raises its
//! layer so it occludes sibling overlays without any clipping.

pub mod calc;
pub mod compile;
pub mod component;
pub mod draw;
pub mod flex;
pub mod grid;
pub mod manager;
pub mod unit;

pub use calc::{CalcOp, CalcOperand, UiCalc};
pub use component::{
    Button, Checkbox, Dropdown, Label, Panel, Slider, UiBase, UiHandle, UiKind, UiNode,
    LAYER_DEFAULT, LAYER_DROPDOWN, LAYER_DROPDOWN_OPEN,
};
pub use draw::{DrawCommand, DrawList, DrawRect, DrawText};
pub use flex::{AlignItems, FlexDirection, FlexProps, JustifyContent};
pub use grid::GridProps;
pub use manager::{UiEvent, UiManager};
pub use unit::{em, percent, px, rem, vh, vw, Axis, ResolveCtx, UiLength, UiSize, UiUnit, ROOT_FONT_SIZE};
