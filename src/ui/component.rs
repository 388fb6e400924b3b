use glam::{Vec2, Vec4};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::ui::flex::FlexProps;
use crate::ui::grid::GridProps;
use crate::ui::unit::UiLength;

new_key_type! {
    /// Handle for UI components in the manager's arena.
    pub struct UiHandle;
}

/// Default layer for plain components.
pub const LAYER_DEFAULT: i32 = 100;
/// Dropdowns sit above plain components even when closed.
pub const LAYER_DROPDOWN: i32 = 200;
/// An open dropdown raises itself above sibling overlays.
pub const LAYER_DROPDOWN_OPEN: i32 = 300;

/// Authored layout description plus compiled absolute pixel values.
///
/// Compiled values are only meaningful after a compile pass against the
/// current viewport; `%` and `em` additionally depend on the parent's
/// compiled dimensions and font size.
#[derive(Debug, Default)]
pub struct UiBase {
    // === Authored ===
    pub x: Option<UiLength>,
    pub y: Option<UiLength>,
    pub width: Option<UiLength>,
    pub height: Option<UiLength>,
    pub min_width: Option<UiLength>,
    pub max_width: Option<UiLength>,
    pub min_height: Option<UiLength>,
    pub max_height: Option<UiLength>,
    /// Width / height; the authored axis drives the other
    pub aspect_ratio: Option<f32>,
    pub font_size: Option<UiLength>,
    /// Render order key; ascending, stable within equal layers
    pub layer: i32,
    pub visible: bool,
    /// Fallback size when an axis is unauthored (widget-reported)
    pub natural_size: Vec2,

    // === Compiled (absolute pixels) ===
    pub compiled_x: f32,
    pub compiled_y: f32,
    pub compiled_width: f32,
    pub compiled_height: f32,
    pub compiled_font_size: f32,

    /// One diagnostic per component for calc division by zero.
    pub(crate) calc_diagnosed: bool,
    /// Tie-breaker for the stable layer sort.
    pub(crate) insertion: u64,
}

impl UiBase {
    #[must_use]
    pub fn new() -> Self {
        Self {
            layer: LAYER_DEFAULT,
            visible: true,
            ..Self::default()
        }
    }

    /// Compiled rectangle as `(min, max)` corners.
    #[must_use]
    pub fn compiled_rect(&self) -> (Vec2, Vec2) {
        let min = Vec2::new(self.compiled_x, self.compiled_y);
        (
            min,
            min + Vec2::new(self.compiled_width, self.compiled_height),
        )
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = self.compiled_rect();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// Widget-specific data and behavior.
pub enum UiKind {
    Panel(Panel),
    Label(Label),
    Button(Button),
    Checkbox(Checkbox),
    Slider(Slider),
    Dropdown(Dropdown),
    Flex(FlexProps),
    Grid(GridProps),
}

/// A node in the UI arena: base geometry plus its widget and hierarchy.
///
/// The parent link is non-owning; children are owned as an ordered handle
/// list, so destruction cascades parent to children without cycles.
pub struct UiNode {
    pub base: UiBase,
    pub kind: UiKind,
    pub(crate) parent: Option<UiHandle>,
    pub(crate) children: SmallVec<[UiHandle; 4]>,
}

impl UiNode {
    #[must_use]
    pub fn new(kind: UiKind) -> Self {
        let mut base = UiBase::new();
        if matches!(kind, UiKind::Dropdown(_)) {
            base.layer = LAYER_DROPDOWN;
        }
        Self {
            base,
            kind,
            parent: None,
            children: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<UiHandle> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[UiHandle] {
        &self.children
    }
}

// ============================================================================
// Widget data
// ============================================================================

pub struct Panel {
    pub color: Vec4,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            color: Vec4::new(0.12, 0.12, 0.14, 0.9),
        }
    }
}

pub struct Label {
    pub text: String,
    pub color: Vec4,
}

impl Label {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Vec4::ONE,
        }
    }
}

pub struct Button {
    pub label: String,
    pub color: Vec4,
    pub hover_color: Vec4,
    pub text_color: Vec4,
    pub(crate) hovered: bool,
    pub(crate) pressed: bool,
}

impl Button {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: Vec4::new(0.2, 0.4, 0.8, 1.0),
            hover_color: Vec4::new(0.3, 0.5, 0.9, 1.0),
            text_color: Vec4::ONE,
            hovered: false,
            pressed: false,
        }
    }
}

pub struct Checkbox {
    pub label: String,
    pub checked: bool,
    pub box_color: Vec4,
    pub check_color: Vec4,
}

impl Checkbox {
    #[must_use]
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
            box_color: Vec4::new(0.25, 0.25, 0.28, 1.0),
            check_color: Vec4::new(0.3, 0.8, 0.4, 1.0),
        }
    }
}

pub struct Slider {
    pub min: f32,
    pub max: f32,
    pub value: f32,
    pub track_color: Vec4,
    pub fill_color: Vec4,
    pub knob_color: Vec4,
    pub(crate) dragging: bool,
}

impl Slider {
    #[must_use]
    pub fn new(min: f32, max: f32, value: f32) -> Self {
        Self {
            min,
            max,
            value: value.clamp(min, max),
            track_color: Vec4::new(0.2, 0.2, 0.22, 1.0),
            fill_color: Vec4::new(0.2, 0.5, 0.9, 1.0),
            knob_color: Vec4::new(0.9, 0.9, 0.9, 1.0),
            dragging: false,
        }
    }

    /// Normalized value in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max > self.min {
            (self.value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }
}

pub struct Dropdown {
    pub options: Vec<String>,
    pub selected: usize,
    pub open: bool,
    pub color: Vec4,
    pub option_color: Vec4,
    pub text_color: Vec4,
}

impl Dropdown {
    #[must_use]
    pub fn new(options: Vec<String>, selected: usize) -> Self {
        Self {
            selected: selected.min(options.len().saturating_sub(1)),
            options,
            open: false,
            color: Vec4::new(0.18, 0.18, 0.2, 1.0),
            // Opaque: the expanded list must occlude whatever is below
            option_color: Vec4::new(0.15, 0.15, 0.17, 1.0),
            text_color: Vec4::ONE,
        }
    }

    /// Height in pixels of the expanded option list.
    #[must_use]
    pub fn expanded_height(&self, row_height: f32) -> f32 {
        self.options.len() as f32 * row_height
    }
}
