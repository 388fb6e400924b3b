use crate::ui::calc::UiCalc;

/// Root font size used for `rem` and as the `em` fallback without a parent.
pub const ROOT_FONT_SIZE: f32 = 16.0;

/// Responsive length unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiUnit {
    /// Absolute pixels
    Px,
    /// Percent of the parent's compiled size on the same axis
    /// (viewport when there is no parent)
    Percent,
    /// Percent of the viewport width
    Vw,
    /// Percent of the viewport height
    Vh,
    /// Multiple of the root font size
    Rem,
    /// Multiple of the parent's compiled font size
    Em,
}

/// A value tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiSize {
    pub value: f32,
    pub unit: UiUnit,
}

impl UiSize {
    #[must_use]
    pub fn new(value: f32, unit: UiUnit) -> Self {
        Self { value, unit }
    }
}

/// An authored length: a plain unit value or a calc expression.
#[derive(Debug, Clone, PartialEq)]
pub enum UiLength {
    Size(UiSize),
    Calc(Box<UiCalc>),
}

/// Axis a percent value resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Everything a unit needs to resolve to pixels.
#[derive(Debug, Clone, Copy)]
pub struct ResolveCtx {
    /// Viewport size in pixels
    pub viewport: glam::Vec2,
    /// Compiled size of the parent (viewport for roots)
    pub parent_size: glam::Vec2,
    /// Compiled font size of the parent ([`ROOT_FONT_SIZE`] for roots)
    pub parent_font_size: f32,
}

impl UiSize {
    /// Resolves to pixels under the given context and axis.
    #[must_use]
    pub fn resolve(&self, ctx: &ResolveCtx, axis: Axis) -> f32 {
        match self.unit {
            UiUnit::Px => self.value,
            UiUnit::Percent => {
                let basis = match axis {
                    Axis::Horizontal => ctx.parent_size.x,
                    Axis::Vertical => ctx.parent_size.y,
                };
                self.value / 100.0 * basis
            }
            UiUnit::Vw => self.value / 100.0 * ctx.viewport.x,
            UiUnit::Vh => self.value / 100.0 * ctx.viewport.y,
            UiUnit::Rem => self.value * ROOT_FONT_SIZE,
            UiUnit::Em => self.value * ctx.parent_font_size,
        }
    }
}

// Constructor helpers, mirroring the CSS-like authoring surface.

#[must_use]
pub fn px(value: f32) -> UiLength {
    UiLength::Size(UiSize::new(value, UiUnit::Px))
}

#[must_use]
pub fn percent(value: f32) -> UiLength {
    UiLength::Size(UiSize::new(value, UiUnit::Percent))
}

#[must_use]
pub fn vw(value: f32) -> UiLength {
    UiLength::Size(UiSize::new(value, UiUnit::Vw))
}

#[must_use]
pub fn vh(value: f32) -> UiLength {
    UiLength::Size(UiSize::new(value, UiUnit::Vh))
}

#[must_use]
pub fn rem(value: f32) -> UiLength {
    UiLength::Size(UiSize::new(value, UiUnit::Rem))
}

#[must_use]
pub fn em(value: f32) -> UiLength {
    UiLength::Size(UiSize::new(value, UiUnit::Em))
}

/// Raw numbers author as pixels.
impl From<f32> for UiLength {
    fn from(value: f32) -> Self {
        px(value)
    }
}

impl From<UiSize> for UiLength {
    fn from(size: UiSize) -> Self {
        UiLength::Size(size)
    }
}

impl From<UiCalc> for UiLength {
    fn from(calc: UiCalc) -> Self {
        UiLength::Calc(Box::new(calc))
    }
}
