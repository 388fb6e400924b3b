//! Single-line flex layout.
//!
//! The placement math is pure: the compile pass measures children, calls
//! [`layout`] with main/cross sizes, and writes the returned offsets back
//! into the arena as absolute pixel positions.

/// Main-axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

impl FlexDirection {
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    #[must_use]
    pub fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// Distribution of free space along the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis alignment of the single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    Stretch,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlexProps {
    pub direction: FlexDirection,
    pub justify: JustifyContent,
    pub align: AlignItems,
    /// Fixed spacing between adjacent items, in pixels
    pub gap: f32,
}

/// Measured child sizes fed into [`layout`].
#[derive(Debug, Clone, Copy)]
pub struct FlexChild {
    pub main_size: f32,
    pub cross_size: f32,
    /// `true` when the child has no authored cross size, making it
    /// eligible for `align: stretch`
    pub stretchable: bool,
}

/// Resolved placement relative to the container's inner origin.
#[derive(Debug, Clone, Copy)]
pub struct FlexPlacement {
    pub main_offset: f32,
    pub cross_offset: f32,
    pub cross_size: f32,
}

/// Places children along the main axis in order with `gap` between them,
/// distributes remaining free space per `justify`, then aligns the single
/// line per `align`. Reverse directions flip the visual order, not the
/// input order.
#[must_use]
pub fn layout(props: &FlexProps, inner_main: f32, inner_cross: f32, children: &[FlexChild]) -> Vec<FlexPlacement> {
    let n = children.len();
    if n == 0 {
        return Vec::new();
    }

    let content: f32 =
        children.iter().map(|c| c.main_size).sum::<f32>() + props.gap * (n as f32 - 1.0);
    let free = (inner_main - content).max(0.0);

    let (start, between) = match props.justify {
        JustifyContent::FlexStart => (0.0, props.gap),
        JustifyContent::FlexEnd => (free, props.gap),
        JustifyContent::Center => (free * 0.5, props.gap),
        JustifyContent::SpaceBetween => {
            if n > 1 {
                (0.0, props.gap + free / (n as f32 - 1.0))
            } else {
                (0.0, props.gap)
            }
        }
        JustifyContent::SpaceAround => {
            let unit = free / n as f32;
            (unit * 0.5, props.gap + unit)
        }
        JustifyContent::SpaceEvenly => {
            let unit = free / (n as f32 + 1.0);
            (unit, props.gap + unit)
        }
    };

    let order: Vec<usize> = if props.direction.is_reverse() {
        (0..n).rev().collect()
    } else {
        (0..n).collect()
    };

    let mut placements = vec![
        FlexPlacement {
            main_offset: 0.0,
            cross_offset: 0.0,
            cross_size: 0.0,
        };
        n
    ];

    let mut cursor = start;
    for &index in &order {
        let child = children[index];
        let (cross_offset, cross_size) = match props.align {
            AlignItems::Stretch if child.stretchable => (0.0, inner_cross),
            AlignItems::FlexStart | AlignItems::Stretch => (0.0, child.cross_size),
            AlignItems::FlexEnd => (inner_cross - child.cross_size, child.cross_size),
            AlignItems::Center => ((inner_cross - child.cross_size) * 0.5, child.cross_size),
        };
        placements[index] = FlexPlacement {
            main_offset: cursor,
            cross_offset,
            cross_size,
        };
        cursor += child.main_size + between;
    }

    placements
}
