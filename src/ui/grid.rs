//! Fixed-column grid layout.

use glam::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct GridProps {
    /// Column count, at least 1
    pub columns: usize,
    /// Row count; `None` derives `ceil(n / columns)`
    pub rows: Option<usize>,
    pub column_gap: f32,
    pub row_gap: f32,
}

impl GridProps {
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            rows: None,
            column_gap: 0.0,
            row_gap: 0.0,
        }
    }

    /// Uniform gap on both axes.
    #[must_use]
    pub fn with_gap(mut self, gap: f32) -> Self {
        self.column_gap = gap;
        self.row_gap = gap;
        self
    }
}

impl Default for GridProps {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Cell placement for child `i`: offset from the container's inner origin
/// plus the uniform cell size. Children compile against the cell as their
/// parent, so `%` sizes resolve against the cell.
#[must_use]
pub fn cell_rects(props: &GridProps, inner: Vec2, child_count: usize) -> Vec<(Vec2, Vec2)> {
    if child_count == 0 {
        return Vec::new();
    }

    let cols = props.columns.max(1);
    let rows = props
        .rows
        .unwrap_or_else(|| child_count.div_ceil(cols))
        .max(1);

    let cell_w = (inner.x - (cols as f32 - 1.0) * props.column_gap) / cols as f32;
    let cell_h = (inner.y - (rows as f32 - 1.0) * props.row_gap) / rows as f32;
    let cell = Vec2::new(cell_w.max(0.0), cell_h.max(0.0));

    (0..child_count)
        .map(|i| {
            let col = i % cols;
            let row = i / cols;
            let offset = Vec2::new(
                col as f32 * (cell.x + props.column_gap),
                row as f32 * (cell.y + props.row_gap),
            );
            (offset, cell)
        })
        .collect()
}
