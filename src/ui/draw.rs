use glam::{Vec2, Vec4};

/// A solid colored rectangle in window pixels.
#[derive(Debug, Clone, Copy)]
pub struct DrawRect {
    pub min: Vec2,
    pub max: Vec2,
    pub color: Vec4,
}

/// A single-line text run in window pixels.
#[derive(Debug, Clone)]
pub struct DrawText {
    pub position: Vec2,
    pub px: f32,
    pub color: Vec4,
    pub content: String,
}

/// Flat, already layer-ordered output of a UI render pass.
///
/// Commands are appended in final draw order; the GPU renderer submits
/// them as-is without re-sorting.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Rect(DrawRect),
    Text(DrawText),
}

impl DrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn push_rect(&mut self, min: Vec2, max: Vec2, color: Vec4) {
        if max.x > min.x && max.y > min.y && color.w > 0.0 {
            self.commands.push(DrawCommand::Rect(DrawRect { min, max, color }));
        }
    }

    pub fn push_text(&mut self, position: Vec2, px: f32, color: Vec4, content: impl Into<String>) {
        let content = content.into();
        if !content.is_empty() {
            self.commands.push(DrawCommand::Text(DrawText {
                position,
                px,
                color,
                content,
            }));
        }
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
