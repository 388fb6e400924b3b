use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::resources::Texture;

/// Metrics and atlas location for a single glyph.
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    /// Top-left UV in the atlas.
    pub uv_min: Vec2,
    /// Bottom-right UV in the atlas.
    pub uv_max: Vec2,
    /// Quad size in pixels at the font's native size.
    pub size: Vec2,
    /// Offset from the pen position to the quad's top-left.
    pub bearing: Vec2,
    /// Horizontal pen advance in pixels.
    pub advance: f32,
}

/// A rasterized font: glyph atlas plus per-glyph metrics.
///
/// Produced by a font loader collaborator at a fixed pixel size; the text
/// renderer scales quads when drawing at other sizes.
#[derive(Debug, Clone)]
pub struct Font {
    pub name: String,
    /// Native rasterization size in pixels.
    pub px_size: f32,
    /// Distance between baselines at the native size.
    pub line_height: f32,
    pub atlas: Texture,
    glyphs: FxHashMap<char, Glyph>,
}

impl Font {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        px_size: f32,
        line_height: f32,
        atlas: Texture,
        glyphs: FxHashMap<char, Glyph>,
    ) -> Self {
        Self {
            name: name.into(),
            px_size,
            line_height,
            atlas,
            glyphs,
        }
    }

    #[must_use]
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Measures a single-line string at the given pixel size.
    ///
    /// Unknown glyphs advance by half the size (the renderer draws them as
    /// whitespace).
    #[must_use]
    pub fn measure(&self, text: &str, px: f32) -> Vec2 {
        let scale = px / self.px_size;
        let width: f32 = text
            .chars()
            .map(|c| self.glyphs.get(&c).map_or(self.px_size * 0.5, |g| g.advance))
            .sum();
        Vec2::new(width * scale, self.line_height * scale)
    }
}
