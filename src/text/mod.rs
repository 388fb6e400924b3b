//! Text Rendering Data
//!
//! Text entities and glyph-quad layout. 2D text lives in window space with
//! a top-left origin; 3D text is anchored in the scene and optionally
//! billboarded toward the camera. The active [`Font`] is always passed
//! explicitly to layout and rendering, never injected into renderer state.

use glam::{Vec2, Vec3, Vec4};

use crate::resources::{Font, FontKey};

/// Screen-space text: position is the top-left corner in window pixels.
#[derive(Debug, Clone)]
pub struct Text2d {
    pub content: String,
    pub position: Vec2,
    pub px: f32,
    pub color: Vec4,
    pub font: Option<FontKey>,
}

impl Text2d {
    #[must_use]
    pub fn new(content: impl Into<String>, position: Vec2, px: f32) -> Self {
        Self {
            content: content.into(),
            position,
            px,
            color: Vec4::ONE,
            font: None,
        }
    }
}

/// World-space text anchored at a point.
#[derive(Debug, Clone)]
pub struct Text3d {
    pub content: String,
    pub anchor: Vec3,
    /// World units per font pixel
    pub scale: f32,
    pub color: Vec4,
    /// When set, the quad rotates to face the camera each frame
    pub billboard: bool,
    pub font: Option<FontKey>,
}

impl Text3d {
    #[must_use]
    pub fn new(content: impl Into<String>, anchor: Vec3) -> Self {
        Self {
            content: content.into(),
            anchor,
            scale: 0.01,
            color: Vec4::ONE,
            billboard: true,
            font: None,
        }
    }
}

/// One positioned glyph quad with atlas UVs, in layout-local units where
/// the origin is the text's top-left corner and +y grows downward.
#[derive(Debug, Clone, Copy)]
pub struct GlyphQuad {
    pub min: Vec2,
    pub max: Vec2,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

/// Lays out a single-line string at `px` pixels.
///
/// Unknown glyphs advance by half the size without emitting a quad.
#[must_use]
pub fn layout_line(font: &Font, content: &str, px: f32) -> Vec<GlyphQuad> {
    let scale = px / font.px_size;
    let mut pen_x = 0.0f32;
    let mut quads = Vec::with_capacity(content.len());

    for c in content.chars() {
        let Some(glyph) = font.glyph(c) else {
            pen_x += font.px_size * 0.5 * scale;
            continue;
        };
        let min = Vec2::new(pen_x + glyph.bearing.x * scale, glyph.bearing.y * scale);
        let max = min + glyph.size * scale;
        quads.push(GlyphQuad {
            min,
            max,
            uv_min: glyph.uv_min,
            uv_max: glyph.uv_max,
        });
        pen_x += glyph.advance * scale;
    }

    quads
}
