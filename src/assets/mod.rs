//! Asset Storage and Loader Contracts
//!
//! The engine does not decode asset files itself. Loader collaborators
//! implement the traits below; the [`AssetServer`] stores whatever they
//! produce and hands out slotmap handles.
//!
//! Decoders are expected for:
//! - Models: OBJ and FBX (meshes, normals, UVs, materials populated)
//! - Textures: PNG, JPG, BMP
//! - Fonts: a glyph atlas plus per-glyph metrics at a requested pixel size

use std::path::Path;

use slotmap::SlotMap;

use crate::errors::Result;
use crate::resources::{Font, FontKey, Model, Texture, TextureKey};

/// Decodes a model file into meshes with materials.
pub trait ModelLoader: Send {
    fn load(&self, path: &Path) -> Result<Model>;
}

/// Decodes an image file into RGBA8 pixels.
pub trait TextureLoader: Send {
    fn load(&self, path: &Path) -> Result<Texture>;
}

/// Rasterizes a font at a pixel size into an atlas with metrics.
pub trait FontLoader: Send {
    fn load(&self, path: &Path, px_size: f32) -> Result<Font>;
}

/// Central storage for shared assets (textures, fonts).
///
/// Models live in the scene's model pool since their lifetime follows the
/// objects that reference them.
#[derive(Default)]
pub struct AssetServer {
    textures: SlotMap<TextureKey, Texture>,
    fonts: SlotMap<FontKey, Font>,
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_texture(&mut self, texture: Texture) -> TextureKey {
        self.textures.insert(texture)
    }

    #[must_use]
    pub fn texture(&self, key: TextureKey) -> Option<&Texture> {
        self.textures.get(key)
    }

    pub fn remove_texture(&mut self, key: TextureKey) -> Option<Texture> {
        self.textures.remove(key)
    }

    pub fn insert_font(&mut self, font: Font) -> FontKey {
        self.fonts.insert(font)
    }

    #[must_use]
    pub fn font(&self, key: FontKey) -> Option<&Font> {
        self.fonts.get(key)
    }

    pub fn remove_font(&mut self, key: FontKey) -> Option<Font> {
        self.fonts.remove(key)
    }
}
