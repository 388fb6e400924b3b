//! CPU-side Resource Types
//!
//! Meshes, materials, models, textures and fonts as plain data. Decoding
//! (OBJ/FBX, PNG/JPG, font rasterization) is the job of external loader
//! collaborators (see [`crate::assets`]); the renderer uploads these types
//! to the GPU on demand.

pub mod font;
pub mod material;
pub mod mesh;
pub mod model;
pub mod texture;

pub use font::{Font, Glyph};
pub use material::Material;
pub use mesh::Mesh;
pub use model::Model;
pub use texture::Texture;

use slotmap::new_key_type;

new_key_type! {
    /// Handle for textures stored in the asset server.
    pub struct TextureKey;

    /// Handle for fonts stored in the asset server.
    pub struct FontKey;
}
