/// Decoded RGBA8 image data, ready for GPU upload.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl Texture {
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        Self {
            name: name.into(),
            width,
            height,
            rgba,
        }
    }

    /// 1x1 opaque white, the fallback for missing material textures.
    #[must_use]
    pub fn white() -> Self {
        Self::new("White", 1, 1, vec![255, 255, 255, 255])
    }
}
