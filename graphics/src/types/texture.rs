//! Texture types and descriptors.

use bitflags::bitflags;

// Re-export the CPU-side format from core.
pub use arte_core::texture::TextureFormat;

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be sampled in shaders.
        const TEXTURE_BINDING = 1 << 0;
        /// Texture contents can be uploaded from the CPU.
        const COPY_DST = 1 << 1;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::TEXTURE_BINDING | Self::COPY_DST
    }
}

/// Descriptor for creating a 2D texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    /// Generate the mip chain after uploads.
    pub mipmaps: bool,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: None,
            width,
            height,
            format,
            usage: TextureUsage::default(),
            mipmaps: false,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Request mipmap generation.
    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    /// Bytes of one full upload of the base level.
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.block_size()
    }
}
