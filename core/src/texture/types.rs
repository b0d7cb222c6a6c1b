//! CPU texture storage.

/// Pixel format of a [`CpuTexture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, linear.
    #[default]
    Rgba8Unorm,
    /// 8-bit RGBA, sRGB encoded.
    Rgba8UnormSrgb,
}

impl TextureFormat {
    /// Bytes per pixel.
    pub const fn block_size(self) -> usize {
        match self {
            Self::Rgba8Unorm | Self::Rgba8UnormSrgb => 4,
        }
    }
}

/// Decoded 2D pixel data, rows stored top to bottom as found in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuTexture {
    /// Texture name.
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Tightly packed pixels, `width * height * block_size` bytes.
    pub data: Vec<u8>,
}

impl CpuTexture {
    /// Wraps RGBA8 pixels. Returns `None` when `data` does not match the
    /// dimensions.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * TextureFormat::Rgba8Unorm.block_size();
        (data.len() == expected).then_some(Self {
            name: None,
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            data,
        })
    }

    /// A 1x1 texture of a single color.
    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            name: None,
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8Unorm,
            data: color.to_vec(),
        }
    }

    /// Set the texture name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Color of the pixel at (`x`, `y`), if inside the texture.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * self.format.block_size();
        self.data
            .get(offset..offset + 4)
            .map(|bytes| [bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid() {
        let white = CpuTexture::solid([255, 255, 255, 255]).with_name("white");
        assert_eq!((white.width, white.height), (1, 1));
        assert_eq!(white.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(white.pixel(1, 0), None);
        assert_eq!(white.name.as_deref(), Some("white"));
    }

    #[test]
    fn test_from_rgba8_checks_size() {
        assert!(CpuTexture::from_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(CpuTexture::from_rgba8(2, 2, vec![0; 15]).is_none());
    }
}
