//! CPU-side sampler types and filter/address mode definitions.

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest neighbor filtering.
    Nearest,
    /// Linear filtering.
    #[default]
    Linear,
}

/// Texture address mode (wrapping behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Clamp to edge.
    ClampToEdge,
    /// Repeat.
    #[default]
    Repeat,
    /// Mirrored repeat.
    MirrorRepeat,
}

/// CPU-side sampler configuration.
///
/// Describes how a texture is sampled: filtering, address modes and LOD
/// clamping. This is a format-agnostic descriptor separate from any GPU
/// resource.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSampler {
    /// Sampler name.
    pub name: Option<String>,
    /// Address mode for U coordinate.
    pub address_mode_u: AddressMode,
    /// Address mode for V coordinate.
    pub address_mode_v: AddressMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Filter between mip levels, `None` when mipmaps are not sampled.
    pub mipmap_filter: Option<FilterMode>,
    /// Minimum LOD clamp.
    pub lod_min_clamp: f32,
    /// Maximum LOD clamp.
    pub lod_max_clamp: f32,
}

impl CpuSampler {
    /// Create a linear filtering sampler.
    pub fn linear() -> Self {
        Self::default()
    }

    /// Create a nearest neighbor filtering sampler.
    pub fn nearest() -> Self {
        Self {
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..Default::default()
        }
    }

    /// Set the sampler name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set address mode for all coordinates.
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode_u = mode;
        self.address_mode_v = mode;
        self
    }
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self {
            name: None,
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: None,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
        }
    }
}

#[cfg(feature = "gltf")]
mod gltf_conversion {
    use super::*;
    use crate::gltf::{GltfError, TextureSampler};

    fn address_mode(code: u32, context: &str) -> Result<AddressMode, GltfError> {
        match code {
            33071 => Ok(AddressMode::ClampToEdge),
            33648 => Ok(AddressMode::MirrorRepeat),
            10497 => Ok(AddressMode::Repeat),
            other => Err(GltfError::unknown(context, "wrap mode", other)),
        }
    }

    fn mag_filter(code: u32, context: &str) -> Result<FilterMode, GltfError> {
        match code {
            9728 => Ok(FilterMode::Nearest),
            9729 => Ok(FilterMode::Linear),
            other => Err(GltfError::unknown(context, "magnification filter", other)),
        }
    }

    fn min_filter(code: u32, context: &str) -> Result<(FilterMode, Option<FilterMode>), GltfError> {
        use FilterMode::{Linear, Nearest};
        match code {
            9728 => Ok((Nearest, None)),
            9729 => Ok((Linear, None)),
            9984 => Ok((Nearest, Some(Nearest))),
            9985 => Ok((Linear, Some(Nearest))),
            9986 => Ok((Nearest, Some(Linear))),
            9987 => Ok((Linear, Some(Linear))),
            other => Err(GltfError::unknown(context, "minification filter", other)),
        }
    }

    impl CpuSampler {
        /// Converts the GL enumerators of a document sampler.
        ///
        /// Absent filters default to linear without mipmapping. Unknown
        /// enumerators are format violations.
        pub fn from_gltf(sampler: &TextureSampler) -> Result<Self, GltfError> {
            let context = format!("sampler '{}'", sampler.name);
            let (min_filter, mipmap_filter) = match sampler.min_filter {
                Some(code) => min_filter(code, &context)?,
                None => (FilterMode::Linear, None),
            };
            Ok(Self {
                name: (!sampler.name.is_empty()).then(|| sampler.name.clone()),
                address_mode_u: address_mode(sampler.wrap_s, &context)?,
                address_mode_v: address_mode(sampler.wrap_t, &context)?,
                mag_filter: sampler
                    .mag_filter
                    .map(|code| mag_filter(code, &context))
                    .transpose()?
                    .unwrap_or(FilterMode::Linear),
                min_filter,
                mipmap_filter,
                ..Default::default()
            })
        }
    }
}
