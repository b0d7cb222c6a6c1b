//! Sampler types and descriptors.

// Re-export CPU-side types from core.
pub use arte_core::sampler::{AddressMode, CpuSampler, FilterMode};

/// Descriptor for creating a sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor {
    /// Debug label for the sampler.
    pub label: Option<String>,
    /// Address mode for U coordinate.
    pub address_mode_u: AddressMode,
    /// Address mode for V coordinate.
    pub address_mode_v: AddressMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Mipmap filter, `None` to sample the base level only.
    pub mipmap_filter: Option<FilterMode>,
    /// Minimum LOD clamp.
    pub lod_min_clamp: f32,
    /// Maximum LOD clamp.
    pub lod_max_clamp: f32,
}

impl SamplerDescriptor {
    /// Create a new sampler descriptor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether sampling reads mip levels.
    pub fn uses_mipmaps(&self) -> bool {
        self.mipmap_filter.is_some()
    }
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self::from(&CpuSampler::default())
    }
}

impl From<&CpuSampler> for SamplerDescriptor {
    fn from(cpu: &CpuSampler) -> Self {
        Self {
            label: cpu.name.clone(),
            address_mode_u: cpu.address_mode_u,
            address_mode_v: cpu.address_mode_v,
            mag_filter: cpu.mag_filter,
            min_filter: cpu.min_filter,
            mipmap_filter: cpu.mipmap_filter,
            lod_min_clamp: cpu.lod_min_clamp,
            lod_max_clamp: cpu.lod_max_clamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cpu_sampler() {
        let cpu = CpuSampler::nearest()
            .with_name("pixel art")
            .with_address_mode(AddressMode::ClampToEdge);
        let descriptor = SamplerDescriptor::from(&cpu);
        assert_eq!(descriptor.label.as_deref(), Some("pixel art"));
        assert_eq!(descriptor.mag_filter, FilterMode::Nearest);
        assert_eq!(descriptor.address_mode_v, AddressMode::ClampToEdge);
        assert!(!descriptor.uses_mipmaps());
    }
}
