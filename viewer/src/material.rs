//! Materials and their GPU textures.

use std::collections::BTreeMap;

use arte_core::gltf::{self, image::load_image_data, AlphaMode, Index, Owned, TextureSampler};
use arte_core::sampler::CpuSampler;
use arte_core::texture::CpuTexture;
use arte_graphics::{
    GpuBackend, GpuSampler, GpuTexture, SamplerDescriptor, TextureDescriptor,
};

use crate::error::{Result, ViewerError};
use crate::logging::PREPARE;

/// Texture unit the base color texture is bound to.
pub const BASE_COLOR_TEXTURE_UNIT: u32 = 0;

/// A texture uploaded to the GPU with its sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedTexture {
    pub texture: GpuTexture,
    pub sampler: GpuSampler,
}

fn upload(
    backend: &dyn GpuBackend,
    pixels: &CpuTexture,
    label: String,
    mipmaps: bool,
    sampler: &CpuSampler,
) -> Result<PreparedTexture> {
    let descriptor = TextureDescriptor::new_2d(pixels.width, pixels.height, pixels.format)
        .with_label(label)
        .with_mipmaps(mipmaps);
    let texture = backend.create_texture(&descriptor)?;
    backend.write_texture(texture, &pixels.data)?;
    let sampler = backend.create_sampler(&SamplerDescriptor::from(sampler))?;
    Ok(PreparedTexture { texture, sampler })
}

/// Decodes the image of `texture` and uploads it with mipmaps.
///
/// A texture without sampler uses the document default (repeat, no
/// explicit filters).
pub fn prepare_texture(
    backend: &dyn GpuBackend,
    texture: Owned<'_, gltf::Texture>,
) -> Result<PreparedTexture> {
    let Some(image) = texture.get_optional(|t| t.source) else {
        return Err(ViewerError::unsupported(format!(
            "texture {} does not have an image source",
            texture.id()
        )));
    };
    let pixels = load_image_data(image)?;

    let sampler = match texture.get_optional(|t| t.sampler) {
        Some(sampler) => CpuSampler::from_gltf(&sampler)?,
        None => CpuSampler::from_gltf(&TextureSampler::default())?,
    };

    let label = match &pixels.name {
        Some(name) => name.clone(),
        None => format!("texture {}", texture.id()),
    };
    let prepared = upload(backend, &pixels, label, true, &sampler)?;
    log::debug!(
        target: PREPARE,
        "Uploaded texture {} ({}x{}) from image {}.",
        texture.id(),
        pixels.width,
        pixels.height,
        image.id()
    );
    Ok(prepared)
}

/// GPU textures shared by the materials of a scene.
#[derive(Debug, Default)]
pub struct TextureRepository {
    textures: BTreeMap<Index<gltf::Texture>, PreparedTexture>,
    default_texture: Option<PreparedTexture>,
}

impl TextureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The GPU texture of `texture`, uploaded on first use.
    pub fn get_or_prepare(
        &mut self,
        backend: &dyn GpuBackend,
        texture: Owned<'_, gltf::Texture>,
    ) -> Result<PreparedTexture> {
        if let Some(prepared) = self.textures.get(&texture.id()) {
            return Ok(*prepared);
        }
        let prepared = prepare_texture(backend, texture)?;
        self.textures.insert(texture.id(), prepared);
        Ok(prepared)
    }

    /// The 1x1 opaque white texture standing in for a missing base color
    /// texture.
    pub fn default_texture(&mut self, backend: &dyn GpuBackend) -> Result<PreparedTexture> {
        if let Some(prepared) = self.default_texture {
            return Ok(prepared);
        }
        let white = CpuTexture::solid([255, 255, 255, 255]);
        let prepared = upload(
            backend,
            &white,
            "default white".to_string(),
            false,
            &CpuSampler::default(),
        )?;
        self.default_texture = Some(prepared);
        Ok(prepared)
    }

    /// Number of document textures uploaded.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Shading parameters of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGBA multiplier of the base color texture.
    pub base_color_factor: [f32; 4],
    pub base_color_texture: PreparedTexture,
    pub alpha_mode: AlphaMode,
    pub double_sided: bool,
}

impl Material {
    /// Prepares `material`, or the default material when `None`.
    ///
    /// `MASK` alpha mode is not implemented and fails.
    pub fn prepare(
        backend: &dyn GpuBackend,
        material: Option<Owned<'_, gltf::Material>>,
        textures: &mut TextureRepository,
    ) -> Result<Self> {
        let default_material = gltf::Material::default();
        let element = material.as_ref().map_or(&default_material, |m| m.element());

        if element.alpha_mode == AlphaMode::Mask {
            return Err(ViewerError::unsupported(format!(
                "material {} uses the MASK alpha mode",
                material.map_or_else(|| "default".to_string(), |m| m.id().to_string())
            )));
        }

        let pbr = element.pbr();
        let base_color_texture = match (material, pbr.base_color_texture) {
            (Some(material), Some(info)) => {
                textures.get_or_prepare(backend, material.get(|_| info.index))?
            }
            _ => textures.default_texture(backend)?,
        };

        Ok(Self {
            base_color_factor: pbr.base_color_factor,
            base_color_texture,
            alpha_mode: element.alpha_mode,
            double_sided: element.double_sided,
        })
    }
}
