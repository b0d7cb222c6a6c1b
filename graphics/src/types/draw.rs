//! Draw submission.

use crate::backend::{GpuBuffer, GpuSampler, GpuTexture, GpuVertexArray};

use super::IndexFormat;

/// Primitive assembly mode of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Indexed drawing parameters; the index buffer itself is bound to the
/// vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBinding {
    pub format: IndexFormat,
    /// Offset of the first index inside the index buffer.
    pub byte_offset: u64,
}

/// A texture and its sampler bound to a texture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    pub unit: u32,
    pub texture: GpuTexture,
    pub sampler: GpuSampler,
}

/// A buffer bound to a uniform block binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformBinding {
    pub binding: u32,
    pub buffer: GpuBuffer,
}

/// Everything needed to issue one (possibly instanced) draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrawCommand {
    pub vertex_array: GpuVertexArray,
    pub topology: PrimitiveTopology,
    /// Number of vertices, or of indices when `index` is set.
    pub count: u32,
    pub instance_count: u32,
    pub index: Option<IndexBinding>,
    pub textures: Vec<TextureBinding>,
    pub uniforms: Vec<UniformBinding>,
}

impl DrawCommand {
    /// A single-instance, non-indexed draw.
    pub fn new(vertex_array: GpuVertexArray, topology: PrimitiveTopology, count: u32) -> Self {
        Self {
            vertex_array,
            topology,
            count,
            instance_count: 1,
            index: None,
            textures: Vec::new(),
            uniforms: Vec::new(),
        }
    }

    pub fn with_instances(mut self, instance_count: u32) -> Self {
        self.instance_count = instance_count;
        self
    }

    pub fn with_index(mut self, index: Option<IndexBinding>) -> Self {
        self.index = index;
        self
    }

    pub fn with_texture(mut self, unit: u32, texture: GpuTexture, sampler: GpuSampler) -> Self {
        self.textures.push(TextureBinding {
            unit,
            texture,
            sampler,
        });
        self
    }

    pub fn with_uniform(mut self, binding: u32, buffer: GpuBuffer) -> Self {
        self.uniforms.push(UniformBinding { binding, buffer });
        self
    }

    /// Whether the draw reads an index buffer.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }
}
