//! Common types and descriptors for graphics resources.
//!
//! This module contains format enums, usage flags, descriptor structs and
//! the draw command consumed by [`GpuBackend::draw`](crate::GpuBackend::draw).

mod buffer;
mod draw;
mod sampler;
mod texture;
mod vertex;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use draw::{DrawCommand, IndexBinding, PrimitiveTopology, TextureBinding, UniformBinding};
pub use sampler::{AddressMode, CpuSampler, FilterMode, SamplerDescriptor};
pub use texture::{TextureDescriptor, TextureFormat, TextureUsage};
pub use vertex::{IndexFormat, VertexAttribute, VertexComponent};
