//! GPU backend abstraction layer.
//!
//! This module provides a trait-based abstraction for the GPU primitive
//! layer: buffers, textures, samplers and vertex arrays are created through
//! a [`GpuBackend`], filled with full-content uploads, and consumed by
//! [`GpuBackend::draw`].
//!
//! # Available Backends
//!
//! - `dummy` (default): recording backend for headless runs and tests
//!
//! Resources are identified by small copyable handles. A handle is only
//! meaningful for the backend that created it.

pub mod dummy;

use std::sync::Arc;

use crate::error::GraphicsError;
use crate::types::{
    BufferDescriptor, DrawCommand, SamplerDescriptor, TextureDescriptor, VertexAttribute,
};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            id: u64,
        }

        impl $name {
            /// Resource kind named in errors.
            pub const KIND: &'static str = $kind;

            /// Wraps a backend-specific id.
            pub const fn from_raw(id: u64) -> Self {
                Self { id }
            }

            /// Backend-specific id.
            pub const fn id(self) -> u64 {
                self.id
            }

            pub(crate) fn unknown(self) -> GraphicsError {
                GraphicsError::UnknownResource {
                    kind: $kind,
                    id: self.id,
                }
            }
        }
    };
}

define_handle!(
    /// Handle to a GPU buffer resource.
    GpuBuffer,
    "buffer"
);
define_handle!(
    /// Handle to a GPU texture resource.
    GpuTexture,
    "texture"
);
define_handle!(
    /// Handle to a GPU sampler resource.
    GpuSampler,
    "sampler"
);
define_handle!(
    /// Handle to a vertex array: a set of attribute bindings plus an
    /// optional index buffer.
    GpuVertexArray,
    "vertex array"
);

/// GPU backend trait for abstracting different GPU APIs.
pub trait GpuBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create a buffer resource.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError>;

    /// Replace the whole content of a buffer, resizing it to `data`.
    fn write_buffer(&self, buffer: GpuBuffer, data: &[u8]) -> Result<(), GraphicsError>;

    /// Create a texture resource.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, GraphicsError>;

    /// Upload the base level of a texture.
    fn write_texture(&self, texture: GpuTexture, data: &[u8]) -> Result<(), GraphicsError>;

    /// Create a sampler resource.
    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<GpuSampler, GraphicsError>;

    /// Create an empty vertex array.
    fn create_vertex_array(&self, label: Option<&str>) -> Result<GpuVertexArray, GraphicsError>;

    /// Bind a vertex attribute, replacing any binding at the same location.
    fn set_vertex_attribute(
        &self,
        vertex_array: GpuVertexArray,
        attribute: &VertexAttribute,
    ) -> Result<(), GraphicsError>;

    /// Bind the index buffer of a vertex array.
    fn set_index_buffer(
        &self,
        vertex_array: GpuVertexArray,
        buffer: GpuBuffer,
    ) -> Result<(), GraphicsError>;

    /// Issue a draw.
    fn draw(&self, command: &DrawCommand) -> Result<(), GraphicsError>;
}

/// Upload a slice of plain values as the whole content of `buffer`.
pub fn write_pod<T: bytemuck::Pod>(
    backend: &dyn GpuBackend,
    buffer: GpuBuffer,
    data: &[T],
) -> Result<(), GraphicsError> {
    backend.write_buffer(buffer, bytemuck::cast_slice(data))
}

/// Selects and creates the appropriate backend based on available features.
pub fn create_backend() -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    #[cfg(feature = "dummy")]
    {
        log::info!("Using dummy backend");
        Ok(Arc::new(dummy::DummyBackend::new()))
    }

    #[cfg(not(feature = "dummy"))]
    {
        Err(GraphicsError::InitializationFailed(
            "no GPU backend compiled in".to_string(),
        ))
    }
}
