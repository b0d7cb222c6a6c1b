//! # Arte Graphics
//!
//! GPU primitive layer of the arte glTF toolkit.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GpuBackend`] - Trait for the buffer, texture, sampler, vertex array
//!   and draw primitives a renderer needs
//! - [`DummyBackend`] - Recording backend for headless runs and tests
//! - [`types`] - Descriptors and draw commands passed to a backend
//!
//! ## Example
//!
//! ```ignore
//! use arte_graphics::{create_backend, BufferDescriptor, BufferUsage};
//!
//! let backend = create_backend()?;
//! let buffer = backend.create_buffer(&BufferDescriptor::new(36, BufferUsage::VERTEX))?;
//! backend.write_buffer(buffer, &positions)?;
//! ```

pub mod backend;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use backend::dummy::DummyBackend;
pub use backend::{
    create_backend, write_pod, GpuBackend, GpuBuffer, GpuSampler, GpuTexture, GpuVertexArray,
};
pub use error::GraphicsError;
pub use types::{
    BufferDescriptor, BufferUsage, DrawCommand, IndexBinding, IndexFormat, PrimitiveTopology,
    SamplerDescriptor, TextureDescriptor, TextureFormat, TextureUsage, VertexAttribute,
    VertexComponent,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// This should be called before using any graphics functionality.
pub fn init() {
    log::info!("Arte Graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dummy_backend() {
        let backend = DummyBackend::new();
        assert!(backend.name() == "Dummy");
        assert_eq!(backend.buffer_count(), 0);
        assert!(backend.draws().is_empty());
    }
}
