//! # Arte Core
//!
//! glTF document model and loader, buffer and image resolution, CPU-side
//! texture and sampler descriptors, and math helpers.
//!
//! This crate has no GPU dependency; see `arte-graphics` for the device
//! layer and `arte-viewer` for mesh preparation, animation and skinning.

#[cfg(feature = "gltf")]
pub mod gltf;
pub mod math;
pub mod sampler;
pub mod texture;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logs the library version.
pub fn init() {
    log::info!("Arte Core v{} initialized", VERSION);
}
