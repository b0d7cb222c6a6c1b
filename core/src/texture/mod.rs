//! CPU-side texture types.
//!
//! Provides [`CpuTexture`] for holding decoded pixel data, along with
//! [`TextureFormat`] shared between CPU and GPU code.

mod types;

pub use types::{CpuTexture, TextureFormat};
