//! # Arte Viewer
//!
//! Prepares glTF 2.0 scenes for drawing, plays their animations and skins
//! their meshes.
//!
//! ## Modules
//!
//! - [`mesh`] - Vertex, index and instance buffers of meshes
//! - [`material`] - Base color materials and texture uploads
//! - [`animation`] - Keyframe sampling and node animation
//! - [`skeleton`] - Inverse bind matrices and joint matrix palettes
//! - [`scene`] - Scene traversal, per-frame update and bounds
//! - [`render`] - Draw submission
//!
//! ## Example
//!
//! ```ignore
//! use arte_graphics::DummyBackend;
//! use arte_viewer::{run, ViewerOptions};
//!
//! let backend = DummyBackend::new();
//! let summary = run(&backend, "models/fox.gltf".as_ref(), &ViewerOptions::default())?;
//! println!("{summary}");
//! ```

use std::fmt;
use std::path::Path;

use arte_core::gltf::Gltf;
use arte_core::math::BoundingBox;
use arte_graphics::GpuBackend;

pub mod animation;
pub mod args;
pub mod error;
pub mod logging;
pub mod material;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod skeleton;

pub use animation::{Animation, Mode, Sampler, Time};
pub use args::{ViewerArgs, ViewerOptions};
pub use error::{Result, ViewerError};
pub use material::{Material, TextureRepository};
pub use mesh::{Instance, InstanceList, Mesh, MeshPrimitive};
pub use render::Renderer;
pub use scene::Scene;
pub use skeleton::{JointMatrixPalette, Skeleton, MAX_JOINTS};

/// Viewer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logs the library version.
pub fn init() {
    log::info!(target: logging::MAIN, "Arte Viewer v{} initialized", VERSION);
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub meshes: usize,
    pub skeletons: usize,
    pub animations: usize,
    pub bounding_box: BoundingBox,
    pub frames: u64,
    /// Draws issued over all frames.
    pub draws: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.bounding_box.size();
        write!(
            f,
            "{} mesh(es), {} skeleton(s), {} animation(s), bounds {:.3}x{:.3}x{:.3}, {} draw(s) over {} frame(s)",
            self.meshes,
            self.skeletons,
            self.animations,
            size.x,
            size.y,
            size.z,
            self.draws,
            self.frames
        )
    }
}

/// Loads the document at `path` and plays `options.frames` frames of its
/// scene, frame `n` being at time `n * options.frame_time`.
pub fn run(backend: &dyn GpuBackend, path: &Path, options: &ViewerOptions) -> Result<RunSummary> {
    let gltf = Gltf::load(path)?;
    let scene_index = scene::select_scene(&gltf, options.scene)?;
    let mut scene = Scene::new(backend, gltf, scene_index, options)?;
    let renderer = Renderer::new();

    let mut draws = 0;
    for frame in 0..options.frames {
        let time = frame as Time * options.frame_time;
        scene.update(backend, time)?;
        draws += scene.render(backend, &renderer)?;
    }
    log::debug!(target: logging::MAIN, "Played {} frame(s), {} draw(s).", options.frames, draws);

    Ok(RunSummary {
        meshes: scene.meshes().len(),
        skeletons: scene.skeletons().len(),
        animations: scene.animations().len(),
        bounding_box: scene.bounding_box(),
        frames: options.frames,
        draws,
    })
}
