//! glTF 2.0 document loading.
//!
//! A [`Gltf`] owns one vector per entity kind (scenes, nodes, meshes,
//! accessors, ...). Entities reference each other through typed
//! [`Index`] values, and [`Owned`] cursors navigate those references.
//!
//! Loading is fail-fast: a missing required field, an unknown enumeration
//! string or a dangling reference aborts the whole load with a
//! [`GltfError`]. Binary data is not touched by the loader; it is resolved
//! on demand through the functions of the [`buffer`] and [`image`] modules.
//!
//! # Example
//!
//! ```ignore
//! use arte_core::gltf::{buffer, Gltf};
//!
//! let gltf = Gltf::load("models/box.gltf")?;
//! for mesh in gltf.meshes() {
//!     for primitive in mesh.members(|m| m.primitives.as_slice()) {
//!         if let Some(indices) = primitive.get_optional(|p| p.indices) {
//!             let indices = buffer::load_indices(indices)?;
//!             println!("{} indices", indices.len());
//!         }
//!     }
//! }
//! ```

pub mod buffer;
mod error;
pub mod image;
mod index;
mod layout;
mod loader;
mod owned;
#[cfg(test)]
mod tests;
pub mod types;
mod uri;

pub use error::{ErrorKind, GltfError};
pub use index::Index;
pub use layout::VertexAttributeLayout;
pub use owned::{Indexed, Iter, Member, Members, Owned};
pub use types::*;
pub use uri::{decode_url, Uri, UriKind};

use std::path::{Path, PathBuf};

/// A loaded glTF document.
#[derive(Debug, Clone, Default)]
pub struct Gltf {
    path: PathBuf,
    default_scene: Option<Index<Scene>>,
    scenes: Vec<Scene>,
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    animations: Vec<Animation>,
    buffers: Vec<Buffer>,
    buffer_views: Vec<BufferView>,
    accessors: Vec<Accessor>,
    materials: Vec<Material>,
    images: Vec<Image>,
    textures: Vec<Texture>,
    samplers: Vec<TextureSampler>,
    skins: Vec<Skin>,
    cameras: Vec<Camera>,
}

macro_rules! impl_indexed {
    ($($ty:ty => $field:ident, $kind:literal;)*) => {
        $(
            impl Indexed for $ty {
                const KIND: &'static str = $kind;

                fn elements(gltf: &Gltf) -> &[Self] {
                    &gltf.$field
                }

                fn elements_mut(gltf: &mut Gltf) -> &mut [Self] {
                    &mut gltf.$field
                }
            }
        )*
    };
}

impl_indexed! {
    Scene => scenes, "scene";
    Node => nodes, "node";
    Mesh => meshes, "mesh";
    Animation => animations, "animation";
    Buffer => buffers, "buffer";
    BufferView => buffer_views, "buffer view";
    Accessor => accessors, "accessor";
    Material => materials, "material";
    Image => images, "image";
    Texture => textures, "texture";
    TextureSampler => samplers, "sampler";
    Skin => skins, "skin";
    Camera => cameras, "camera";
}

impl Gltf {
    /// Reads and parses the document at `path`.
    ///
    /// Relative URIs of buffers and images resolve against the directory
    /// of `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GltfError> {
        let path = path.as_ref();
        log::debug!("Loading glTF document '{}'", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| GltfError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Parses a document already held in memory.
    ///
    /// `path` is only used to resolve relative URIs.
    pub fn from_json(text: &str, path: impl Into<PathBuf>) -> Result<Self, GltfError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        let gltf = loader::load_document(&json, path.into())?;
        log::info!(
            "Loaded glTF '{}': {} scenes, {} nodes, {} meshes, {} materials, {} animations, {} skins, {} cameras, {} buffers",
            gltf.path.display(),
            gltf.scenes.len(),
            gltf.nodes.len(),
            gltf.meshes.len(),
            gltf.materials.len(),
            gltf.animations.len(),
            gltf.skins.len(),
            gltf.cameras.len(),
            gltf.buffers.len(),
        );
        Ok(gltf)
    }

    /// Path the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves a file URI relative to the document directory.
    pub fn path_for(&self, uri: &Uri) -> PathBuf {
        let directory = self.path.parent().unwrap_or_else(|| Path::new(""));
        directory.join(decode_url(&uri.string))
    }

    /// Scene designated by the document's `scene` property.
    pub fn default_scene(&self) -> Option<Owned<'_, Scene>> {
        self.default_scene.map(|index| Owned::new(self, index))
    }

    /// Checked cursor construction.
    pub fn get<T: Indexed>(&self, index: Index<T>) -> Result<Owned<'_, T>, GltfError> {
        check_index(self, index, || "document".to_string())?;
        Ok(Owned::new(self, index))
    }

    /// Checked mutable element access.
    pub fn get_mut<T: Indexed>(&mut self, index: Index<T>) -> Result<&mut T, GltfError> {
        let len = T::elements(self).len();
        T::elements_mut(self)
            .get_mut(index.value())
            .ok_or_else(|| GltfError::DanglingIndex {
                context: "document".to_string(),
                kind: T::KIND,
                index: index.value(),
                len,
            })
    }

    /// Number of elements of kind `T`.
    pub fn count<T: Indexed>(&self) -> usize {
        T::elements(self).len()
    }

    /// Cursors on every element of kind `T`, in document order.
    pub fn all<T: Indexed>(&self) -> impl ExactSizeIterator<Item = Owned<'_, T>> + '_ {
        (0..self.count::<T>()).map(move |position| Owned::new(self, Index::new(position)))
    }

    pub fn scenes(&self) -> impl ExactSizeIterator<Item = Owned<'_, Scene>> + '_ {
        self.all()
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = Owned<'_, Node>> + '_ {
        self.all()
    }

    pub fn meshes(&self) -> impl ExactSizeIterator<Item = Owned<'_, Mesh>> + '_ {
        self.all()
    }

    pub fn animations(&self) -> impl ExactSizeIterator<Item = Owned<'_, Animation>> + '_ {
        self.all()
    }

    pub fn skins(&self) -> impl ExactSizeIterator<Item = Owned<'_, Skin>> + '_ {
        self.all()
    }
}

/// Fails with [`GltfError::DanglingIndex`] when `index` is past the end
/// of its document vector.
pub(crate) fn check_index<T: Indexed>(
    gltf: &Gltf,
    index: Index<T>,
    context: impl FnOnce() -> String,
) -> Result<(), GltfError> {
    let len = gltf.count::<T>();
    if index.value() < len {
        Ok(())
    } else {
        Err(GltfError::DanglingIndex {
            context: context(),
            kind: T::KIND,
            index: index.value(),
            len,
        })
    }
}
