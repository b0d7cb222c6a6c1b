//! Cursors navigating a [`Gltf`] document.
//!
//! A cursor is a document reference plus a position. The element is looked
//! up through the document on every access rather than cached, and the
//! borrow of the document keeps it immutable for the cursor's lifetime.
//!
//! Navigation takes closures selecting a member of the current element:
//!
//! ```ignore
//! let node = gltf.get(Index::<Node>::new(0))?;
//! if let Some(mesh) = node.get_optional(|n| n.mesh) {
//!     for primitive in mesh.members(|m| m.primitives.as_slice()) {
//!         let position = primitive.get(|p| p.attributes["POSITION"]);
//!     }
//! }
//! for child in node.iterate(|n| n.children.as_slice()) { /* ... */ }
//! ```
//!
//! Every index stored in a loaded document has been checked against its
//! target vector, so following one never fails.

use std::fmt;
use std::ops::Deref;
use std::path::PathBuf;

use super::index::Index;
use super::uri::Uri;
use super::Gltf;

/// Element types stored in their own vector of a [`Gltf`].
pub trait Indexed: Sized + 'static {
    /// Name used in diagnostics, e.g. `accessor`.
    const KIND: &'static str;

    /// The document vector holding elements of this type.
    fn elements(gltf: &Gltf) -> &[Self];

    /// Mutable access to the document vector.
    fn elements_mut(gltf: &mut Gltf) -> &mut [Self];
}

/// Cursor on an element stored in a document vector.
pub struct Owned<'a, T> {
    gltf: &'a Gltf,
    index: Index<T>,
}

/// Cursor on an element stored inline in another element, such as a
/// primitive of a mesh or a channel of an animation.
pub struct Member<'a, M> {
    gltf: &'a Gltf,
    value: &'a M,
    position: usize,
}

/// Iterator turning a slice of indices into cursors.
pub struct Iter<'a, U> {
    gltf: &'a Gltf,
    indices: std::slice::Iter<'a, Index<U>>,
}

impl<'a, U: Indexed> Iterator for Iter<'a, U> {
    type Item = Owned<'a, U>;

    fn next(&mut self) -> Option<Self::Item> {
        self.indices
            .next()
            .map(|&index| Owned::new(self.gltf, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<U: Indexed> ExactSizeIterator for Iter<'_, U> {}

/// Iterator over the inline members of an element.
pub struct Members<'a, M> {
    gltf: &'a Gltf,
    values: std::iter::Enumerate<std::slice::Iter<'a, M>>,
}

impl<'a, M> Iterator for Members<'a, M> {
    type Item = Member<'a, M>;

    fn next(&mut self) -> Option<Self::Item> {
        self.values.next().map(|(position, value)| Member {
            gltf: self.gltf,
            value,
            position,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<M> ExactSizeIterator for Members<'_, M> {}

macro_rules! impl_navigation {
    ($cursor:ident<$param:ident: $bound:tt>) => {
        impl<'a, $param: $bound> $cursor<'a, $param> {
            /// The owning document.
            pub fn gltf(&self) -> &'a Gltf {
                self.gltf
            }

            /// Follows a required reference.
            pub fn get<U: Indexed>(&self, member: impl FnOnce(&'a $param) -> Index<U>) -> Owned<'a, U> {
                Owned::new(self.gltf, member(self.element()))
            }

            /// Follows an optional reference.
            pub fn get_optional<U: Indexed>(
                &self,
                member: impl FnOnce(&'a $param) -> Option<Index<U>>,
            ) -> Option<Owned<'a, U>> {
                member(self.element()).map(|index| Owned::new(self.gltf, index))
            }

            /// Iterates a vector of references.
            pub fn iterate<U: Indexed>(
                &self,
                member: impl FnOnce(&'a $param) -> &'a [Index<U>],
            ) -> Iter<'a, U> {
                Iter {
                    gltf: self.gltf,
                    indices: member(self.element()).iter(),
                }
            }

            /// Iterates a vector of inline values.
            pub fn members<V>(&self, member: impl FnOnce(&'a $param) -> &'a [V]) -> Members<'a, V> {
                Members {
                    gltf: self.gltf,
                    values: member(self.element()).iter().enumerate(),
                }
            }
        }

        impl<$param: $bound> Deref for $cursor<'_, $param> {
            type Target = $param;

            fn deref(&self) -> &$param {
                self.element()
            }
        }

        impl<$param> Clone for $cursor<'_, $param> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<$param> Copy for $cursor<'_, $param> {}
    };
}

impl<'a, T: Indexed> Owned<'a, T> {
    pub(crate) fn new(gltf: &'a Gltf, index: Index<T>) -> Self {
        Self { gltf, index }
    }

    /// Position of the element in its document vector.
    pub fn id(&self) -> Index<T> {
        self.index
    }

    /// The element, resolved through the document.
    pub fn element(&self) -> &'a T {
        &T::elements(self.gltf)[self.index.value()]
    }

    /// Path of a document-relative file URI.
    pub fn file_path(&self, uri: &Uri) -> PathBuf {
        self.gltf.path_for(uri)
    }
}

impl<'a, M> Member<'a, M> {
    /// Position of the value inside its parent vector.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn element(&self) -> &'a M {
        self.value
    }
}

impl_navigation!(Owned<T: Indexed>);
impl_navigation!(Member<M: 'static>);

impl<T: Indexed + fmt::Debug> fmt::Debug for Owned<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owned")
            .field("kind", &T::KIND)
            .field("index", &self.index.value())
            .field("element", self.element())
            .finish()
    }
}

impl<M: fmt::Debug> fmt::Debug for Member<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("position", &self.position)
            .field("element", self.value)
            .finish()
    }
}
