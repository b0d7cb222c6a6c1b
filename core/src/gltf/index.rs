//! Typed indices into the per-type vectors of a [`Gltf`](super::Gltf) document.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Position of an element of type `T` in its document vector.
///
/// An `Index<Node>` cannot be passed where an `Index<Mesh>` is expected,
/// while remaining a plain `usize` at runtime.
pub struct Index<T> {
    value: usize,
    marker: PhantomData<fn() -> T>,
}

impl<T> Index<T> {
    /// Wraps a raw array offset.
    pub const fn new(value: usize) -> Self {
        Self {
            value,
            marker: PhantomData,
        }
    }

    /// Raw array offset.
    pub const fn value(self) -> usize {
        self.value
    }
}

// Manual impls: derives would require the same traits on `T`.
impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Index<T> {}

impl<T> PartialEq for Index<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Index<T> {}

impl<T> PartialOrd for Index<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Index<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Index<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index({})", self.value)
    }
}

impl<T> fmt::Display for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value)
    }
}

impl<T> From<usize> for Index<T> {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl<T> From<Index<T>> for usize {
    fn from(index: Index<T>) -> Self {
        index.value
    }
}
