//! Viewer error types.

use arte_core::gltf::{ErrorKind, GltfError};
use arte_graphics::GraphicsError;
use thiserror::Error;

/// Errors raised while preparing, animating or drawing a scene.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Gltf(#[from] GltfError),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    /// A recognized feature the viewer does not implement.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The document breaks a rule the loader does not check.
    #[error("{0}")]
    Format(String),

    #[error("skin {skin} has {joints} joints, the matrix palette holds at most {limit}")]
    TooManyJoints {
        skin: usize,
        joints: usize,
        limit: usize,
    },

    #[error("node #{0} has a matrix transformation and cannot be animated")]
    MatrixNodeAnimated(usize),

    #[error("no world transform was recorded for joint node #{0}")]
    MissingJointTransform(usize),
}

impl ViewerError {
    /// Classifies the error like [`GltfError::kind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Gltf(err) => err.kind(),
            Self::Graphics(_) => ErrorKind::Io,
            Self::Unsupported(_) | Self::TooManyJoints { .. } => ErrorKind::Unsupported,
            Self::Format(_) | Self::MatrixNodeAnimated(_) | Self::MissingJointTransform(_) => {
                ErrorKind::Format
            }
        }
    }

    /// Logs `message` at error level and returns it as [`ViewerError::Unsupported`].
    pub(crate) fn unsupported(message: String) -> Self {
        log::error!(target: crate::logging::PREPARE, "Unsupported: {}.", message);
        Self::Unsupported(message)
    }
}

/// Result type of the viewer.
pub type Result<T> = std::result::Result<T, ViewerError>;
