//! Graphics error types.

use std::fmt;

/// Errors that can occur in the graphics layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// Failed to initialize the graphics system.
    InitializationFailed(String),
    /// Failed to create a resource.
    ResourceCreationFailed(String),
    /// A handle does not name a live resource of this backend.
    UnknownResource {
        /// Resource kind, e.g. `buffer`.
        kind: &'static str,
        /// Raw handle id.
        id: u64,
    },
    /// An invalid parameter was provided.
    InvalidParameter(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed(msg) => write!(f, "initialization failed: {msg}"),
            Self::ResourceCreationFailed(msg) => write!(f, "resource creation failed: {msg}"),
            Self::UnknownResource { kind, id } => write!(f, "unknown {kind} handle {id}"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphicsError::UnknownResource {
            kind: "buffer",
            id: 4,
        };
        assert_eq!(err.to_string(), "unknown buffer handle 4");

        let err = GraphicsError::InitializationFailed("no GPU found".to_string());
        assert_eq!(err.to_string(), "initialization failed: no GPU found");
    }
}
