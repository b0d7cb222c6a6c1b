//! Error types for glTF loading and buffer resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a [`GltfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The document violates the glTF format.
    Format,
    /// The document is valid but uses a recognized feature that is not implemented.
    Unsupported,
    /// Reading companion data failed.
    Io,
}

/// Errors that can occur while loading a glTF document or resolving its data.
#[derive(Debug, Error)]
pub enum GltfError {
    /// The document is not valid JSON.
    #[error("glTF parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// A required field is absent.
    #[error("{context}: missing required field '{field}'")]
    MissingField {
        /// Element being loaded, e.g. `accessors[2]`.
        context: String,
        /// JSON key of the field.
        field: &'static str,
    },
    /// A field is present but has the wrong JSON type or an out-of-range value.
    #[error("{context}: invalid value for field '{field}'")]
    InvalidField {
        /// Element being loaded.
        context: String,
        /// JSON key of the field.
        field: &'static str,
    },
    /// An enumeration string or code has no known meaning.
    #[error("{context}: unknown {kind} '{value}'")]
    UnknownEnum {
        /// Element being loaded.
        context: String,
        /// Enumeration name, e.g. `accessor type`.
        kind: &'static str,
        /// Offending value.
        value: String,
    },
    /// A cross-reference points past the end of its target array.
    #[error("{context}: {kind} index {index} is out of range ({len} declared)")]
    DanglingIndex {
        /// Element holding the reference.
        context: String,
        /// Kind of the referenced element.
        kind: &'static str,
        /// Referenced index.
        index: usize,
        /// Number of elements of that kind in the document.
        len: usize,
    },
    /// A file could not be opened.
    #[error("cannot open '{path}': {source}")]
    Open {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A stream ended before the declared byte length was read.
    #[error("problem reading '{stream}': stream truncated")]
    Truncated {
        /// Identifier of the stream (usually its URI).
        stream: String,
    },
    /// A stream failed for a reason other than truncation.
    #[error("problem reading '{stream}': read error")]
    Read {
        /// Identifier of the stream.
        stream: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A buffer has no URI (embedded GLB buffers are not handled).
    #[error("buffer #{0} was expected to have a uri")]
    MissingUri(usize),
    /// A data URI lacks the `base64,` marker.
    #[error("data uri is not base64 encoded: '{0}'")]
    InvalidDataUri(String),
    /// The base64 payload of a data URI is malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// A byte range does not fit inside the data it addresses.
    #[error("{context}: byte range {start}..{end} exceeds the {len} available bytes")]
    OutOfRange {
        /// Element whose range is checked.
        context: String,
        /// First byte of the range.
        start: usize,
        /// One past the last byte of the range.
        end: usize,
        /// Bytes available.
        len: usize,
    },
    /// A recognized feature is not implemented.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// An image could not be decoded.
    #[error("image #{index}: {source}")]
    ImageDecode {
        /// Index of the image in the document.
        index: usize,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },
}

impl GltfError {
    /// Classifies this error as a format violation, a feature gap, or an I/O failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Open { .. } | Self::Truncated { .. } | Self::Read { .. } => ErrorKind::Io,
            _ => ErrorKind::Format,
        }
    }

    pub(crate) fn missing(context: &str, field: &'static str) -> Self {
        Self::MissingField {
            context: context.to_string(),
            field,
        }
    }

    pub(crate) fn invalid(context: &str, field: &'static str) -> Self {
        Self::InvalidField {
            context: context.to_string(),
            field,
        }
    }

    pub(crate) fn unknown(context: &str, kind: &'static str, value: impl ToString) -> Self {
        Self::UnknownEnum {
            context: context.to_string(),
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GltfError::missing("bufferViews[1]", "buffer");
        assert_eq!(
            err.to_string(),
            "bufferViews[1]: missing required field 'buffer'"
        );

        let err = GltfError::Truncated {
            stream: "cube.bin".to_string(),
        };
        assert_eq!(err.to_string(), "problem reading 'cube.bin': stream truncated");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(GltfError::MissingUri(0).kind(), ErrorKind::Format);
        assert_eq!(
            GltfError::Unsupported("mask alpha mode".into()).kind(),
            ErrorKind::Unsupported
        );
        let read = GltfError::Read {
            stream: "a.bin".into(),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(read.kind(), ErrorKind::Io);
    }
}
