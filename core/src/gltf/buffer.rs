//! Resolution of buffer, buffer view and accessor bytes.
//!
//! Buffers are read whole, either from a document-relative file or from a
//! base64 data URI. Nothing is cached: every call reads its buffer again.

use std::fs::File;
use std::io::{ErrorKind as IoErrorKind, Read};
use std::ops::Range;

use bytemuck::Pod;

use super::error::GltfError;
use super::owned::Owned;
use super::types::{Accessor, Buffer, BufferView, ComponentType};
use super::uri::{Uri, UriKind};

/// Size of the chunks read from input streams.
pub const CHUNK_SIZE: usize = 128 * 1024;

const BASE64_MARKER: &str = "base64,";

/// Reads exactly `byte_length` bytes from `input`.
///
/// Running out of data is reported as [`GltfError::Truncated`], any other
/// failure as [`GltfError::Read`]. `stream_id` names the stream in errors.
pub fn load_input_stream(
    mut input: impl Read,
    byte_length: usize,
    stream_id: &str,
) -> Result<Vec<u8>, GltfError> {
    let mut result = vec![0u8; byte_length];
    for chunk in result.chunks_mut(CHUNK_SIZE) {
        input.read_exact(chunk).map_err(|source| match source.kind() {
            IoErrorKind::UnexpectedEof => GltfError::Truncated {
                stream: stream_id.to_string(),
            },
            _ => GltfError::Read {
                stream: stream_id.to_string(),
                source,
            },
        })?;
    }
    Ok(result)
}

/// Decodes the base64 payload of a data URI.
pub fn load_data_uri(uri: &Uri) -> Result<Vec<u8>, GltfError> {
    use base64::Engine as _;

    let start = uri
        .string
        .find(BASE64_MARKER)
        .ok_or_else(|| GltfError::InvalidDataUri(abbreviate(&uri.string)))?;
    let encoded = &uri.string[start + BASE64_MARKER.len()..];
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
}

/// Keeps error messages readable when a data URI is large.
fn abbreviate(uri: &str) -> String {
    const LIMIT: usize = 64;
    match uri.char_indices().nth(LIMIT) {
        Some((end, _)) => format!("{}...", &uri[..end]),
        None => uri.to_string(),
    }
}

/// Complete content of a buffer.
pub fn load_buffer_data(buffer: Owned<'_, Buffer>) -> Result<Vec<u8>, GltfError> {
    let Some(uri) = &buffer.uri else {
        log::error!("Buffer {} does not have a uri.", buffer.id());
        return Err(GltfError::MissingUri(buffer.id().value()));
    };

    match uri.kind {
        UriKind::Data => {
            log::trace!("Buffer {} data is read from a data URI.", buffer.id());
            load_data_uri(uri)
        }
        UriKind::File => {
            let path = buffer.file_path(uri);
            log::trace!("Buffer {} data is read from file '{}'.", buffer.id(), path.display());
            let file = File::open(&path).map_err(|source| GltfError::Open { path, source })?;
            load_input_stream(file, buffer.byte_length, &uri.string)
        }
    }
}

/// Byte range of `view` inside its buffer, checked against `available` bytes.
pub fn buffer_view_range(view: Owned<'_, BufferView>, available: usize) -> Result<Range<usize>, GltfError> {
    checked_range(Some(view.byte_offset), Some(view.byte_length), available, || {
        format!("bufferViews[{}]", view.id().value())
    })
}

/// `start..start + length` when it ends within `len` bytes.
///
/// A `None` operand or an overflowing end is reported as out of range.
fn checked_range(
    start: Option<usize>,
    length: Option<usize>,
    len: usize,
    context: impl FnOnce() -> String,
) -> Result<Range<usize>, GltfError> {
    let end = start
        .zip(length)
        .and_then(|(start, length)| start.checked_add(length));
    match (start, end) {
        (Some(start), Some(end)) if end <= len => Ok(start..end),
        _ => Err(GltfError::OutOfRange {
            context: context(),
            start: start.unwrap_or(usize::MAX),
            end: end.unwrap_or(usize::MAX),
            len,
        }),
    }
}

/// Complete content of the buffer backing `view`.
///
/// The view's byte offset is not applied: callers index the returned bytes
/// with `view.byte_offset` themselves.
pub fn load_buffer_view_data(view: Owned<'_, BufferView>) -> Result<Vec<u8>, GltfError> {
    let data = load_buffer_data(view.get(|v| v.buffer))?;
    buffer_view_range(view, data.len())?;
    Ok(data)
}

/// The buffer view of `accessor`, failing when it has none.
pub fn checked_buffer_view<'a>(accessor: Owned<'a, Accessor>) -> Result<Owned<'a, BufferView>, GltfError> {
    accessor.get_optional(|a| a.buffer_view).ok_or_else(|| {
        log::error!(
            "Unsupported: Accessor {} does not have a buffer view associated.",
            accessor.id()
        );
        GltfError::Unsupported(format!(
            "accessor {} does not have a buffer view",
            accessor.id()
        ))
    })
}

/// Byte range spanned by `accessor` inside `data`, honoring the view stride.
fn accessor_range(
    accessor: Owned<'_, Accessor>,
    view: Owned<'_, BufferView>,
    available: usize,
) -> Result<Range<usize>, GltfError> {
    let view_range = buffer_view_range(view, available)?;
    checked_range(
        view_range.start.checked_add(accessor.byte_offset),
        accessor.strided_byte_size(view.byte_stride),
        view_range.end,
        || format!("accessors[{}]", accessor.id().value()),
    )
}

fn widen_indices(
    bytes: &[u8],
    component_type: ComponentType,
    context: impl FnOnce() -> String,
) -> Result<Vec<u32>, GltfError> {
    let indices: Vec<u32> = match component_type {
        ComponentType::UnsignedByte => bytes.iter().map(|&index| u32::from(index)).collect(),
        ComponentType::UnsignedShort => bytes
            .chunks_exact(2)
            .map(|chunk| u32::from(bytemuck::pod_read_unaligned::<u16>(chunk)))
            .collect(),
        ComponentType::UnsignedInt => bytes
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<u32>)
            .collect(),
        other => {
            return Err(GltfError::UnknownEnum {
                context: context(),
                kind: "index component type",
                value: other.to_string(),
            })
        }
    };
    Ok(indices)
}

/// Reads an index accessor, widening every index to `u32`.
pub fn load_indices(accessor: Owned<'_, Accessor>) -> Result<Vec<u32>, GltfError> {
    let view = checked_buffer_view(accessor)?;
    let data = load_buffer_data(view.get(|v| v.buffer))?;
    let range = accessor_range(accessor, view, data.len())?;
    let element_size = accessor.component_type.byte_size();
    let stride = view.byte_stride.unwrap_or(element_size);

    let mut packed = Vec::with_capacity(range.len());
    for element in 0..accessor.count {
        let start = range.start + element * stride;
        packed.extend_from_slice(&data[start..start + element_size]);
    }
    widen_indices(&packed, accessor.component_type, || {
        format!("accessors[{}]", accessor.id().value())
    })
}

/// Content of the buffer backing `accessor`, with sparse values applied.
///
/// The returned bytes are the whole buffer: the accessor's elements start at
/// `view.byte_offset + accessor.byte_offset`. Sparse replacement values are
/// written over the elements they override.
pub fn load_accessor_data(accessor: Owned<'_, Accessor>) -> Result<Vec<u8>, GltfError> {
    let view = checked_buffer_view(accessor)?;
    let mut data = load_buffer_view_data(view)?;

    let Some(sparse) = &accessor.sparse else {
        return Ok(data);
    };
    let context = || format!("accessors[{}].sparse", accessor.id().value());

    let base = accessor_range(accessor, view, data.len())?;
    let element_size = accessor.element_byte_size();
    let stride = view.byte_stride.unwrap_or(element_size);

    let indices_view = accessor.get(|_| sparse.indices.buffer_view);
    let indices_data = load_buffer_view_data(indices_view)?;
    let indices_view_range = buffer_view_range(indices_view, indices_data.len())?;
    let indices_range = checked_range(
        indices_view_range.start.checked_add(sparse.indices.byte_offset),
        sparse.count.checked_mul(sparse.indices.component_type.byte_size()),
        indices_view_range.end,
        context,
    )?;
    let indices = widen_indices(
        &indices_data[indices_range],
        sparse.indices.component_type,
        context,
    )?;

    let values_view = accessor.get(|_| sparse.values.buffer_view);
    let values_data = load_buffer_view_data(values_view)?;
    let values_view_range = buffer_view_range(values_view, values_data.len())?;
    let values_range = checked_range(
        values_view_range.start.checked_add(sparse.values.byte_offset),
        sparse.count.checked_mul(element_size),
        values_view_range.end,
        context,
    )?;
    let values = &values_data[values_range];

    for (value, &index) in values.chunks_exact(element_size).zip(&indices) {
        let index = index as usize;
        if index >= accessor.count {
            return Err(GltfError::InvalidField {
                context: context(),
                field: "indices",
            });
        }
        let destination = base.start + index * stride;
        data[destination..destination + element_size].copy_from_slice(value);
    }

    log::trace!(
        "Accessor {} received {} sparse values.",
        accessor.id(),
        sparse.count
    );
    Ok(data)
}

/// Reads the elements of a tightly packed accessor as `T`.
///
/// `T` must have the size of one element, e.g. `f32` for a float scalar or
/// `[f32; 16]` for a float 4x4 matrix. Interleaved buffer views are
/// rejected.
pub fn load_accessor_elements<T: Pod>(accessor: Owned<'_, Accessor>) -> Result<Vec<T>, GltfError> {
    let view = checked_buffer_view(accessor)?;
    let element_size = accessor.element_byte_size();

    if let Some(stride) = view.byte_stride.filter(|&stride| stride != element_size) {
        log::error!(
            "Unsupported: Accessor {} uses buffer view {} with a byte stride of {}.",
            accessor.id(),
            view.id(),
            stride
        );
        return Err(GltfError::Unsupported(format!(
            "accessor {} reads from strided buffer view {}",
            accessor.id(),
            view.id()
        )));
    }
    if std::mem::size_of::<T>() != element_size {
        return Err(GltfError::Unsupported(format!(
            "accessor {} has {}-byte elements, expected {} bytes",
            accessor.id(),
            element_size,
            std::mem::size_of::<T>()
        )));
    }

    let data = load_accessor_data(accessor)?;
    let range = accessor_range(accessor, view, data.len())?;
    Ok(data[range]
        .chunks_exact(element_size)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}
