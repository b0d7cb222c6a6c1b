//! Decoding of document images into [`CpuTexture`]s.

use image::{DynamicImage, ImageFormat};

use crate::texture::CpuTexture;

use super::buffer::{buffer_view_range, load_buffer_view_data, load_data_uri};
use super::error::GltfError;
use super::owned::Owned;
use super::types::{Image, ImageSource, MimeType};
use super::uri::UriKind;

fn image_format(mime_type: MimeType) -> ImageFormat {
    match mime_type {
        MimeType::ImageJpeg => ImageFormat::Jpeg,
        MimeType::ImagePng => ImageFormat::Png,
    }
}

fn into_texture(decoded: DynamicImage, image: Owned<'_, Image>) -> CpuTexture {
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();
    CpuTexture {
        name: (!image.name.is_empty()).then(|| image.name.clone()),
        width,
        height,
        format: crate::texture::TextureFormat::Rgba8Unorm,
        data: rgba.into_raw(),
    }
}

fn required_mime_type(image: Owned<'_, Image>, source: &str) -> Result<MimeType, GltfError> {
    image.mime_type.ok_or_else(|| {
        log::error!(
            "Unsupported: Image {} has a {} but no mime type.",
            image.id(),
            source
        );
        GltfError::Unsupported(format!("image {} has a {source} but no mime type", image.id()))
    })
}

/// Decodes an image to RGBA8, rows kept in their stored order.
///
/// File URIs resolve against the document directory and any format the
/// decoder recognizes is accepted. Data URIs and buffer views must declare
/// their MIME type.
pub fn load_image_data(image: Owned<'_, Image>) -> Result<CpuTexture, GltfError> {
    let decode_error = |source: image::ImageError| GltfError::ImageDecode {
        index: image.id().value(),
        source,
    };

    let decoded = match &image.source {
        ImageSource::Uri(uri) => match uri.kind {
            UriKind::Data => {
                log::trace!("Image {} data is read from a data URI.", image.id());
                let mime_type = required_mime_type(image, "data URI")?;
                let bytes = load_data_uri(uri)?;
                image::load_from_memory_with_format(&bytes, image_format(mime_type))
                    .map_err(decode_error)?
            }
            UriKind::File => {
                let path = image.file_path(uri);
                log::trace!("Image {} data is read from file '{}'.", image.id(), path.display());
                image::open(&path).map_err(decode_error)?
            }
        },
        ImageSource::BufferView(view) => {
            log::trace!("Image {} data is read from a buffer view.", image.id());
            let view = image.get(|_| *view);
            let mime_type = required_mime_type(image, "buffer view")?;
            let bytes = load_buffer_view_data(view)?;
            let range = buffer_view_range(view, bytes.len())?;
            image::load_from_memory_with_format(&bytes[range], image_format(mime_type))
                .map_err(decode_error)?
        }
    };

    let texture = into_texture(decoded, image);
    log::debug!(
        "Image {} decoded to {}x{} RGBA8.",
        image.id(),
        texture.width,
        texture.height
    );
    Ok(texture)
}
