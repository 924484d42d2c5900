//! Texture and thumbnail part parsing
//!
//! Image parts are not decoded. The parsers record the declared content type,
//! sniff the actual encoding from the leading bytes and report disagreement
//! between the two.

use crate::diagnostics::{Code, Log, Message};
use crate::error::Result;
use crate::model::{ImageFormat, Texture, Thumbnail};
use crate::package::Package;

/// Parse a part targeted by a texture relationship
pub fn parse_texture(package: &Package, log: &mut Log, path: &str, data: &[u8]) -> Result<Texture> {
    let content_type = package.types.content_type_for(path).map(str::to_string);
    let format = ImageFormat::sniff(data);

    if let Some(declared) = content_type.as_deref().and_then(ImageFormat::from_content_type) {
        check_format(log, declared, format);
    }

    Ok(Texture {
        path: path.to_string(),
        content_type,
        format,
        size: data.len(),
    })
}

/// Parse a part targeted by a thumbnail relationship
///
/// Thumbnails have to be PNG or JPEG, and a JPEG thumbnail has to use an RGB
/// or greyscale colour space.
pub fn parse_thumbnail(
    package: &Package,
    log: &mut Log,
    path: &str,
    data: &[u8],
) -> Result<Thumbnail> {
    let content_type = package.types.content_type_for(path).map(str::to_string);
    let format = ImageFormat::sniff(data);

    match content_type.as_deref().and_then(ImageFormat::from_content_type) {
        Some(declared) => check_format(log, declared, format),
        None => {
            let declared = content_type.as_deref().unwrap_or("none");
            log.error(Message::code(Code::ThumbnailContentType).detail(declared));
        }
    }

    if format == ImageFormat::Jpeg && jpeg_is_cmyk(data) {
        log.error(Message::code(Code::ThumbnailCmykJpeg));
    }

    Ok(Thumbnail {
        path: path.to_string(),
        content_type,
        format,
        size: data.len(),
    })
}

fn check_format(log: &mut Log, declared: ImageFormat, actual: ImageFormat) {
    if declared != actual {
        log.error(
            Message::code(Code::ImageContentMismatch)
                .detail(format!("declared {:?}, found {:?}", declared, actual)),
        );
    }
}

/// Whether a JPEG stream has a frame with four colour components
///
/// Every start-of-frame segment is inspected, since an embedded EXIF preview
/// can use a different colour space than the main image. Four components
/// means CMYK or YCCK.
pub fn jpeg_is_cmyk(data: &[u8]) -> bool {
    // FF marker, 2-byte length, precision, 2-byte height, 2-byte width, components
    const SOF_COMPONENT_COUNT_OFFSET: usize = 9;

    if ImageFormat::sniff(data) != ImageFormat::Jpeg {
        return false;
    }

    let mut i = 2;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        // 0xC4 (DHT), 0xC8 (JPG) and 0xCC (DAC) share the range but are not frames
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof
            && let Some(&components) = data.get(i + SOF_COMPONENT_COUNT_OFFSET)
            && components == 4
        {
            return true;
        }

        let Some(len_bytes) = data.get(i + 2..i + 4) else {
            break;
        };
        let len = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));
        if len < 2 {
            break;
        }
        let next = i.saturating_add(len).saturating_add(2);
        if next > data.len() {
            break;
        }
        i = next;
    }

    false
}
