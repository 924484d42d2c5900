//! Image part records: textures and thumbnails

/// Image encoding detected from part bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
    /// Anything else
    Unknown,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes
    pub fn sniff(data: &[u8]) -> Self {
        const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        if data.starts_with(&PNG_SIGNATURE) {
            ImageFormat::Png
        } else if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
            ImageFormat::Jpeg
        } else {
            ImageFormat::Unknown
        }
    }

    /// Format a content type declares, if it declares an image format
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

/// A texture part targeted by a texture relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Absolute part path
    pub path: String,
    /// Content type from `[Content_Types].xml`, if one applies
    pub content_type: Option<String>,
    /// Encoding detected from the bytes
    pub format: ImageFormat,
    /// Size in bytes
    pub size: usize,
}

/// A thumbnail part targeted by a thumbnail relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Absolute part path
    pub path: String,
    /// Content type from `[Content_Types].xml`, if one applies
    pub content_type: Option<String>,
    /// Encoding detected from the bytes
    pub format: ImageFormat,
    /// Size in bytes
    pub size: usize,
}
