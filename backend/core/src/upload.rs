use crate::analysis::ImageSummary;

/// An uploaded image, read fully into memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    /// MIME type sniffed from the bytes, not the client's claim.
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    pub fn summary(&self, index: usize) -> ImageSummary {
        ImageSummary {
            index,
            filename: self.filename.clone(),
            content_type: self.mime_type.clone(),
            size_bytes: self.data.len(),
        }
    }
}

/// Sniff an image MIME type from its leading magic bytes.
pub fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("image/tiff"),
        _ => None,
    }
}
