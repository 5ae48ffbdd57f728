//! Multipart image uploads.

use axum::{body::Bytes, extract::Multipart};
use tracing::debug;

use geolens_core::{sniff_image_mime, GeoLensError, ImageUpload};

use crate::error::ApiError;

pub const MIN_MULTI_IMAGES: usize = 2;
pub const MAX_MULTI_IMAGES: usize = 6;

/// One file part as received, before decoding.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Read every part named `field_name`. Other parts are skipped.
pub async fn read_files(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        debug!(field = field_name, filename = %filename, bytes = data.len(), "Received upload part");
        files.push(UploadedFile { filename, data });
    }
    Ok(files)
}

/// Identify the image format and keep the bytes in memory.
pub fn decode(file: UploadedFile) -> Result<ImageUpload, GeoLensError> {
    let Some(mime_type) = sniff_image_mime(&file.data) else {
        let name = if file.filename.is_empty() { "upload" } else { file.filename.as_str() };
        return Err(GeoLensError::ImageDecode(format!(
            "{name} ({} bytes) is not a supported image",
            file.data.len()
        )));
    };
    Ok(ImageUpload {
        filename: file.filename,
        mime_type: mime_type.to_string(),
        data: file.data.to_vec(),
    })
}

/// The single `image` part, required.
pub async fn single_image(multipart: Multipart) -> Result<ImageUpload, ApiError> {
    let file = read_files(multipart, "image")
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            GeoLensError::InvalidUpload("No image file provided (multipart field 'image')".into())
        })?;
    Ok(decode(file)?)
}

/// Between two and six `images` parts with non-empty filenames.
pub fn validate_multi(files: Vec<UploadedFile>) -> Result<Vec<UploadedFile>, ApiError> {
    let received = files.len();
    if !(MIN_MULTI_IMAGES..=MAX_MULTI_IMAGES).contains(&received) {
        return Err(GeoLensError::InvalidUpload(format!(
            "Please upload between {MIN_MULTI_IMAGES} and {MAX_MULTI_IMAGES} images (received {received})"
        ))
        .into());
    }
    let valid: Vec<_> = files.into_iter().filter(|f| !f.filename.is_empty()).collect();
    if valid.len() < MIN_MULTI_IMAGES {
        return Err(GeoLensError::InvalidUpload(format!(
            "At least {MIN_MULTI_IMAGES} valid images are required (received {})",
            valid.len()
        ))
        .into());
    }
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.into(),
            data: Bytes::from_static(JPEG),
        }
    }

    fn files(n: usize) -> Vec<UploadedFile> {
        (0..n).map(|i| file(&format!("{i}.jpg"))).collect()
    }

    #[test]
    fn multi_accepts_two_through_six() {
        assert_eq!(validate_multi(files(2)).unwrap().len(), 2);
        assert_eq!(validate_multi(files(6)).unwrap().len(), 6);
    }

    #[test]
    fn multi_rejects_one_and_seven() {
        for n in [0, 1, 7] {
            let err = validate_multi(files(n)).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn multi_drops_parts_without_filename() {
        let err = validate_multi(vec![file("a.jpg"), file(""), file("")]).unwrap_err();
        assert!(err.to_string().contains("At least 2 valid images"));
        assert_eq!(validate_multi(vec![file("a.jpg"), file(""), file("b.jpg")]).unwrap().len(), 2);
    }

    #[test]
    fn decode_sniffs_the_format() {
        let image = decode(file("photo.bin")).unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, JPEG);
    }

    #[test]
    fn decode_rejects_non_images() {
        let err = decode(UploadedFile {
            filename: "notes.txt".into(),
            data: Bytes::from_static(b"just text"),
        })
        .unwrap_err();
        assert!(matches!(err, GeoLensError::ImageDecode(ref m) if m.contains("notes.txt")));
    }
}
