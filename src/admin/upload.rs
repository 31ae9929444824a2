// SPDX-License-Identifier: MPL-2.0

//! Image uploads for logos and banners. Files are embedded straight into the
//! record as `data:` URLs, so nothing goes to object storage.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("unsupported image format: {0:?}")]
    Unsupported(ImageFormat),
}

fn is_supported(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP
    )
}

/// Encode raw image bytes as a `data:<mime>;base64,` URL
pub fn encode_image_bytes(bytes: &[u8]) -> Result<String, ImageError> {
    let format = image::guess_format(bytes).map_err(|_| ImageError::UnknownFormat)?;
    if !is_supported(format) {
        return Err(ImageError::Unsupported(format));
    }
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

pub fn encode_image(path: &Path) -> Result<String, ImageError> {
    let bytes = std::fs::read(path)?;
    let url = encode_image_bytes(&bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "encoded image upload");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_png_bytes_become_data_url() {
        let url = encode_image_bytes(PNG_HEADER).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let payload = url.trim_start_matches("data:image/png;base64,");
        assert_eq!(STANDARD.decode(payload).unwrap(), PNG_HEADER);
    }

    #[test]
    fn test_jpeg_mime_type() {
        let url = encode_image_bytes(JPEG_HEADER).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_non_image_is_rejected() {
        assert!(matches!(
            encode_image_bytes(b"hello, world"),
            Err(ImageError::UnknownFormat)
        ));
    }

    #[test]
    fn test_encode_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PNG_HEADER).unwrap();
        let url = encode_image(file.path()).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let missing = encode_image(Path::new("/nonexistent/logo.png"));
        assert!(matches!(missing, Err(ImageError::Io(_))));
    }
}
