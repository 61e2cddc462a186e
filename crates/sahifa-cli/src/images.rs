//! Page images from local files
//!
//! Scanned pages are stored on the chapter as URLs. A local file is embedded
//! as a `data:<mime>;base64,` URL so it needs no separate upload.

use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// MIME type from the file's magic bytes
fn image_mime(data: &[u8]) -> Option<&'static str> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

/// Encode raw image bytes as a data URL
pub fn encode_data_url(data: &[u8]) -> Option<String> {
    let mime = image_mime(data)?;
    Some(format!("data:{};base64,{}", mime, STANDARD.encode(data)))
}

/// Read an image file into a data URL
pub fn data_url_from_file(path: &Path) -> Result<String> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read image file: {:?}", path))?;
    match encode_data_url(&data) {
        Some(url) => Ok(url),
        None => bail!(
            "{:?} is not a supported image (PNG, JPEG, GIF or WebP)",
            path
        ),
    }
}

/// Short form of an image URL for listings; data URLs are not printed whole
pub fn describe(url: &str) -> String {
    match url.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or("image");
            let size_kb = (url.len() as f64 * 3.0 / 4.0) / 1024.0;
            format!("embedded {} (~{:.1} KB)", mime, size_kb)
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_png_file_becomes_data_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("page1.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let url = data_url_from_file(&path).unwrap();
        assert_eq!(url, format!("data:image/png;base64,{}", STANDARD.encode(PNG_HEADER)));
    }

    #[test]
    fn test_detects_formats() {
        assert_eq!(image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(image_mime(b"GIF89a"), Some("image/gif"));
        assert_eq!(image_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(image_mime(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_rejects_non_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();

        assert!(data_url_from_file(&path).is_err());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("https://img.example/1.png"), "https://img.example/1.png");
        let url = encode_data_url(PNG_HEADER).unwrap();
        assert!(describe(&url).starts_with("embedded image/png"));
    }
}
