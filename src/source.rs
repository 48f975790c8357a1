//! Image sources: an uploaded file or a remote URL.
//!
//! Uploads are sniffed by their magic bytes (falling back to the file
//! extension) and limited to PNG, JPEG and WEBP. The preview is a
//! `data:` URL so any renderer can display it without touching disk; the
//! transport payload is the same base64 without the `data:` prefix.

use crate::error::VisionError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported upload encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Webp,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Webp => "image/webp",
        }
    }

    /// Identify the encoding from the leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(ImageKind::Png),
            image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            image::ImageFormat::WebP => Some(ImageKind::Webp),
            _ => None,
        }
    }

    /// Identify the encoding from a file name's extension.
    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// A file the user picked, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
    kind: ImageKind,
}

impl UploadedFile {
    /// Wrap raw bytes, rejecting anything that is not a supported image.
    ///
    /// Magic bytes win over the extension; the extension is only consulted
    /// when the content is not recognisable at all.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, VisionError> {
        let name = name.into();
        let kind = match ImageKind::sniff(&bytes) {
            Some(kind) => kind,
            None if image::guess_format(&bytes).is_ok() => {
                // A real image, just not one we accept (gif, bmp, ...).
                return Err(VisionError::UnsupportedImage { name });
            }
            None => ImageKind::from_extension(&name)
                .ok_or_else(|| VisionError::UnsupportedImage { name: name.clone() })?,
        };
        Ok(Self { name, bytes, kind })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Standard base64 of the raw bytes, as sent to the OCR service.
    pub fn encoded_payload(&self) -> String {
        let b64 = STANDARD.encode(&self.bytes);
        debug!("Encoded '{}' → {} bytes base64", self.name, b64.len());
        b64
    }

    /// `data:<mime>;base64,<payload>` preview.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.kind.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// The active image source. At most one of file / URL is ever set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageSource {
    #[default]
    None,
    File(UploadedFile),
    Url(String),
}

impl ImageSource {
    pub fn is_none(&self) -> bool {
        matches!(self, ImageSource::None)
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        match self {
            ImageSource::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            ImageSource::Url(u) => Some(u),
            _ => None,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read an image from disk, refusing files over `max_bytes` before reading them.
pub async fn read_image_file(path: &Path, max_bytes: u64) -> Result<UploadedFile, VisionError> {
    let path_buf = PathBuf::from(path);
    let meta = tokio::fs::metadata(path).await.map_err(|e| map_io(&path_buf, e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if meta.len() > max_bytes {
        return Err(VisionError::FileTooLarge {
            name,
            size: meta.len(),
            limit_mib: max_bytes.div_ceil(1024 * 1024),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| map_io(&path_buf, e))?;
    debug!("Read image file: {} ({} bytes)", path.display(), bytes.len());
    UploadedFile::new(name, bytes)
}

fn map_io(path: &Path, e: std::io::Error) -> VisionError {
    match e.kind() {
        std::io::ErrorKind::NotFound => VisionError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => VisionError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => VisionError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
    pub(crate) const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];
    pub(crate) const GIF_MAGIC: &[u8] = b"GIF89a";

    fn webp_bytes() -> Vec<u8> {
        let mut v = b"RIFF".to_vec();
        v.extend_from_slice(&[0x24, 0, 0, 0]);
        v.extend_from_slice(b"WEBPVP8 ");
        v
    }

    #[test]
    fn sniff_supported_kinds() {
        assert_eq!(ImageKind::sniff(PNG_MAGIC), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(JPEG_MAGIC), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(&webp_bytes()), Some(ImageKind::Webp));
        assert_eq!(ImageKind::sniff(GIF_MAGIC), None);
    }

    #[test]
    fn extension_fallback() {
        assert_eq!(ImageKind::from_extension("a.JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("a.webp"), Some(ImageKind::Webp));
        assert_eq!(ImageKind::from_extension("a.txt"), None);
        assert_eq!(ImageKind::from_extension("noext"), None);
    }

    #[test]
    fn gif_is_rejected_even_with_png_name() {
        let err = UploadedFile::new("fake.png", GIF_MAGIC.to_vec()).unwrap_err();
        assert!(matches!(err, VisionError::UnsupportedImage { .. }));
    }

    #[test]
    fn unknown_bytes_use_extension() {
        let f = UploadedFile::new("photo.jpeg", vec![1, 2, 3]).unwrap();
        assert_eq!(f.kind(), ImageKind::Jpeg);
        assert!(UploadedFile::new("notes.txt", vec![1, 2, 3]).is_err());
    }

    #[test]
    fn preview_and_payload_share_base64() {
        let f = UploadedFile::new("x.png", PNG_MAGIC.to_vec()).unwrap();
        let payload = f.encoded_payload();
        assert_eq!(f.data_url(), format!("data:image/png;base64,{payload}"));
        assert_eq!(STANDARD.decode(payload).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/a.png"));
        assert!(is_url("http://example.com/a.png"));
        assert!(!is_url("/tmp/a.png"));
        assert!(!is_url(""));
    }

    #[test]
    fn source_accessors() {
        assert!(ImageSource::default().is_none());
        let s = ImageSource::Url("https://x/y.png".into());
        assert_eq!(s.url(), Some("https://x/y.png"));
        assert!(s.file().is_none());
    }
}
