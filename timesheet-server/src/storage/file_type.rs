//! Attachment file type validation
//!
//! Extension whitelist plus magic-number sniffing: a file whose bytes do not
//! match its extension is rejected even if the extension is allowed.

use std::path::Path;

use crate::utils::{AppError, AppResult, ErrorCode};

/// Supported attachment formats
pub const SUPPORTED_FORMATS: &[&str] = &["pdf", "png", "jpg", "jpeg", "gif"];

const PDF_MAGIC: &[u8] = b"%PDF";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF";
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";

/// Validated upload metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadKind {
    /// Lowercase extension (`jpeg` kept as-is)
    pub extension: String,
    pub mime_type: String,
}

/// Lowercase extension of `filename`, if any
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether `data` starts with the magic number for `ext`
pub fn matches_magic(ext: &str, data: &[u8]) -> bool {
    match ext {
        "pdf" => data.starts_with(PDF_MAGIC),
        "png" => data.starts_with(PNG_MAGIC),
        "jpg" | "jpeg" => data.starts_with(JPEG_MAGIC),
        "gif" => data.starts_with(GIF87_MAGIC) || data.starts_with(GIF89_MAGIC),
        _ => false,
    }
}

/// Check size, extension and content of an upload
pub fn validate_upload(filename: &str, data: &[u8], max_bytes: usize) -> AppResult<UploadKind> {
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > max_bytes {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large. Maximum size is {} bytes", max_bytes),
        )
        .with_detail("max_bytes", max_bytes)
        .with_detail("size", data.len()));
    }

    let ext = extension_of(filename)
        .filter(|ext| SUPPORTED_FORMATS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Supported formats: {}", SUPPORTED_FORMATS.join(", ")),
            )
            .with_detail("filename", filename)
        })?;

    if !matches_magic(&ext, data) {
        return Err(AppError::new(ErrorCode::FileContentMismatch).with_detail("extension", ext));
    }

    let mime_type = mime_guess::from_ext(&ext)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(UploadKind {
        extension: ext,
        mime_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_magic_numbers() {
        assert!(matches_magic("pdf", b"%PDF-1.7\n"));
        assert!(matches_magic("png", PNG));
        assert!(matches_magic("jpg", b"\xFF\xD8\xFF\xE0"));
        assert!(matches_magic("jpeg", b"\xFF\xD8\xFF\xE1"));
        assert!(matches_magic("gif", b"GIF89a...."));
        assert!(matches_magic("gif", b"GIF87a...."));
        assert!(!matches_magic("pdf", PNG));
        assert!(!matches_magic("exe", b"MZ"));
    }

    #[test]
    fn test_validate_upload_accepts_matching_content() {
        let kind = validate_upload("Receipt.PNG", PNG, 1024).unwrap();
        assert_eq!(kind.extension, "png");
        assert_eq!(kind.mime_type, "image/png");

        let kind = validate_upload("scan.pdf", b"%PDF-1.4", 1024).unwrap();
        assert_eq!(kind.mime_type, "application/pdf");
    }

    #[test]
    fn test_validate_upload_rejections() {
        assert_eq!(
            validate_upload("a.png", b"", 1024).unwrap_err().code,
            ErrorCode::EmptyFile
        );
        assert_eq!(
            validate_upload("a.png", PNG, 4).unwrap_err().code,
            ErrorCode::FileTooLarge
        );
        assert_eq!(
            validate_upload("a.exe", b"MZ", 1024).unwrap_err().code,
            ErrorCode::UnsupportedFileFormat
        );
        assert_eq!(
            validate_upload("noext", PNG, 1024).unwrap_err().code,
            ErrorCode::UnsupportedFileFormat
        );
        assert_eq!(
            validate_upload("fake.pdf", PNG, 1024).unwrap_err().code,
            ErrorCode::FileContentMismatch
        );
    }
}
