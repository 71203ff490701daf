//! Text extraction from uploaded files
//!
//! Extraction is selected by file extension. Only plain-text formats are
//! supported; everything else is rejected up front so a bad file never
//! reaches the chunker.

use cognita_common::errors::{AppError, Result};

/// Trait for per-format text extraction
pub trait TextExtractor: Send + Sync {
    /// Extract UTF-8 text from raw file bytes
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

impl std::fmt::Debug for dyn TextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TextExtractor")
    }
}

/// Extractor for plain-text formats (.txt, .md)
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| AppError::Ingestion {
            filename: String::new(),
            message: format!("file is not valid UTF-8: {}", e),
        })
    }
}

/// Lowercased extension of a filename, if any
fn extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Select an extractor for a filename.
///
/// Fails with an unsupported-file-type error for unknown extensions.
pub fn extractor_for(filename: &str) -> Result<Box<dyn TextExtractor>> {
    match extension(filename).as_deref() {
        Some("txt") | Some("md") => Ok(Box::new(PlainTextExtractor)),
        Some(other) => Err(AppError::UnsupportedFileType {
            extension: other.to_string(),
        }),
        None => Err(AppError::UnsupportedFileType {
            extension: String::new(),
        }),
    }
}

/// Extract text from a file, enforcing the size limit first.
pub fn extract_text(filename: &str, bytes: &[u8], max_file_size: usize) -> Result<String> {
    if bytes.len() > max_file_size {
        return Err(AppError::FileTooLarge {
            size: bytes.len(),
            limit: max_file_size,
        });
    }

    let extractor = extractor_for(filename)?;
    extractor.extract(bytes).map_err(|e| match e {
        AppError::Ingestion { message, .. } => AppError::Ingestion {
            filename: filename.to_string(),
            message,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txt_and_md_supported() {
        assert!(extractor_for("notes.txt").is_ok());
        assert!(extractor_for("README.md").is_ok());
        assert!(extractor_for("paper.TXT").is_ok());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = extractor_for("scan.pdf").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFileType { extension } if extension == "pdf"));
        assert!(extractor_for("no_extension").is_err());
    }

    #[test]
    fn test_size_limit_enforced() {
        let bytes = vec![b'a'; 100];
        let err = extract_text("big.txt", &bytes, 50).unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge { size: 100, limit: 50 }));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = extract_text("bad.txt", &[0xff, 0xfe, 0xfd], 1024).unwrap_err();
        assert!(matches!(err, AppError::Ingestion { filename, .. } if filename == "bad.txt"));
    }

    #[test]
    fn test_extracts_text() {
        let text = extract_text("ok.txt", "hello world".as_bytes(), 1024).unwrap();
        assert_eq!(text, "hello world");
    }
}
