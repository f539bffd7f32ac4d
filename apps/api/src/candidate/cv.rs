//! CV text extraction from uploaded files.

use std::path::Path;

use thiserror::Error;

/// File extensions accepted by the CV upload endpoint.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt"];

#[derive(Debug, Error)]
pub enum CvError {
    #[error("Unsupported file type '{0}'. Allowed: .pdf, .txt")]
    UnsupportedFormat(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Text file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("No text could be extracted from the CV")]
    Empty,
}

/// Lower-cased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Rejects files the extractor cannot read before any work is done.
pub fn validate_filename(filename: &str) -> Result<String, CvError> {
    match extension_of(filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        Some(ext) => Err(CvError::UnsupportedFormat(ext)),
        None => Err(CvError::UnsupportedFormat(filename.to_string())),
    }
}

/// Extracts plain text from CV file content based on the file extension.
pub fn read_cv(content: &[u8], filename: &str) -> Result<String, CvError> {
    let text = match validate_filename(filename)?.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(content)
            .map_err(|e| CvError::Pdf(e.to_string()))?,
        _ => String::from_utf8(content.to_vec())?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(CvError::Empty);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(extension_of("Resume.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("notes"), None);
    }

    #[test]
    fn test_read_txt_cv() {
        let text = read_cv(b"  Jane Doe\nRust engineer\n", "cv.txt").unwrap();
        assert_eq!(text, "Jane Doe\nRust engineer");
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = read_cv(b"whatever", "cv.docx").unwrap_err();
        assert!(matches!(err, CvError::UnsupportedFormat(ext) if ext == "docx"));
        let err = validate_filename("cv").unwrap_err();
        assert!(matches!(err, CvError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_rejects_blank_txt() {
        assert!(matches!(read_cv(b" \n\t", "cv.txt"), Err(CvError::Empty)));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        assert!(matches!(
            read_cv(&[0xff, 0xfe, 0x00], "cv.txt"),
            Err(CvError::Encoding(_))
        ));
    }
}
