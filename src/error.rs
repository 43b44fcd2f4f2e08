use thiserror::Error;

/// Main error type for the region tools
#[derive(Error, Debug)]
pub enum RoiError {
    #[error("PDF processing failed: {message}")]
    PdfProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("PDFium library unavailable: {message}")]
    PdfiumUnavailable { message: String },

    #[error("File I/O error: {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid document format: {format}")]
    InvalidFormat { format: String },

    #[error("Document has no pages: {path}")]
    EmptyDocument { path: String },

    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("OCR failed: {message}")]
    Ocr { message: String },

    #[error("OCR engine not found: {command}")]
    OcrEngineUnavailable {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("UI error: {message}")]
    Gui { message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF structure error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RoiError {
    /// Create a PDF processing error with context
    pub fn pdf_processing(message: impl Into<String>) -> Self {
        Self::PdfProcessing {
            message: message.into(),
            source: None,
        }
    }

    /// Create a PDF processing error with source
    pub fn pdf_processing_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::PdfProcessing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a file I/O error
    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIO {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn ocr(message: impl Into<String>) -> Self {
        Self::Ocr {
            message: message.into(),
        }
    }

    pub fn gui(message: impl Into<String>) -> Self {
        Self::Gui {
            message: message.into(),
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            RoiError::PdfProcessing { .. } | RoiError::Pdf(_) => {
                "📄 Couldn't process this PDF. It might be encrypted or corrupted.".to_string()
            }
            RoiError::PdfiumUnavailable { .. } => {
                "📚 PDFium was not found. Put the library in ./lib/ or install it system-wide."
                    .to_string()
            }
            RoiError::FileIO { path, .. } => {
                format!("📁 File access error on {}. Check permissions and disk space.", path)
            }
            RoiError::InvalidFormat { format } => {
                format!("📄 Unsupported format: {}. Only PDFs are accepted.", format)
            }
            RoiError::EmptyDocument { .. } => "📄 The selected PDF has no pages.".to_string(),
            RoiError::OcrEngineUnavailable { command, .. } => {
                format!("🔍 Tesseract was not found at '{}'. Set ocr.tesseract_cmd.", command)
            }
            RoiError::Ocr { .. } => "🔍 Text recognition failed on a page.".to_string(),
            _ => "Something went wrong. Check the logs for details.".to_string(),
        }
    }
}

/// Result type alias for convenience
pub type RoiResult<T> = Result<T, RoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_names_missing_engine() {
        let err = RoiError::OcrEngineUnavailable {
            command: "/opt/tess".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.user_message().contains("/opt/tess"));
        assert_eq!(err.to_string(), "OCR engine not found: /opt/tess");
    }

    #[test]
    fn test_page_out_of_range_display() {
        let err = RoiError::PageOutOfRange { index: 4, count: 2 };
        assert_eq!(err.to_string(), "Page 4 out of range (document has 2 pages)");
    }
}
