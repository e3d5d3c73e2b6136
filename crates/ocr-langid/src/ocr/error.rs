use std::fmt;

/// Errors raised by the OCR subsystem.
#[derive(Debug, Clone)]
pub enum OcrError {
    NotInstalled(String),
    UnsupportedVersion(String),
    InvalidConfiguration(String),
    InvalidLanguageCode(String),
    ProcessingFailed(String),
    /// The engine ran longer than the configured number of seconds.
    Timeout(u64),
    IOError(String),
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled(msg) => write!(f, "Tesseract is not available: {}", msg),
            Self::UnsupportedVersion(msg) => write!(f, "Unsupported Tesseract version: {}", msg),
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::InvalidLanguageCode(msg) => write!(f, "Invalid language code: {}", msg),
            Self::ProcessingFailed(msg) => write!(f, "OCR processing failed: {}", msg),
            Self::Timeout(secs) => write!(f, "OCR timed out after {} seconds", secs),
            Self::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}
