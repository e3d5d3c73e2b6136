//! Error types for ocr-langid.
//!
//! All fallible library operations return [`LangIdError`]:
//!
//! - `Io` - file system errors, passed through unchanged via `?`
//! - `Ocr` - the OCR engine failed, timed out or could not be started
//! - `Validation` - bad input or configuration
//! - `Model` - classifier/vectorizer artifacts are unusable
//! - `ImageProcessing` - the upload is not a decodable image
//! - `Serialization` - JSON/MessagePack/TOML/YAML (de)serialization
//! - `MissingDependency` - an external tool (tesseract) is not installed
//!
//! # Example
//!
//! ```rust
//! use ocr_langid::{LangIdError, Result};
//!
//! fn read_hint(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!     if content.trim().is_empty() {
//!         return Err(LangIdError::validation(format!("Empty language hint in {}", path)));
//!     }
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `LangIdError`.
pub type Result<T> = std::result::Result<T, LangIdError>;

/// Main error type for all ocr-langid operations.
#[derive(Debug, Error)]
pub enum LangIdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Model error: {message}")]
    Model {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for LangIdError {
    fn from(err: serde_json::Error) -> Self {
        LangIdError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<rmp_serde::decode::Error> for LangIdError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        LangIdError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for LangIdError {
    fn from(err: image::ImageError) -> Self {
        LangIdError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::ocr::OcrError> for LangIdError {
    fn from(err: crate::ocr::OcrError) -> Self {
        match err {
            crate::ocr::OcrError::NotInstalled(msg) => LangIdError::MissingDependency(msg),
            crate::ocr::OcrError::InvalidLanguageCode(_) | crate::ocr::OcrError::InvalidConfiguration(_) => {
                LangIdError::Validation {
                    message: err.to_string(),
                    source: Some(Box::new(err)),
                }
            }
            other => LangIdError::Ocr {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl LangIdError {
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(model, Model);
    error_constructor!(image_processing, ImageProcessing);
    error_constructor!(serialization, Serialization);

    /// True for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::ImageProcessing { .. })
    }
}
