//! OCR (Optical Character Recognition) subsystem.
//!
//! Text is extracted by an [`OcrBackend`]. The production backend,
//! [`TesseractBackend`], drives the `tesseract` executable; tests and
//! embedders can provide their own implementation.
//!
//! # Example
//!
//! ```rust,no_run
//! use ocr_langid::ocr::{OcrBackend, TesseractBackend};
//! use ocr_langid::AppConfig;
//! use std::path::Path;
//!
//! # async fn example() -> ocr_langid::Result<()> {
//! let config = AppConfig::default();
//! let backend = TesseractBackend::new(&config.ocr);
//! let output = backend.process_file(Path::new("scan.png"), "eng").await?;
//! println!("Extracted text: {}", output.content);
//! # Ok(())
//! # }
//! ```
pub mod backend;
pub mod error;
pub mod tesseract;
pub mod types;
pub mod utils;
pub mod validation;

pub use backend::OcrBackend;
pub use error::OcrError;
pub use tesseract::TesseractBackend;
pub use types::{OcrOutput, PSMMode};
pub use utils::clean_ocr_text;
pub use validation::{
    TESSERACT_LANGUAGE_CODES, normalize_language_hint, validate_language_code, validate_tesseract_version,
};
