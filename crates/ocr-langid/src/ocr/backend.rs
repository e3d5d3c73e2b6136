//! OCR backend trait.

use super::types::OcrOutput;
use super::validation::validate_language_code;
use crate::Result;
use async_trait::async_trait;
use std::path::Path;

/// An engine that turns an image file into text.
///
/// The HTTP layer only talks to this trait, so the engine can be swapped for a
/// stub in tests or for another engine in deployment.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use ocr_langid::ocr::{OcrBackend, OcrOutput};
/// use std::path::Path;
///
/// struct FixedText(&'static str);
///
/// #[async_trait]
/// impl OcrBackend for FixedText {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     async fn process_file(&self, _path: &Path, language: &str) -> ocr_langid::Result<OcrOutput> {
///         Ok(OcrOutput {
///             content: self.0.to_string(),
///             language: language.to_string(),
///             backend: self.name().to_string(),
///             duration_ms: 0,
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Short identifier reported by `/info` and in logs.
    fn name(&self) -> &str;

    /// Engine version, if the engine can report one.
    async fn version(&self) -> Result<String> {
        Ok("unknown".to_string())
    }

    /// Check if this backend accepts a language hint.
    fn supports_language(&self, lang: &str) -> bool {
        validate_language_code(lang).is_ok()
    }

    /// Run OCR over the image at `path` with the given language hint.
    ///
    /// # Errors
    ///
    /// - `LangIdError::Validation` - the language hint is not accepted
    /// - `LangIdError::MissingDependency` - the engine is not installed
    /// - `LangIdError::Ocr` - the engine failed or timed out
    async fn process_file(&self, path: &Path, language: &str) -> Result<OcrOutput>;
}
