//! Language detection using the whatlang library.
//!
//! This is a model-free heuristic shown next to the classifier's answer. It
//! works on any text, so it also gives a hint when no classifier artifacts are
//! deployed or when the classifier was trained on a narrow set of languages.

use crate::core::config::LanguageDetectionConfig;
use serde::{Deserialize, Serialize};
use whatlang::detect;

/// Result of the heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    /// ISO 639-3 code (e.g. "eng", "cmn")
    pub code: String,
    /// English name of the language
    pub name: String,
    /// Writing system (e.g. "Latin", "Mandarin")
    pub script: String,
    pub confidence: f64,
    pub reliable: bool,
}

/// Detect the dominant language of `text`.
///
/// Returns `None` when detection is disabled, the text is blank, or the
/// confidence is below `config.min_confidence`.
///
/// # Example
///
/// ```rust
/// use ocr_langid::core::config::LanguageDetectionConfig;
/// use ocr_langid::language_detection::detect_language;
///
/// let config = LanguageDetectionConfig::default();
/// if let Some(detected) = detect_language("Ceci est une phrase écrite en français.", &config) {
///     println!("{} ({}), confidence {:.2}", detected.name, detected.code, detected.confidence);
/// }
/// assert!(detect_language("", &config).is_none());
/// ```
pub fn detect_language(text: &str, config: &LanguageDetectionConfig) -> Option<DetectedLanguage> {
    if !config.enabled || text.trim().is_empty() {
        return None;
    }

    let info = detect(text)?;
    if info.confidence() < config.min_confidence {
        tracing::debug!(
            lang = info.lang().code(),
            confidence = info.confidence(),
            "language heuristic below confidence threshold"
        );
        return None;
    }

    Some(DetectedLanguage {
        code: info.lang().code().to_string(),
        name: info.lang().eng_name().to_string(),
        script: info.script().name().to_string(),
        confidence: info.confidence(),
        reliable: info.is_reliable(),
    })
}
