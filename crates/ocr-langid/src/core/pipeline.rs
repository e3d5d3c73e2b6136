//! The upload → OCR → classify pipeline shared by the HTTP handlers and the CLI.

use crate::classifier::{FileModelSource, ModelSource, Prediction};
use crate::core::config::AppConfig;
use crate::core::upload::{ImageInfo, ScratchImage, inspect_image};
use crate::language_detection::{DetectedLanguage, detect_language};
use crate::ocr::{OcrBackend, TesseractBackend, normalize_language_hint, validate_language_code};
use crate::{LangIdError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Message reported when the classifier artifacts cannot be loaded.
pub const MODELS_MISSING_MESSAGE: &str = "Model or vectorizer not found. Please check your setup.";

/// Everything produced for one identified image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyOutcome {
    /// OCR text, trimmed
    pub text: String,
    pub prediction: Prediction,
    /// Model-free heuristic, `None` when disabled or inconclusive
    pub detected: Option<DetectedLanguage>,
    /// Language hint tesseract ran with
    pub ocr_language: String,
    pub image: ImageInfo,
    pub ocr_duration_ms: u64,
}

/// Runs identification requests against an OCR backend and a model source.
///
/// Both are trait objects so the HTTP layer can be tested without tesseract or
/// real artifacts on disk.
#[derive(Clone)]
pub struct Identifier {
    ocr: Arc<dyn OcrBackend>,
    models: Arc<dyn ModelSource>,
    config: Arc<AppConfig>,
}

impl std::fmt::Debug for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identifier")
            .field("ocr", &self.ocr.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Identifier {
    /// Tesseract plus artifacts read from the configured paths.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let ocr = Arc::new(TesseractBackend::new(&config.ocr));
        let models = Arc::new(FileModelSource::new(&config.models));
        Self::new(ocr, models, config)
    }

    pub fn new(ocr: Arc<dyn OcrBackend>, models: Arc<dyn ModelSource>, config: Arc<AppConfig>) -> Self {
        Self { ocr, models, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ocr_backend(&self) -> &dyn OcrBackend {
        self.ocr.as_ref()
    }

    pub fn models_available(&self) -> bool {
        self.models.is_available()
    }

    /// Identify the language of the text in `bytes`.
    ///
    /// `language` overrides the configured OCR hint for this call.
    ///
    /// # Errors
    ///
    /// - `LangIdError::Validation` - unknown language code in the override
    /// - `LangIdError::ImageProcessing` - the bytes are not a usable image
    /// - `LangIdError::Ocr` / `MissingDependency` - tesseract failed or is absent
    /// - `LangIdError::Model` - the artifacts could not be loaded
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn identify(&self, bytes: &[u8], language: Option<&str>) -> Result<IdentifyOutcome> {
        let ocr_language = match language.map(str::trim).filter(|lang| !lang.is_empty()) {
            Some(lang) => {
                let lang = normalize_language_hint(lang);
                validate_language_code(&lang)?;
                lang
            }
            None => self.config.ocr.language.clone(),
        };

        let image = inspect_image(bytes, self.config.ocr.max_image_pixels)?;
        tracing::debug!(mime = %image.mime_type, width = image.width, height = image.height, "accepted upload");

        let scratch_dir = self.config.uploads.scratch_dir.clone();
        let owned = bytes.to_vec();
        let extension = image.extension.clone();
        let scratch = blocking(move || ScratchImage::create(&scratch_dir, &owned, &extension)).await?;

        let output = self.ocr.process_file(scratch.path(), &ocr_language).await?;
        tracing::debug!(
            backend = %output.backend,
            chars = output.content.chars().count(),
            duration_ms = output.duration_ms,
            "ocr finished"
        );

        let models = Arc::clone(&self.models);
        let classifier = match blocking(move || Ok(models.load())).await? {
            Some(classifier) => classifier,
            None => {
                discard(scratch);
                return Err(LangIdError::model(MODELS_MISSING_MESSAGE));
            }
        };

        let text = output.content.trim().to_string();
        let prediction = {
            let text = text.clone();
            blocking(move || classifier.predict(&text)).await?
        };
        let detected = detect_language(&text, &self.config.language_detection);

        discard(scratch);

        tracing::info!(
            label = %prediction.label,
            confidence = prediction.confidence,
            heuristic = detected.as_ref().map(|d| d.code.as_str()).unwrap_or("-"),
            "identified language"
        );

        Ok(IdentifyOutcome {
            text,
            prediction,
            detected,
            ocr_language,
            image,
            ocr_duration_ms: output.duration_ms,
        })
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LangIdError::Other(format!("Blocking task failed: {}", e)))?
}

fn discard(scratch: ScratchImage) {
    match scratch.remove() {
        Ok(path) => tracing::debug!(path = %path.display(), "removed scratch image"),
        Err(e) => tracing::warn!(error = %e, "failed to remove scratch image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LanguageClassifier;
    use crate::ocr::OcrOutput;
    use async_trait::async_trait;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct FixedOcr {
        text: &'static str,
        seen: Mutex<Vec<(bool, String)>>,
    }

    #[async_trait]
    impl OcrBackend for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn process_file(&self, path: &Path, language: &str) -> Result<OcrOutput> {
            self.seen.lock().unwrap().push((path.exists(), language.to_string()));
            Ok(OcrOutput {
                content: self.text.to_string(),
                language: language.to_string(),
                backend: "fixed".to_string(),
                duration_ms: 3,
            })
        }
    }

    struct Always(&'static str);

    impl LanguageClassifier for Always {
        fn predict(&self, _text: &str) -> Result<Prediction> {
            Ok(Prediction {
                label: self.0.to_string(),
                confidence: 1.0,
            })
        }
    }

    struct StubModels(Option<&'static str>);

    impl ModelSource for StubModels {
        fn load(&self) -> Option<Arc<dyn LanguageClassifier>> {
            self.0.map(|label| Arc::new(Always(label)) as Arc<dyn LanguageClassifier>)
        }
    }

    fn png() -> Vec<u8> {
        let img = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn identifier(scratch: &Path, models: Option<&'static str>) -> (Identifier, Arc<FixedOcr>) {
        let mut config = AppConfig::default();
        config.uploads.scratch_dir = scratch.to_path_buf();
        let ocr = Arc::new(FixedOcr {
            text: "  The quick brown fox jumps over the lazy dog near the river bank.  ",
            seen: Mutex::new(Vec::new()),
        });
        let identifier = Identifier::new(ocr.clone(), Arc::new(StubModels(models)), Arc::new(config));
        (identifier, ocr)
    }

    #[tokio::test]
    async fn test_identify_success() {
        let dir = tempdir().unwrap();
        let (identifier, ocr) = identifier(dir.path(), Some("english"));

        let outcome = identifier.identify(&png(), None).await.unwrap();
        assert_eq!(outcome.prediction.label, "english");
        assert_eq!(outcome.ocr_language, "chi_sim+chi_tra+eng");
        assert_eq!(outcome.image.mime_type, "image/png");
        assert_eq!(outcome.ocr_duration_ms, 3);
        if let Some(detected) = outcome.detected {
            assert_eq!(detected.code, "eng");
        }

        let seen = ocr.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0, "scratch file must exist while OCR runs");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_language_override() {
        let dir = tempdir().unwrap();
        let (identifier, ocr) = identifier(dir.path(), Some("english"));

        let outcome = identifier.identify(&png(), Some(" eng+fra ")).await.unwrap();
        assert_eq!(outcome.ocr_language, "eng+fra");
        assert_eq!(ocr.seen.lock().unwrap()[0].1, "eng+fra");

        let outcome = identifier.identify(&png(), Some(" eng+ fra ")).await.unwrap();
        assert_eq!(outcome.ocr_language, "eng+fra");
        assert_eq!(ocr.seen.lock().unwrap()[1].1, "eng+fra");

        let err = identifier.identify(&png(), Some("klingon")).await.unwrap_err();
        assert!(matches!(err, LangIdError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_models_removes_scratch() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("static");
        let (identifier, ocr) = identifier(&scratch, None);

        let err = identifier.identify(&png(), None).await.unwrap_err();
        assert!(matches!(err, LangIdError::Model { .. }));
        assert!(err.to_string().contains(MODELS_MISSING_MESSAGE));
        assert_eq!(ocr.seen.lock().unwrap().len(), 1);
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_non_image_rejected_before_ocr() {
        let dir = tempdir().unwrap();
        let (identifier, ocr) = identifier(dir.path(), Some("english"));

        let err = identifier.identify(b"%PDF-1.4 not an image", None).await.unwrap_err();
        assert!(err.is_client_error());
        assert!(ocr.seen.lock().unwrap().is_empty());
    }
}
