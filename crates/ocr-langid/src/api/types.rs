//! API request and response types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::classifier::ModelSource;
use crate::language_detection::DetectedLanguage;
use crate::ocr::OcrBackend;
use crate::{AppConfig, IdentifyOutcome, Identifier};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Server information response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    /// Crate version
    pub version: String,
    /// Name of the OCR backend
    pub ocr_backend: String,
    /// Default OCR language hint
    pub ocr_language: String,
    /// Whether both classifier artifacts are present
    pub models_available: bool,
}

/// JSON identification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyResponse {
    /// Extracted text
    pub text: String,
    /// Predicted label
    pub language: String,
    pub confidence: f64,
    /// Heuristic result, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected: Option<DetectedLanguage>,
    pub ocr_language: String,
}

impl From<IdentifyOutcome> for IdentifyResponse {
    fn from(outcome: IdentifyOutcome) -> Self {
        Self {
            text: outcome.text,
            language: outcome.prediction.label,
            confidence: outcome.prediction.confidence,
            detected: outcome.detected,
            ocr_language: outcome.ocr_language,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type name
    pub error_type: String,
    pub message: String,
    /// HTTP status code
    pub status_code: u16,
}

/// API server state.
///
/// Holds the configuration the server was started with and the identifier
/// built from it.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub config: Arc<AppConfig>,
    pub identifier: Arc<Identifier>,
}

impl ApiState {
    /// Tesseract and on-disk artifacts, as configured.
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let identifier = Identifier::from_config(Arc::clone(&config));
        Self {
            config,
            identifier: Arc::new(identifier),
        }
    }

    /// Custom OCR backend and model source.
    pub fn with_backends(config: AppConfig, ocr: Arc<dyn OcrBackend>, models: Arc<dyn ModelSource>) -> Self {
        let config = Arc::new(config);
        let identifier = Identifier::new(ocr, models, Arc::clone(&config));
        Self {
            config,
            identifier: Arc::new(identifier),
        }
    }
}
