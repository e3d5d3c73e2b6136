//! Configuration loading and management.
//!
//! Configuration can be loaded from TOML, YAML or JSON files, discovered as
//! `ocr-langid.toml` in the current directory or one of its parents, or built
//! programmatically. Every section has defaults, so an empty file is valid.

use crate::{LangIdError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`AppConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "ocr-langid.toml";

/// Language hint passed to Tesseract when nothing else is configured.
pub const DEFAULT_OCR_LANGUAGE: &str = "chi_sim+chi_tra+eng";

/// Top-level application configuration.
///
/// # Example
///
/// ```rust
/// use ocr_langid::AppConfig;
///
/// let config = AppConfig::default();
/// assert_eq!(config.ocr.language, "chi_sim+chi_tra+eng");
/// assert_eq!(config.server.port, 5000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub models: ModelConfig,

    #[serde(default)]
    pub uploads: UploadConfig,

    #[serde(default)]
    pub language_detection: LanguageDetectionConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum size of a request body (the whole multipart upload)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Tesseract settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language hint, `+`-joined traineddata codes (e.g. "eng+fra")
    #[serde(default = "default_language")]
    pub language: String,

    /// Path or name of the tesseract executable
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: String,

    /// Page segmentation mode
    #[serde(default = "default_psm")]
    pub psm: u8,

    /// OCR engine mode
    #[serde(default = "default_oem")]
    pub oem: u8,

    /// Upper bound for a single OCR run
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Simultaneous tesseract processes (None = number of CPUs)
    #[serde(default)]
    pub max_concurrent: Option<usize>,

    /// Overrides `TESSDATA_PREFIX` for the child process
    #[serde(default)]
    pub tessdata_prefix: Option<PathBuf>,

    /// Uploads with more pixels than this are rejected before OCR
    #[serde(default = "default_max_image_pixels")]
    pub max_image_pixels: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            tesseract_cmd: default_tesseract_cmd(),
            psm: default_psm(),
            oem: default_oem(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: None,
            tessdata_prefix: None,
            max_image_pixels: default_max_image_pixels(),
        }
    }
}

impl OcrConfig {
    /// Effective concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Locations of the pre-trained artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    #[serde(default = "default_vectorizer_path")]
    pub vectorizer_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            vectorizer_path: default_vectorizer_path(),
        }
    }
}

/// Where uploads are written while a request is being processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
        }
    }
}

/// Language heuristic shown next to the classifier result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDetectionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum confidence (0.0-1.0)
    #[serde(default = "default_confidence")]
    pub min_confidence: f64,
}

impl Default for LanguageDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_confidence: default_confidence(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_language() -> String {
    DEFAULT_OCR_LANGUAGE.to_string()
}
fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}
fn default_psm() -> u8 {
    3
}
fn default_oem() -> u8 {
    3
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_image_pixels() -> u64 {
    50_000_000
}
fn default_model_path() -> PathBuf {
    PathBuf::from("models").join("language_model.json")
}
fn default_vectorizer_path() -> PathBuf {
    PathBuf::from("models").join("vectorizer.json")
}
fn default_scratch_dir() -> PathBuf {
    PathBuf::from("static")
}
fn default_confidence() -> f64 {
    0.5
}

impl AppConfig {
    /// Load configuration from a file, picking the format from its extension.
    ///
    /// `.toml`, `.yaml`/`.yml` and `.json` are supported.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(LangIdError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| LangIdError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| LangIdError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| LangIdError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Discover `ocr-langid.toml` in the current directory or its parents.
    ///
    /// Returns `Ok(None)` when no file is found.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(LangIdError::Io)?;
        Self::discover_from(&current)
    }

    /// Same as [`AppConfig::discover`], starting from `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "discovered config file");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }
        Ok(None)
    }

    /// Apply `OCR_LANGID_HOST`, `OCR_LANGID_PORT` and
    /// `OCR_LANGID_MAX_UPLOAD_BYTES` on top of the loaded values.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("OCR_LANGID_HOST") {
            if !host.trim().is_empty() {
                self.server.host = host.trim().to_string();
            }
        }

        if let Ok(value) = std::env::var("OCR_LANGID_PORT") {
            match value.parse::<u16>() {
                Ok(port) if port > 0 => self.server.port = port,
                _ => tracing::warn!("Ignoring OCR_LANGID_PORT='{}', must be a port number in 1-65535", value),
            }
        }

        if let Ok(value) = std::env::var("OCR_LANGID_MAX_UPLOAD_BYTES") {
            match value.parse::<usize>() {
                Ok(bytes) if bytes > 0 => {
                    tracing::info!(
                        "Upload size limit configured from environment: {} bytes ({:.1} MB)",
                        bytes,
                        bytes as f64 / (1024.0 * 1024.0)
                    );
                    self.server.max_upload_bytes = bytes;
                }
                _ => tracing::warn!(
                    "Ignoring OCR_LANGID_MAX_UPLOAD_BYTES='{}', must be a positive integer",
                    value
                ),
            }
        }
    }

    /// Check values that serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(LangIdError::validation("server.port must be greater than 0"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(LangIdError::validation("server.max_upload_bytes must be greater than 0"));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(LangIdError::validation("ocr.timeout_secs must be greater than 0"));
        }
        if self.ocr.max_concurrent == Some(0) {
            return Err(LangIdError::validation("ocr.max_concurrent must be greater than 0"));
        }
        crate::ocr::validate_language_code(&self.ocr.language)?;
        crate::ocr::PSMMode::from_u8(self.ocr.psm).map_err(LangIdError::validation)?;
        if self.ocr.oem > 3 {
            return Err(LangIdError::validation(format!(
                "ocr.oem must be between 0 and 3, got {}",
                self.ocr.oem
            )));
        }
        if !(0.0..=1.0).contains(&self.language_detection.min_confidence) {
            return Err(LangIdError::validation(format!(
                "language_detection.min_confidence must be between 0.0 and 1.0, got {}",
                self.language_detection.min_confidence
            )));
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| LangIdError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.ocr.language, DEFAULT_OCR_LANGUAGE);
        assert_eq!(config.models.model_path, PathBuf::from("models/language_model.json"));
        assert_eq!(config.uploads.scratch_dir, PathBuf::from("static"));
        assert!(config.language_detection.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr-langid.toml");
        fs::write(&path, "").unwrap();

        let config = AppConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.ocr.timeout_secs, 60);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[server]
port = 8080

[ocr]
language = "eng+fra"
timeout_secs = 5
max_concurrent = 2

[models]
model_path = "artifacts/model.msgpack"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ocr.language, "eng+fra");
        assert_eq!(config.ocr.concurrency(), 2);
        assert_eq!(config.models.model_path, PathBuf::from("artifacts/model.msgpack"));
        assert_eq!(config.models.vectorizer_path, PathBuf::from("models/vectorizer.json"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../ocr-langid.example.toml");
        let config = AppConfig::from_file(&path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.ocr.language, DEFAULT_OCR_LANGUAGE);
        assert_eq!(config.uploads.scratch_dir, PathBuf::from("static"));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ocr:\n  language: deu\nlanguage_detection:\n  enabled: false\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.ocr.language, "deu");
        assert!(!config.language_detection.enabled);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"uploads": {"scratch_dir": "/tmp/uploads"}}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.uploads.scratch_dir, PathBuf::from("/tmp/uploads"));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = AppConfig::from_file("config.ini");
        assert!(matches!(result, Err(LangIdError::Validation { .. })));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        let err = AppConfig::from_toml_file(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_discover_from_parent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[server]\nport = 9100\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = AppConfig::discover_from(&nested).unwrap().expect("config should be found");
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_discover_none() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("empty");
        fs::create_dir_all(&nested).unwrap();
        assert!(matches!(AppConfig::discover_from(&nested), Ok(None)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.ocr.language = "eng+klingon".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ocr.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ocr.psm = 14;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.language_detection.min_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ocr.max_concurrent = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_env_overrides() {
        unsafe {
            std::env::set_var("OCR_LANGID_HOST", "0.0.0.0");
            std::env::set_var("OCR_LANGID_PORT", "8123");
            std::env::set_var("OCR_LANGID_MAX_UPLOAD_BYTES", "1048576");
        }

        let mut config = AppConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.max_upload_bytes, 1024 * 1024);

        unsafe {
            std::env::remove_var("OCR_LANGID_HOST");
            std::env::remove_var("OCR_LANGID_PORT");
            std::env::remove_var("OCR_LANGID_MAX_UPLOAD_BYTES");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_env_overrides_ignore_invalid() {
        unsafe {
            std::env::remove_var("OCR_LANGID_HOST");
            std::env::set_var("OCR_LANGID_PORT", "not a port");
            std::env::set_var("OCR_LANGID_MAX_UPLOAD_BYTES", "0");
        }

        let mut config = AppConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_upload_bytes, 20 * 1024 * 1024);

        unsafe {
            std::env::remove_var("OCR_LANGID_PORT");
            std::env::remove_var("OCR_LANGID_MAX_UPLOAD_BYTES");
        }
    }
}
