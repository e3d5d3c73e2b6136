//! Tesseract backend driving the `tesseract` executable.
//!
//! Each call spawns `tesseract <image> stdout -l <lang> --psm <n> --oem <n>`
//! and reads the recognized text from stdout. The number of concurrent
//! processes is bounded by a semaphore, and every run has a timeout after which
//! the child is killed.

use super::backend::OcrBackend;
use super::error::OcrError;
use super::types::{OcrOutput, PSMMode};
use super::utils::clean_ocr_text;
use super::validation::{major_version, parse_version_output, validate_language_code, validate_tesseract_version};
use crate::core::config::OcrConfig;
use crate::{LangIdError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Semaphore;

/// OCR backend wrapping the `tesseract` CLI tool.
///
/// # Thread Safety
///
/// Cheap to share behind an `Arc`; the semaphore is shared by all clones of
/// the backend.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    config: OcrConfig,
    permits: Arc<Semaphore>,
}

impl TesseractBackend {
    /// Create a backend from the `[ocr]` configuration section.
    pub fn new(config: &OcrConfig) -> Self {
        let concurrency = config.concurrency();
        tracing::debug!(
            cmd = %config.tesseract_cmd,
            concurrency,
            timeout_secs = config.timeout_secs,
            "creating tesseract backend"
        );
        Self {
            config: config.clone(),
            permits: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// Arguments passed to tesseract for one image.
    pub fn build_args(&self, input: &Path, language: &str, psm: PSMMode) -> Vec<OsString> {
        vec![
            input.as_os_str().to_os_string(),
            OsString::from("stdout"),
            OsString::from("-l"),
            OsString::from(language),
            OsString::from("--psm"),
            OsString::from(psm.as_u8().to_string()),
            OsString::from("--oem"),
            OsString::from(self.config.oem.to_string()),
        ]
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.tesseract_cmd);
        if let Some(prefix) = &self.config.tessdata_prefix {
            command.env("TESSDATA_PREFIX", prefix);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, err: std::io::Error) -> LangIdError {
        if err.kind() == std::io::ErrorKind::NotFound {
            OcrError::NotInstalled(format!("'{}' was not found on PATH", self.config.tesseract_cmd)).into()
        } else {
            LangIdError::ocr_with_source(format!("Failed to start '{}'", self.config.tesseract_cmd), err)
        }
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn version(&self) -> Result<String> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        // Older releases print the banner on stderr.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let version = parse_version_output(&stdout)
            .or_else(|| parse_version_output(&stderr))
            .ok_or_else(|| LangIdError::ocr("Could not parse `tesseract --version` output"))?;

        if let Some(major) = major_version(&version) {
            validate_tesseract_version(major)?;
        }
        Ok(version)
    }

    #[tracing::instrument(skip(self), fields(ocr.backend = "tesseract"))]
    async fn process_file(&self, path: &Path, language: &str) -> Result<OcrOutput> {
        validate_language_code(language)?;
        let psm = PSMMode::from_u8(self.config.psm).map_err(OcrError::InvalidConfiguration)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| LangIdError::ocr_with_source("OCR worker pool is closed", e))?;

        let started = Instant::now();
        let child = self
            .command()
            .args(self.build_args(path, language, psm))
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| OcrError::IOError(format!("Failed to read tesseract output: {}", e)))?,
            Err(_) => {
                // Dropping the future drops the child, which kills it.
                tracing::error!(timeout_secs = self.config.timeout_secs, "tesseract timed out");
                return Err(OcrError::Timeout(self.config.timeout_secs).into());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            ))
            .into());
        }

        let content = clean_ocr_text(&String::from_utf8_lossy(&output.stdout));
        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(chars = content.chars().count(), duration_ms, "tesseract finished");

        Ok(OcrOutput {
            content,
            language: language.to_string(),
            backend: self.name().to_string(),
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with(cmd: &str) -> TesseractBackend {
        TesseractBackend::new(&OcrConfig {
            tesseract_cmd: cmd.to_string(),
            psm: 6,
            oem: 1,
            ..Default::default()
        })
    }

    #[test]
    fn test_build_args() {
        let backend = backend_with("tesseract");
        let args = backend.build_args(Path::new("/tmp/upload.png"), "chi_sim+eng", PSMMode::SingleBlock);
        let args: Vec<String> = args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec!["/tmp/upload.png", "stdout", "-l", "chi_sim+eng", "--psm", "6", "--oem", "1"]
        );
    }

    #[tokio::test]
    async fn test_invalid_language_rejected_before_spawn() {
        let backend = backend_with("definitely-not-a-real-binary-1f2e3d");
        let err = backend
            .process_file(Path::new("/tmp/none.png"), "eng+zz")
            .await
            .unwrap_err();
        assert!(err.is_client_error(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_missing_binary_is_missing_dependency() {
        let backend = backend_with("definitely-not-a-real-binary-1f2e3d");
        let err = backend
            .process_file(Path::new("/tmp/none.png"), "eng")
            .await
            .unwrap_err();
        assert!(matches!(err, LangIdError::MissingDependency(_)), "unexpected error: {err}");

        let err = backend.version().await.unwrap_err();
        assert!(matches!(err, LangIdError::MissingDependency(_)));
    }

    #[tokio::test]
    async fn test_invalid_psm_rejected_before_spawn() {
        let backend = TesseractBackend::new(&OcrConfig {
            tesseract_cmd: "definitely-not-a-real-binary-1f2e3d".to_string(),
            psm: 42,
            ..Default::default()
        });
        let err = backend.process_file(Path::new("/tmp/none.png"), "eng").await.unwrap_err();
        assert!(matches!(err, LangIdError::Validation { .. }), "unexpected error: {err}");
    }

    #[test]
    fn test_supports_language() {
        let backend = backend_with("tesseract");
        assert!(backend.supports_language("eng+fra"));
        assert!(!backend.supports_language("english"));
    }
}
