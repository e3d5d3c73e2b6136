//! Loading classifier artifacts from disk.
//!
//! Artifacts are read on every call; nothing is cached between requests, so
//! replacing the files on disk takes effect immediately. Any failure (missing
//! file, bad encoding, inconsistent shapes) turns into "not loaded" and is
//! logged.

use super::model::LanguageModel;
use super::vectorizer::TextVectorizer;
use super::{ClassifierPipeline, LanguageClassifier};
use crate::core::config::ModelConfig;
use crate::{LangIdError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a classifier comes from.
pub trait ModelSource: Send + Sync {
    /// Load a ready-to-use classifier, or `None` when the artifacts are
    /// unavailable.
    fn load(&self) -> Option<Arc<dyn LanguageClassifier>>;

    /// Cheap availability probe used by `/info`.
    fn is_available(&self) -> bool {
        self.load().is_some()
    }
}

/// Artifacts stored as files, JSON or MessagePack by extension.
#[derive(Debug, Clone)]
pub struct FileModelSource {
    model_path: PathBuf,
    vectorizer_path: PathBuf,
}

impl FileModelSource {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            vectorizer_path: config.vectorizer_path.clone(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn vectorizer_path(&self) -> &Path {
        &self.vectorizer_path
    }

    /// Load and cross-check both artifacts, reporting what went wrong.
    pub fn try_load(&self) -> Result<ClassifierPipeline> {
        let model: LanguageModel = read_artifact(&self.model_path)?;
        let vectorizer: TextVectorizer = read_artifact(&self.vectorizer_path)?;
        ClassifierPipeline::new(vectorizer, model)
    }
}

impl ModelSource for FileModelSource {
    fn load(&self) -> Option<Arc<dyn LanguageClassifier>> {
        match self.try_load() {
            Ok(pipeline) => {
                tracing::debug!(
                    model = %self.model_path.display(),
                    vectorizer = %self.vectorizer_path.display(),
                    classes = pipeline.model().classes().len(),
                    features = pipeline.vectorizer().n_features(),
                    "loaded classifier artifacts"
                );
                Some(Arc::new(pipeline))
            }
            Err(error) => {
                tracing::warn!(
                    model = %self.model_path.display(),
                    vectorizer = %self.vectorizer_path.display(),
                    error = %error,
                    "classifier artifacts could not be loaded"
                );
                None
            }
        }
    }

    fn is_available(&self) -> bool {
        self.model_path.is_file() && self.vectorizer_path.is_file()
    }
}

/// Load the classifier described by `config`, or `None` on any failure.
pub fn load_models(config: &ModelConfig) -> Option<Arc<dyn LanguageClassifier>> {
    FileModelSource::new(config).load()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactFormat {
    Json,
    MessagePack,
}

fn artifact_format(path: &Path) -> Result<ArtifactFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(ArtifactFormat::Json),
        Some("msgpack") | Some("mpk") => Ok(ArtifactFormat::MessagePack),
        _ => Err(LangIdError::model(format!(
            "Unsupported artifact format: {} (expected .json, .msgpack or .mpk)",
            path.display()
        ))),
    }
}

/// Deserialize one artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = artifact_format(path)?;
    let bytes = std::fs::read(path)?;
    let value = match format {
        ArtifactFormat::Json => serde_json::from_slice(&bytes)?,
        ArtifactFormat::MessagePack => rmp_serde::from_slice(&bytes)?,
    };
    Ok(value)
}

/// Serialize one artifact, creating parent directories as needed.
///
/// MessagePack output uses named fields, which tagged models require.
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = match artifact_format(path)? {
        ArtifactFormat::Json => serde_json::to_vec_pretty(value)?,
        ArtifactFormat::MessagePack => rmp_serde::to_vec_named(value)
            .map_err(|e| LangIdError::serialization_with_source("Failed to encode MessagePack artifact", e))?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
