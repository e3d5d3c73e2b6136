//! Language classification of extracted text.
//!
//! A classifier is made of two pre-trained artifacts produced elsewhere:
//!
//! - a [`TextVectorizer`] turning text into a sparse feature vector
//! - a [`LanguageModel`] mapping feature vectors to a language label
//!
//! Both are loaded through a [`ModelSource`]; [`FileModelSource`] reads them
//! from the paths in `[models]`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ocr_langid::classifier::load_models;
//! use ocr_langid::core::config::ModelConfig;
//!
//! # fn example() -> ocr_langid::Result<()> {
//! match load_models(&ModelConfig::default()) {
//!     Some(classifier) => println!("{}", classifier.predict("Bonjour tout le monde")?.label),
//!     None => eprintln!("model or vectorizer not found"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod model;
pub mod vectorizer;

pub use loader::{FileModelSource, ModelSource, load_models, read_artifact, write_artifact};
pub use model::{LanguageModel, Prediction};
pub use vectorizer::{Analyzer, Norm, SparseVector, TextVectorizer};

use crate::Result;

/// Anything that maps text to a language label.
pub trait LanguageClassifier: Send + Sync {
    fn predict(&self, text: &str) -> Result<Prediction>;
}

/// Vectorizer and model that were validated against each other.
#[derive(Debug, Clone)]
pub struct ClassifierPipeline {
    vectorizer: TextVectorizer,
    model: LanguageModel,
}

impl ClassifierPipeline {
    pub fn new(vectorizer: TextVectorizer, model: LanguageModel) -> Result<Self> {
        vectorizer.validate()?;
        model.validate(vectorizer.n_features())?;
        Ok(Self { vectorizer, model })
    }

    pub fn vectorizer(&self) -> &TextVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &LanguageModel {
        &self.model
    }
}

impl LanguageClassifier for ClassifierPipeline {
    fn predict(&self, text: &str) -> Result<Prediction> {
        let features = self.vectorizer.transform(text);
        if features.is_empty() {
            tracing::debug!("no known terms in text, prediction falls back to model priors");
        }
        Ok(self.model.predict(&features))
    }
}
