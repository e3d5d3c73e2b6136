//! ocr-langid - identify the language of text in an image
//!
//! An uploaded image is run through Tesseract OCR and the extracted text is
//! classified by a pre-trained vectorizer + model pair. The result is served
//! as an HTML page (or JSON) by a small axum application.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ocr_langid::{AppConfig, core::pipeline::Identifier};
//! use std::sync::Arc;
//!
//! # async fn example() -> ocr_langid::Result<()> {
//! let identifier = Identifier::from_config(Arc::new(AppConfig::default()));
//! let bytes = std::fs::read("scan.png")?;
//! let outcome = identifier.identify(&bytes, None).await?;
//! println!("{} ({:.2})", outcome.prediction.label, outcome.prediction.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): configuration, upload handling and the identify pipeline
//! - **OCR** (`ocr`): the `OcrBackend` trait and the Tesseract CLI backend
//! - **Classifier** (`classifier`): artifact loading, vectorization and prediction
//! - **Language detection** (`language_detection`): model-free whatlang heuristic
//! - **API** (`api`, feature `api`): routes, HTML rendering and the server loop

#![deny(unsafe_code)]

pub mod classifier;
pub mod core;
pub mod error;
pub mod language_detection;
pub mod ocr;

#[cfg(feature = "api")]
pub mod api;

pub use core::config::AppConfig;
pub use core::pipeline::{IdentifyOutcome, Identifier};
pub use error::{LangIdError, Result};
