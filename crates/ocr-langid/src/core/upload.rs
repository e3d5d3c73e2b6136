//! Handling of uploaded image bytes.
//!
//! Uploads are sniffed and size-checked before anything touches the OCR
//! engine, then written to a scratch file that is unique to the request and
//! deleted when it goes out of scope.

use crate::{LangIdError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// What we learned about an upload without fully decoding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub mime_type: String,
    pub extension: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

impl ImageInfo {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Check that `bytes` is an image we can hand to the OCR engine.
///
/// # Errors
///
/// `LangIdError::ImageProcessing` when the bytes are empty, not an image, or
/// have more than `max_pixels` pixels.
pub fn inspect_image(bytes: &[u8], max_pixels: u64) -> Result<ImageInfo> {
    if bytes.is_empty() {
        return Err(LangIdError::image_processing("The uploaded file is empty"));
    }

    let kind = infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .ok_or_else(|| LangIdError::image_processing("The uploaded file is not an image"))?;

    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LangIdError::image_processing_with_source("Failed to read image header", e))?
        .into_dimensions()
        .map_err(|e| {
            LangIdError::image_processing_with_source(format!("Unsupported or corrupt {} image", kind.mime_type()), e)
        })?;

    let info = ImageInfo {
        mime_type: kind.mime_type().to_string(),
        extension: kind.extension().to_string(),
        width,
        height,
        size_bytes: bytes.len(),
    };

    if info.pixels() > max_pixels {
        return Err(LangIdError::image_processing(format!(
            "Image is {}x{} pixels, larger than the limit of {} pixels",
            width, height, max_pixels
        )));
    }

    Ok(info)
}

/// Per-request copy of an upload on disk. Removed on drop.
#[derive(Debug)]
pub struct ScratchImage {
    file: NamedTempFile,
}

impl ScratchImage {
    /// Write `bytes` to a fresh file in `dir`, creating `dir` if needed.
    pub fn create(dir: &Path, bytes: &[u8], extension: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let suffix = format!(".{}", extension);
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "wrote scratch image");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now and report failures instead of ignoring them.
    pub fn remove(self) -> Result<PathBuf> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        Ok(path)
    }
}
