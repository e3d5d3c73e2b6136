use serde::{Deserialize, Serialize};

/// Page Segmentation Mode for Tesseract OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PSMMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PSMMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(PSMMode::OsdOnly),
            1 => Ok(PSMMode::AutoOsd),
            2 => Ok(PSMMode::AutoOnly),
            3 => Ok(PSMMode::Auto),
            4 => Ok(PSMMode::SingleColumn),
            5 => Ok(PSMMode::SingleBlockVertical),
            6 => Ok(PSMMode::SingleBlock),
            7 => Ok(PSMMode::SingleLine),
            8 => Ok(PSMMode::SingleWord),
            9 => Ok(PSMMode::CircleWord),
            10 => Ok(PSMMode::SingleChar),
            11 => Ok(PSMMode::SparseText),
            12 => Ok(PSMMode::SparseTextOsd),
            13 => Ok(PSMMode::RawLine),
            _ => Err(format!("Invalid PSM mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Text produced by one OCR run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Recognized text with surrounding whitespace trimmed
    pub content: String,
    /// Language hint the engine was run with
    pub language: String,
    /// Backend name (e.g. "tesseract")
    pub backend: String,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psm_mode_round_trip_bounds() {
        assert_eq!(PSMMode::from_u8(3).unwrap(), PSMMode::Auto);
        assert_eq!(PSMMode::from_u8(13).unwrap().as_u8(), 13);
        assert_eq!(PSMMode::SingleBlock.as_u8(), 6);
    }

    #[test]
    fn test_psm_mode_invalid() {
        let err = PSMMode::from_u8(14).unwrap_err();
        assert!(err.contains("14"));
    }
}
