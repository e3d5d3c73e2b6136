use super::error::OcrError;
use ahash::AHashSet;
use once_cell::sync::Lazy;

/// Oldest Tesseract major version whose CLI we drive.
pub const MINIMAL_SUPPORTED_TESSERACT_VERSION: u32 = 4;

/// Traineddata codes published for Tesseract 4/5.
pub const TESSERACT_LANGUAGE_CODES: &[&str] = &[
    "afr", "amh", "ara", "asm", "aze", "aze_cyrl", "bel", "ben", "bod", "bos", "bre", "bul", "cat", "ceb", "ces",
    "chi_sim", "chi_sim_vert", "chi_tra", "chi_tra_vert", "chr", "cos", "cym", "dan", "deu", "div", "dzo", "ell",
    "eng", "enm", "epo", "equ", "est", "eus", "fao", "fas", "fil", "fin", "fra", "frk", "frm", "fry", "gla", "gle",
    "glg", "grc", "guj", "hat", "heb", "hin", "hrv", "hun", "hye", "iku", "ind", "isl", "ita", "ita_old", "jav",
    "jpn", "jpn_vert", "kan", "kat", "kat_old", "kaz", "khm", "kir", "kmr", "kor", "kor_vert", "lao", "lat", "lav",
    "lit", "ltz", "mal", "mar", "mkd", "mlt", "mon", "mri", "msa", "mya", "nep", "nld", "nor", "oci", "ori", "osd",
    "pan", "pol", "por", "pus", "que", "ron", "rus", "san", "sin", "slk", "slv", "snd", "spa", "spa_old", "sqi",
    "srp", "srp_latn", "sun", "swa", "swe", "syr", "tam", "tat", "tel", "tgk", "tha", "tir", "ton", "tur", "uig",
    "ukr", "urd", "uzb", "uzb_cyrl", "vie", "yid", "yor",
];

static SUPPORTED: Lazy<AHashSet<&'static str>> = Lazy::new(|| TESSERACT_LANGUAGE_CODES.iter().copied().collect());

/// Strip whitespace around each code of a `+`-joined hint (`" eng+ fra "` -> `"eng+fra"`).
pub fn normalize_language_hint(hint: &str) -> String {
    hint.split('+').map(str::trim).collect::<Vec<_>>().join("+")
}

/// Check a `+`-joined language hint such as `chi_sim+chi_tra+eng`.
///
/// Codes must already be trimmed, the hint is passed to tesseract verbatim.
pub fn validate_language_code(lang_code: &str) -> Result<(), OcrError> {
    if lang_code.trim().is_empty() {
        return Err(OcrError::InvalidLanguageCode(
            "Language cannot be empty. Please specify a valid language code (e.g., 'eng')".to_string(),
        ));
    }

    for code in lang_code.split('+') {
        if !SUPPORTED.contains(code) {
            return Err(OcrError::InvalidLanguageCode(format!(
                "Language code '{}' is not supported by Tesseract",
                code
            )));
        }
    }
    Ok(())
}

pub fn validate_tesseract_version(version: u32) -> Result<(), OcrError> {
    if version < MINIMAL_SUPPORTED_TESSERACT_VERSION {
        return Err(OcrError::UnsupportedVersion(format!(
            "Tesseract version {} is not supported. Minimum required version is {}",
            version, MINIMAL_SUPPORTED_TESSERACT_VERSION
        )));
    }
    Ok(())
}

/// Pull the version string out of `tesseract --version` output.
///
/// The first line looks like `tesseract 5.3.0` or `tesseract v5.0.0.20190623`.
pub fn parse_version_output(output: &str) -> Option<String> {
    let first_line = output.lines().find(|line| !line.trim().is_empty())?;
    let mut parts = first_line.split_whitespace();
    if !parts.next()?.eq_ignore_ascii_case("tesseract") {
        return None;
    }
    let version = parts.next()?.trim_start_matches('v');
    if version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        Some(version.to_string())
    } else {
        None
    }
}

/// Major component of a version string (`"5.3.0"` -> `5`).
pub fn major_version(version: &str) -> Option<u32> {
    version.split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_code_valid() {
        assert!(validate_language_code("eng").is_ok());
        assert!(validate_language_code("chi_sim").is_ok());
        assert!(validate_language_code("chi_sim+chi_tra+eng").is_ok());
    }

    #[test]
    fn test_validate_language_code_invalid() {
        let result = validate_language_code("eng+xx");
        assert!(matches!(result, Err(OcrError::InvalidLanguageCode(msg)) if msg.contains("'xx'")));
    }

    #[test]
    fn test_validate_language_code_empty() {
        assert!(validate_language_code("").is_err());
        assert!(validate_language_code("   ").is_err());
        assert!(validate_language_code("eng+").is_err());
    }

    #[test]
    fn test_untrimmed_codes_rejected() {
        assert!(validate_language_code("eng+ fra").is_err());
        assert!(validate_language_code(" eng").is_err());
    }

    #[test]
    fn test_normalize_language_hint() {
        assert_eq!(normalize_language_hint(" eng+ fra "), "eng+fra");
        assert_eq!(normalize_language_hint("chi_sim + chi_tra+eng"), "chi_sim+chi_tra+eng");
        assert_eq!(normalize_language_hint("eng"), "eng");
        assert!(validate_language_code(&normalize_language_hint("eng+ ")).is_err());
    }

    #[test]
    fn test_validate_tesseract_version() {
        assert!(validate_tesseract_version(5).is_ok());
        assert!(validate_tesseract_version(4).is_ok());
        assert!(matches!(
            validate_tesseract_version(3),
            Err(OcrError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_parse_version_output() {
        let out = "tesseract 5.3.0\n leptonica-1.82.0\n  libgif 5.2.1\n";
        assert_eq!(parse_version_output(out).as_deref(), Some("5.3.0"));
        assert_eq!(
            parse_version_output("tesseract v5.0.0.20190623\n").as_deref(),
            Some("5.0.0.20190623")
        );
        assert_eq!(parse_version_output("leptonica-1.82.0"), None);
        assert_eq!(parse_version_output(""), None);
    }

    #[test]
    fn test_major_version() {
        assert_eq!(major_version("5.3.0"), Some(5));
        assert_eq!(major_version("4"), Some(4));
        assert_eq!(major_version("x.1"), None);
    }

    #[test]
    fn test_language_codes_are_unique() {
        assert_eq!(SUPPORTED.len(), TESSERACT_LANGUAGE_CODES.len());
    }
}
