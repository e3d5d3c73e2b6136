/// Remove control characters that Tesseract emits (form feeds between pages,
/// stray NULs) while keeping line structure.
pub fn strip_control_characters(text: &str) -> String {
    if text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        text.chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect()
    } else {
        text.to_string()
    }
}

/// Normalize raw engine output into the text shown to users.
pub fn clean_ocr_text(raw: &str) -> String {
    strip_control_characters(raw).trim().to_string()
}
