//! HTML pages returned by the form routes.
//!
//! Every interpolated value goes through [`html_escape`]; OCR output is
//! attacker-controlled text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::IdentifyOutcome;

pub const NO_IMAGE_MESSAGE: &str = "No image file provided. Please go back and select a file.";
pub const NO_SELECTED_FILE_MESSAGE: &str = "No selected file. Please go back and select a file.";
pub const IDENTIFY_GET_NOTICE: &str =
    "This endpoint is for image upload via POST. Please use the form on the home page.";

pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// `GET /`
pub fn upload_form(default_language: &str) -> String {
    format!(
        r#"<html>
    <head><title>Upload Image for OCR</title></head>
    <body>
        <h2>Upload an Image for OCR Language Identification</h2>
        <form method="POST" action="/identify" enctype="multipart/form-data">
            <input type="file" name="image" accept="image/*" required><br><br>
            <label>OCR languages <input type="text" name="language" placeholder="{}"></label><br><br>
            <input type="submit" value="Upload and Identify">
        </form>
    </body>
</html>
"#,
        html_escape(default_language)
    )
}

/// Short message fragment used for notices and errors.
pub fn message_fragment(message: &str) -> String {
    format!("<h3>{}</h3>", html_escape(message))
}

/// Result page for a successful identification. The upload is embedded as a
/// `data:` URL so nothing has to be served from the scratch directory.
pub fn result_page(outcome: &IdentifyOutcome, image_bytes: &[u8]) -> String {
    let data_url = format!("data:{};base64,{}", outcome.image.mime_type, STANDARD.encode(image_bytes));

    let heuristic = match &outcome.detected {
        Some(detected) => format!(
            "\n        <p>Script heuristic: {} ({}, {:.0}%)</p>",
            html_escape(&detected.name),
            html_escape(&detected.script),
            detected.confidence * 100.0
        ),
        None => String::new(),
    };

    format!(
        r#"<html>
    <head><title>OCR Result</title></head>
    <body>
        <h2>Uploaded Image</h2>
        <img src="{data_url}" alt="Uploaded Image" style="max-width:400px;"><br><br>
        <h2>Extracted Text</h2>
        <pre style="background:#f4f4f4;padding:10px;">{text}</pre>
        <h2>Identified Language</h2>
        <p style="font-size:1.2em;font-weight:bold;">{label}</p>{heuristic}
        <a href="/">Upload another image</a>
    </body>
</html>
"#,
        data_url = html_escape(&data_url),
        text = html_escape(&outcome.text),
        label = html_escape(&outcome.prediction.label),
        heuristic = heuristic,
    )
}
