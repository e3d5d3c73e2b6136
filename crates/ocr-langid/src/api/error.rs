//! Mapping of library errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::LangIdError;
use crate::core::pipeline::MODELS_MISSING_MESSAGE;

use super::render::message_fragment;
use super::types::ErrorResponse;

const UNSUPPORTED_IMAGE_MESSAGE: &str = "The uploaded file is not a supported image.";
const INTERNAL_MESSAGE: &str = "Text extraction failed. Please try again later.";

/// How an error is rendered to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    Html,
    Json,
}

/// API error response.
///
/// Only a client-safe message is returned; details of server-side failures
/// are logged.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_type: String,
    pub message: String,
    pub format: ErrorFormat,
}

impl ApiError {
    /// 400 with the message shown verbatim.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error_type: "ValidationError".to_string(),
            message: message.into(),
            format: ErrorFormat::Html,
        }
    }

    /// Map a library error to a status code and public message.
    pub fn from_error(error: LangIdError) -> Self {
        let (status, message) = match &error {
            LangIdError::Validation { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
            LangIdError::ImageProcessing { .. } => (StatusCode::BAD_REQUEST, UNSUPPORTED_IMAGE_MESSAGE.to_string()),
            LangIdError::Model { .. } => (StatusCode::INTERNAL_SERVER_ERROR, MODELS_MISSING_MESSAGE.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(error = %error, "identification failed");
        } else {
            tracing::debug!(error = %error, "rejected upload");
        }

        Self {
            status,
            error_type: error_type(&error).to_string(),
            message,
            format: ErrorFormat::Html,
        }
    }

    /// Render as JSON instead of HTML.
    pub fn json(mut self) -> Self {
        self.format = ErrorFormat::Json;
        self
    }
}

impl From<LangIdError> for ApiError {
    fn from(error: LangIdError) -> Self {
        Self::from_error(error)
    }
}

fn error_type(error: &LangIdError) -> &'static str {
    match error {
        LangIdError::Io(_) => "IOError",
        LangIdError::Ocr { .. } => "OCRError",
        LangIdError::Validation { .. } => "ValidationError",
        LangIdError::Model { .. } => "ModelError",
        LangIdError::ImageProcessing { .. } => "ImageProcessingError",
        LangIdError::Serialization { .. } => "SerializationError",
        LangIdError::MissingDependency(_) => "MissingDependencyError",
        LangIdError::Other(_) => "Error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.format {
            ErrorFormat::Html => (self.status, Html(message_fragment(&self.message))).into_response(),
            ErrorFormat::Json => {
                let body = ErrorResponse {
                    error_type: self.error_type,
                    message: self.message,
                    status_code: self.status.as_u16(),
                };
                (self.status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(LangIdError::validation("bad language")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LangIdError::image_processing("corrupt")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LangIdError::model(MODELS_MISSING_MESSAGE)).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(LangIdError::MissingDependency("tesseract".into())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let error = ApiError::from(LangIdError::ocr("tesseract exited with status 1: /tmp/secret"));
        assert_eq!(error.message, INTERNAL_MESSAGE);
        assert_eq!(error.error_type, "OCRError");
    }

    #[test]
    fn test_json_format() {
        let error = ApiError::bad_request("nope").json();
        assert_eq!(error.format, ErrorFormat::Json);
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
