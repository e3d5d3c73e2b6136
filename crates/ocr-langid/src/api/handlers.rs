//! API request handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    response::Html,
};

use super::{
    error::ApiError,
    render,
    types::{ApiState, HealthResponse, IdentifyResponse, InfoResponse},
};

/// One upload as read from the multipart body.
#[derive(Debug)]
struct Upload {
    bytes: Bytes,
    language: Option<String>,
}

/// Upload form handler.
///
/// GET /
pub async fn upload_form_handler(State(state): State<ApiState>) -> Html<String> {
    Html(render::upload_form(&state.config.ocr.language))
}

/// GET /identify
pub async fn identify_notice_handler() -> Html<String> {
    Html(render::message_fragment(render::IDENTIFY_GET_NOTICE))
}

/// Identify handler.
///
/// POST /identify
///
/// Accepts multipart form data with:
/// - `image`: the image file
/// - `language` (optional): OCR language hint overriding the server default
///
/// Returns an HTML result page, or an HTML error with status 400 (bad input)
/// or 500 (missing models, OCR failure).
pub async fn identify_handler(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, ApiError> {
    let upload = read_upload(multipart).await?;
    let outcome = state
        .identifier
        .identify(&upload.bytes, upload.language.as_deref())
        .await?;
    Ok(Html(render::result_page(&outcome, &upload.bytes)))
}

/// JSON variant of the identify handler.
///
/// POST /api/identify
pub async fn api_identify_handler(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IdentifyResponse>, ApiError> {
    let upload = read_upload(multipart).await.map_err(ApiError::json)?;
    let outcome = state
        .identifier
        .identify(&upload.bytes, upload.language.as_deref())
        .await
        .map_err(|e| ApiError::from(e).json())?;
    Ok(Json(outcome.into()))
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Server info endpoint handler.
///
/// GET /info
pub async fn info_handler(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_backend: state.identifier.ocr_backend().name().to_string(),
        ocr_language: state.config.ocr.language.clone(),
        models_available: state.identifier.models_available(),
    })
}

/// Pull the `image` and `language` fields out of the body.
///
/// A part named `image` without a filename is a plain form value, not a
/// file, and counts as missing.
async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> Result<Upload, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "request is not a multipart upload");
        ApiError::bad_request(render::NO_IMAGE_MESSAGE)
    })?;

    let mut image: Option<(Option<String>, Bytes)> = None;
    let mut language = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" if image.is_none() => {
                let file_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;
                image = Some((file_name, data));
            }
            "language" => {
                language = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    match image {
        None | Some((None, _)) => Err(ApiError::bad_request(render::NO_IMAGE_MESSAGE)),
        Some((Some(file_name), _)) if file_name.is_empty() => {
            Err(ApiError::bad_request(render::NO_SELECTED_FILE_MESSAGE))
        }
        Some((Some(file_name), bytes)) => {
            tracing::debug!(file_name = %file_name, size = bytes.len(), "received upload");
            Ok(Upload { bytes, language })
        }
    }
}

fn multipart_error(error: MultipartError) -> ApiError {
    let mut api_error = ApiError::bad_request(error.body_text());
    api_error.status = error.status();
    api_error
}
