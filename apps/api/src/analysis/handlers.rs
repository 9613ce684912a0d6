//! Axum route handlers for the analysis API.

use std::collections::HashMap;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use civicflow_core::Report;
use tracing::{debug, info};

use crate::analysis::service::{
    analyze_image, analyze_manual, ImageSubmission, ManualSubmission, DEFAULT_LANGUAGE,
    DEFAULT_LOCATION,
};
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::InlineImage;
use crate::media::Upload;
use crate::state::AppState;

/// Multipart field carrying the photo on `/analyze`.
const IMAGE_FIELD: &str = "image";

// ────────────────────────────────────────────────────────────────────────────
// Form parsing
// ────────────────────────────────────────────────────────────────────────────

/// Text fields plus the optional image part of one multipart submission.
#[derive(Debug, Default)]
struct FormFields {
    texts: HashMap<String, String>,
    image: Option<Upload>,
}

impl FormFields {
    /// Non-empty trimmed text value.
    fn text(&self, name: &str) -> Option<String> {
        self.texts
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn text_or(&self, name: &str, default: &str) -> String {
        self.text(name).unwrap_or_else(|| default.to_string())
    }
}

/// Body-limit failures surface while streaming fields; keep them apart from malformed input.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Multipart(err.to_string())
    }
}

/// A request that is not multipart at all is treated as an empty form.
async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<FormFields, AppError> {
    let mut form = FormFields::default();
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            debug!("Request is not multipart: {rejection}");
            return Ok(form);
        }
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == IMAGE_FIELD {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let original_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(multipart_error)?;

            if !bytes.is_empty() {
                form.image = Some(Upload {
                    bytes,
                    content_type,
                    original_name,
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(multipart_error)?;
            form.texts.insert(name, value);
        }
    }

    Ok(form)
}

/// `<scheme>://<host>` of this relay as seen by the caller.
fn request_base_url(headers: &HeaderMap, config: &Config) -> String {
    if let Some(base) = &config.public_base_url {
        return base.clone();
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let scheme = header("x-forwarded-proto").unwrap_or_else(|| "http".to_string());
    let host = header("x-forwarded-host")
        .or_else(|| header("host"))
        .unwrap_or_else(|| format!("localhost:{}", config.port));

    format!("{scheme}://{host}")
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Multipart: `image` (required), `location`, `language`.
/// Saves the upload, asks the model for a report and points `image_url` at the saved file.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Report>, AppError> {
    let mut form = read_form(multipart).await?;

    let upload = form
        .image
        .take()
        .ok_or_else(|| AppError::MissingInput("No image uploaded".to_string()))?;
    let location = form.text_or("location", DEFAULT_LOCATION);
    let language = form.text_or("language", DEFAULT_LANGUAGE);

    info!("Processing image... Location: {location}, Lang: {language}");

    let stored = state
        .media
        .save(&upload)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let submission = ImageSubmission {
        image: InlineImage {
            mime_type: upload.content_type,
            data: upload.bytes,
        },
        location,
        language,
    };

    let mut report = analyze_image(state.model.as_ref(), &state.routing, &submission).await?;
    report.image_url = stored.public_url(&request_base_url(&headers, &state.config));

    Ok(Json(report))
}

/// POST /manual-analyze
///
/// Multipart text fields: `category`, `description` (both required), `location`, `language`.
/// The reply carries a fixed placeholder `image_url`.
pub async fn handle_manual_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Report>, AppError> {
    let form = read_form(multipart).await?;

    let (Some(category), Some(description)) = (form.text("category"), form.text("description"))
    else {
        return Err(AppError::MissingInput(
            "Category and description are required".to_string(),
        ));
    };

    info!("Manual Report: {category} - {description}");

    let submission = ManualSubmission {
        category,
        description,
        location: form.text_or("location", DEFAULT_LOCATION),
        language: form.text_or("language", DEFAULT_LANGUAGE),
    };

    let mut report = analyze_manual(state.model.as_ref(), &state.routing, &submission).await?;
    report.image_url = state.config.manual_placeholder_image_url.clone();

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_base_url_from_host_header() {
        let config = Config::for_tests("uploads".into());
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("relay.local:5000"));
        assert_eq!(request_base_url(&headers, &config), "http://relay.local:5000");
    }

    #[test]
    fn test_base_url_honours_forwarded_headers() {
        let config = Config::for_tests("uploads".into());
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("10.0.0.4:5000"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("civic.example.org"));
        assert_eq!(request_base_url(&headers, &config), "https://civic.example.org");
    }

    #[test]
    fn test_base_url_prefers_configured_value() {
        let mut config = Config::for_tests("uploads".into());
        config.public_base_url = Some("https://cdn.example.org".to_string());
        assert_eq!(
            request_base_url(&HeaderMap::new(), &config),
            "https://cdn.example.org"
        );
    }

    #[test]
    fn test_form_text_treats_blank_as_missing() {
        let mut form = FormFields::default();
        form.texts.insert("location".to_string(), "   ".to_string());
        assert_eq!(form.text_or("location", DEFAULT_LOCATION), "Unknown Location");
    }
}
