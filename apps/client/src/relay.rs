//! HTTP client for the CivicFlow relay.

use async_trait::async_trait;
use civicflow_core::Report;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::language::Language;
use crate::strategy::{AnalysisRelay, PhotoUpload};

/// Error body returned by the relay on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("civicflow-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<Report> {
        let url = self.url(path);
        debug!("POST {url}");

        let response = self.client.post(&url).multipart(form).send().await?;
        read_report(response).await
    }
}

async fn read_report(response: Response) -> Result<Report> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<Report>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = relay_error_message(&body);
    warn!("Relay returned {status}: {message}");

    Err(ClientError::Relay {
        status: status.as_u16(),
        message,
    })
}

/// `error` (plus `details` when present) from a relay error body, else the raw text.
fn relay_error_message(body: &str) -> String {
    match serde_json::from_str::<RelayErrorBody>(body) {
        Ok(RelayErrorBody {
            error,
            details: Some(details),
        }) => format!("{error}: {details}"),
        Ok(RelayErrorBody { error, .. }) => error,
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl AnalysisRelay for RelayClient {
    async fn analyze_photo(
        &self,
        photo: &PhotoUpload,
        location: &str,
        language: Language,
    ) -> Result<Report> {
        let image = Part::bytes(photo.bytes.to_vec())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.content_type)?;

        let form = Form::new()
            .part("image", image)
            .text("location", location.to_string())
            .text("language", language.as_str());

        self.post_form("/analyze", form).await
    }

    async fn analyze_manual(
        &self,
        category: &str,
        description: &str,
        location: &str,
        language: Language,
    ) -> Result<Report> {
        let form = Form::new()
            .text("category", category.to_string())
            .text("description", description.to_string())
            .text("location", location.to_string())
            .text("language", language.as_str());

        self.post_form("/manual-analyze", form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_json_body() {
        assert_eq!(
            relay_error_message(r#"{"error":"No image uploaded","code":"MISSING_INPUT"}"#),
            "No image uploaded"
        );
        assert_eq!(
            relay_error_message(r#"{"error":"Analysis failed","code":"UPSTREAM_ERROR","details":"quota"}"#),
            "Analysis failed: quota"
        );
    }

    #[test]
    fn test_error_message_from_plain_body() {
        assert_eq!(relay_error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(relay_error_message(""), "empty response");
    }

    #[test]
    fn test_base_url_is_normalised() {
        let relay = RelayClient::new("http://localhost:5000/").unwrap();
        assert_eq!(relay.url("/analyze"), "http://localhost:5000/analyze");
    }
}
