//! Google Cloud Vision text detection.

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ocr::TextExtractor;

/// Default Vision REST endpoint.
pub const VISION_URL: &str = "https://vision.googleapis.com/v1";

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    full_text_annotation: Option<FullText>,
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Deserialize)]
struct FullText {
    text: String,
}

#[derive(Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Deserialize)]
struct Status {
    message: String,
}

/// OCR through the Vision `images:annotate` endpoint, authenticated with an API key.
#[derive(Debug, Clone)]
pub struct VisionClient {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl VisionClient {
    /// Create a client for the public Vision endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: VISION_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Use a different Vision endpoint.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl TextExtractor for VisionClient {
    async fn img_to_str(&self, image: &[u8]) -> Result<String> {
        let content = base64::engine::general_purpose::STANDARD.encode(image);
        debug!("sending {} bytes to vision", image.len());

        let body = serde_json::json!({
            "requests": [{
                "image": { "content": content },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .http_client
            .post(format!("{}/images:annotate", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Vision(format!("{}: {}", status, text)));
        }

        let annotated: AnnotateResponse = response.json().await?;
        let Some(first) = annotated.responses.into_iter().next() else {
            return Ok(String::new());
        };

        if let Some(status) = first.error {
            return Err(Error::Vision(status.message));
        }

        let text = first
            .full_text_annotation
            .map(|f| f.text)
            .or_else(|| {
                first
                    .text_annotations
                    .into_iter()
                    .next()
                    .map(|a| a.description)
            })
            .unwrap_or_default();

        Ok(text)
    }
}
