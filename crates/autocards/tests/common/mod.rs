//! Common test utilities for autocards integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autocards::{AnkiClient, Card, CardDeliverer, ImageData, ImageSource, TextExtractor};
use serde::Serialize;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

/// Start a new mock server for testing.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Create an AnkiConnect client pointed at the mock server.
pub fn client_for_mock(server: &MockServer) -> AnkiClient {
    AnkiClient::with_url(server.uri(), None)
}

/// Create a successful AnkiConnect response.
pub fn mock_anki_response<T: Serialize>(result: T) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "result": result,
        "error": null
    }))
}

/// Create an error AnkiConnect response.
pub fn mock_anki_error(error: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "result": null,
        "error": error
    }))
}

/// Mount a mock for a specific action (expect exactly 1 call).
pub async fn mock_action(server: &MockServer, action: &str, response: ResponseTemplate) {
    mock_action_times(server, action, response, 1).await;
}

/// Mount a mock for a specific action with expected call count.
pub async fn mock_action_times(
    server: &MockServer,
    action: &str,
    response: ResponseTemplate,
    times: u64,
) {
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "action": action,
            "version": 6
        })))
        .respond_with(response)
        .expect(Times::from(times))
        .mount(server)
        .await;
}

/// Write a phrase file with one phrase per line.
pub fn phrase_file(dir: &Path, name: &str, phrases: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, phrases.join("\n")).unwrap();
    path
}

/// Phrases used across the text source tests.
pub const PHRASES: &[&str] = &[
    "Take this time, Francis, to know your other attendees.",
    "Tell me you're not peddling influence with your wife?",
    "The Russian research vessel.",
    "Let's reconvene when you know more.",
];

/// A deliverer that records every batch and inserts all cards except the
/// ones whose front is listed in `reject`.
#[derive(Debug, Clone, Default)]
pub struct RecordingDeliverer {
    pub calls: Arc<Mutex<Vec<Vec<Card>>>>,
    pub reject: Vec<String>,
}

impl RecordingDeliverer {
    pub fn rejecting(fronts: &[&str]) -> Self {
        Self {
            reject: fronts.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CardDeliverer for RecordingDeliverer {
    async fn deliver(&mut self, cards: Vec<Card>) -> autocards::Result<Vec<Card>> {
        self.calls.lock().unwrap().push(cards.clone());
        Ok(cards
            .into_iter()
            .map(|mut c| {
                c.inserted = !self.reject.contains(&c.front);
                c
            })
            .collect())
    }
}

/// An image source holding images in memory and recording removals.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    pub images: Vec<ImageData>,
    pub removed: Arc<Mutex<Vec<Vec<ImageData>>>>,
}

impl MemoryImageSource {
    /// One image per name; the bytes are the text the fake OCR will "read".
    pub fn with_texts(entries: &[(&str, &str)]) -> Self {
        Self {
            images: entries
                .iter()
                .map(|(source, text)| ImageData {
                    bytes: text.as_bytes().to_vec(),
                    source: source.to_string(),
                })
                .collect(),
            removed: Arc::default(),
        }
    }
}

#[async_trait]
impl ImageSource for MemoryImageSource {
    async fn get_images(&mut self) -> autocards::Result<Vec<ImageData>> {
        Ok(self.images.clone())
    }

    async fn remove_images(&mut self, images: &[ImageData]) -> autocards::Result<()> {
        self.removed.lock().unwrap().push(images.to_vec());
        Ok(())
    }
}

/// OCR that reads image bytes as UTF-8 and counts calls. Images whose text
/// is listed in `reject` fail like an image Vision cannot process.
#[derive(Debug, Clone, Default)]
pub struct Utf8Extractor {
    pub calls: Arc<Mutex<usize>>,
    pub reject: Vec<String>,
}

impl Utf8Extractor {
    pub fn rejecting(texts: &[&str]) -> Self {
        Self {
            reject: texts.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl TextExtractor for Utf8Extractor {
    async fn img_to_str(&self, image: &[u8]) -> autocards::Result<String> {
        *self.calls.lock().unwrap() += 1;
        let text = String::from_utf8_lossy(image).into_owned();
        if self.reject.contains(&text) {
            return Err(autocards::Error::Vision("Bad image data.".to_string()));
        }
        Ok(text)
    }
}
