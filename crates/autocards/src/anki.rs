//! A small AnkiConnect client covering what card delivery needs.
//!
//! Every AnkiConnect call is a POST of `{action, version, key?, params?}`
//! answered by `{result, error}`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{Error, Result};

/// Default URL for AnkiConnect.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8765";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// AnkiConnect API version spoken by this client.
const API_VERSION: u8 = 6;

#[derive(Debug, Serialize)]
struct AnkiRequest<'a, T> {
    action: &'a str,
    version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<T>,
}

#[derive(Debug, Deserialize)]
struct AnkiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

/// A note to add, in AnkiConnect's `addNote` shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Target deck.
    pub deck_name: String,
    /// Note type (model) name.
    pub model_name: String,
    /// Field values keyed by field name.
    pub fields: HashMap<String, String>,
    /// Tags for the note.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Serialize)]
struct AddNoteParams<'a> {
    note: &'a Note,
}

#[derive(Serialize)]
struct CreateDeckParams<'a> {
    deck: &'a str,
}

/// Client for a running Anki with the AnkiConnect add-on.
#[derive(Debug, Clone)]
pub struct AnkiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AnkiClient {
    /// Connect to `http://127.0.0.1:8765` with a 30 second timeout.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_URL, None)
    }

    /// Connect to a custom URL, optionally with an API key.
    pub fn with_url(url: impl Into<String>, api_key: Option<String>) -> Self {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: url.into(),
            api_key,
        }
    }

    /// AnkiConnect's API version.
    pub async fn version(&self) -> Result<u16> {
        self.invoke::<(), _>("version", None).await
    }

    /// Names of all decks.
    pub async fn deck_names(&self) -> Result<Vec<String>> {
        self.invoke::<(), _>("deckNames", None).await
    }

    /// Create a deck, returning its id. Creating an existing deck is a no-op.
    pub async fn create_deck(&self, name: &str) -> Result<i64> {
        self.invoke("createDeck", Some(CreateDeckParams { deck: name }))
            .await
    }

    /// Add a note, returning its id.
    pub async fn add_note(&self, note: &Note) -> Result<i64> {
        self.invoke("addNote", Some(AddNoteParams { note })).await
    }

    /// Synchronise the local collection with AnkiWeb.
    pub async fn sync(&self) -> Result<()> {
        self.invoke_void("sync").await
    }

    async fn invoke<P, R>(&self, action: &str, params: Option<P>) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let response: AnkiResponse<R> = self.send(action, params).await?;

        match (response.result, response.error) {
            (Some(result), None) => Ok(result),
            (_, Some(err)) => Err(map_error(err)),
            (None, None) => Err(Error::EmptyResponse),
        }
    }

    async fn invoke_void(&self, action: &str) -> Result<()> {
        let response: AnkiResponse<serde_json::Value> = self.send::<(), _>(action, None).await?;

        match response.error {
            Some(err) => Err(map_error(err)),
            None => Ok(()),
        }
    }

    async fn send<P, R>(&self, action: &str, params: Option<P>) -> Result<AnkiResponse<R>>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = AnkiRequest {
            action,
            version: API_VERSION,
            key: self.api_key.as_deref(),
            params,
        };
        debug!(action, "ankiconnect request");

        let response = self
            .http_client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::ConnectionRefused
                } else {
                    Error::Http(e)
                }
            })?;

        Ok(response.json().await?)
    }
}

impl Default for AnkiClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_error(err: String) -> Error {
    if err.contains("permission") {
        Error::PermissionDenied
    } else {
        Error::AnkiConnect(err)
    }
}
