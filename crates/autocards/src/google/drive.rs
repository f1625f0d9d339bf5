//! Minimal Google Drive v3 client: find a folder, list and download its
//! images, delete files.

use serde::Deserialize;
use tracing::debug;

use super::auth::GoogleAuth;
use crate::error::{Error, Result};

/// Default Drive v3 REST endpoint.
pub const DRIVE_URL: &str = "https://www.googleapis.com/drive/v3";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// A file entry returned by `files.list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Drive file id.
    pub id: String,
    /// File name.
    pub name: String,
    /// MIME type, e.g. `image/png`.
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Authenticated access to the Drive REST API.
#[derive(Debug, Clone)]
pub struct DriveClient {
    auth: GoogleAuth,
    base_url: String,
    http_client: reqwest::Client,
}

impl DriveClient {
    /// Create a client against the public Drive endpoint.
    pub fn new(auth: GoogleAuth) -> Self {
        Self {
            auth,
            base_url: DRIVE_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Use a different Drive endpoint.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Find a folder id by its exact name. Returns `None` if no folder matches.
    pub async fn folder_id(&mut self, name: &str) -> Result<Option<String>> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape(name),
            FOLDER_MIME
        );
        let files = self.list(&query).await?;
        Ok(files.into_iter().next().map(|f| f.id))
    }

    /// List the images directly inside a folder.
    pub async fn list_images(&mut self, folder_id: &str) -> Result<Vec<DriveFile>> {
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            escape(folder_id)
        );
        self.list(&query).await
    }

    /// Download a file's content.
    pub async fn download(&mut self, file_id: &str) -> Result<Vec<u8>> {
        let token = self.auth.access_token().await?;
        let response = self
            .http_client
            .get(format!("{}/files/{}", self.base_url, file_id))
            .query(&[("alt", "media")])
            .bearer_auth(token)
            .send()
            .await?;

        let response = check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Permanently delete a file.
    pub async fn delete(&mut self, file_id: &str) -> Result<()> {
        let token = self.auth.access_token().await?;
        let response = self
            .http_client
            .delete(format!("{}/files/{}", self.base_url, file_id))
            .bearer_auth(token)
            .send()
            .await?;

        check(response).await?;
        debug!(file_id, "deleted drive file");
        Ok(())
    }

    async fn list(&mut self, query: &str) -> Result<Vec<DriveFile>> {
        let token = self.auth.access_token().await?;
        let response = self
            .http_client
            .get(format!("{}/files", self.base_url))
            .query(&[
                ("q", query),
                ("fields", "files(id,name,mimeType)"),
                ("orderBy", "name"),
                ("pageSize", "1000"),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let list: FileList = check(response).await?.json().await?;
        Ok(list.files)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await?;
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|b| b.error.message)
        .unwrap_or(text);
    Err(Error::Drive(format!("{}: {}", status, message)))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
