//! Error types for autocards.
//!
//! Every adapter (AnkiConnect, WebDriver, Google Drive, Google Vision, the
//! local store) reports through the same [`Error`] enum so the orchestration
//! loop can propagate with `?`.
//!
//! # Example
//!
//! ```no_run
//! use autocards::{Config, Error};
//!
//! match Config::from_file("autocards.toml") {
//!     Ok(config) => println!("delivering to {:?}", config.delivery.target),
//!     Err(Error::Config(msg)) => eprintln!("fix your config: {}", msg),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The error type for autocards operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP/network error from reqwest.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error while reading phrases, images or the store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error in the configuration file.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// AnkiConnect returned an error message.
    ///
    /// Common messages include:
    /// - "cannot create note because it is a duplicate"
    /// - "model was not found"
    #[error("AnkiConnect error: {0}")]
    AnkiConnect(String),

    /// Connection refused - Anki is likely not running.
    #[error("Could not connect to Anki. Is Anki running with AnkiConnect installed?")]
    ConnectionRefused,

    /// Permission denied by AnkiConnect.
    #[error("Permission denied. Request permission first or check API key.")]
    PermissionDenied,

    /// AnkiConnect response carried neither a result nor an error.
    #[error("AnkiConnect returned empty response")]
    EmptyResponse,

    /// The WebDriver server rejected a command.
    #[error("WebDriver error ({status}): {message}")]
    WebDriver {
        /// The W3C error code, e.g. "no such element".
        status: String,
        /// Human readable message from the driver.
        message: String,
    },

    /// Could not obtain an OAuth2 access token from Google.
    #[error("Google authentication failed: {0}")]
    GoogleAuth(String),

    /// The Google Drive API returned an error.
    #[error("Google Drive error: {0}")]
    Drive(String),

    /// The Google Vision API returned an error.
    #[error("Google Vision error: {0}")]
    Vision(String),

    /// The configured deck does not exist and may not be created.
    #[error("deck not found: {0}")]
    DeckNotFound(String),

    /// The image folder does not exist (locally or on Drive).
    #[error("folder not found: {0}")]
    FolderNotFound(String),
}

/// A specialized Result type for autocards operations.
pub type Result<T> = std::result::Result<T, Error>;
