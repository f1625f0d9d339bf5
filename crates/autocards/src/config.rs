//! TOML configuration and construction of the configured pipeline.
//!
//! # Example TOML
//!
//! ```toml
//! [source]
//! kind = "image"              # or "text"
//! text_file = "phrases.txt"
//!
//! [image]
//! kind = "drive"              # or "local"
//! folder = "Subtitles"
//!
//! [vision]
//! api_key = "AIza..."
//!
//! [drive]
//! client_id = "1234.apps.googleusercontent.com"
//! client_secret = "..."
//! refresh_token = "..."
//!
//! [delivery]
//! target = "anki-web"         # or "anki-connect"
//!
//! [deck]
//! name = "English::Phrases"
//! create_if_missing = true
//!
//! [anki_web]
//! email = "me@example.com"
//! password = "secret"
//! browser = "firefox"
//! headless = true
//!
//! [store]
//! path = "autocards.json"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::anki::{AnkiClient, DEFAULT_URL};
use crate::automaton::AutoCards;
use crate::card::DEFAULT_BACK;
use crate::deliver::{
    ANKIWEB_LOGIN_URL, AnkiConnectDeliverer, AnkiConnectOptions, AnkiWebDeliverer, AnkiWebOptions,
    CardDeliverer,
};
use crate::error::{Error, Result};
use crate::google::{DriveClient, GoogleAuth, VisionClient, auth::GOOGLE_TOKEN_URL};
use crate::google::{drive::DRIVE_URL, vision::VISION_URL};
use crate::image::{DEFAULT_EXTENSIONS, GoogleDriveSource, ImageSource, LocalFolderSource};
use crate::source::{ImageSourceAdmin, SourceAdmin, TextSourceAdmin};
use crate::store::{CardStore, IdStore, KvStore};
use crate::webdriver::{Browser, Capabilities};
use crate::writer::PhraseWriter;

/// The pipeline built from a [`Config`].
pub type ConfiguredAutoCards = AutoCards<Box<dyn CardDeliverer>, Box<dyn SourceAdmin>>;

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where phrases come from.
    pub source: SourceConfig,
    /// Image source settings.
    pub image: ImageConfig,
    /// Google Vision settings.
    pub vision: VisionConfig,
    /// Google Drive settings.
    pub drive: DriveConfig,
    /// Where cards go.
    pub delivery: DeliveryConfig,
    /// Target deck.
    pub deck: DeckConfig,
    /// Card content.
    pub card: CardConfig,
    /// AnkiConnect settings.
    pub anki_connect: AnkiConnectConfig,
    /// AnkiWeb browser settings.
    pub anki_web: AnkiWebConfig,
    /// Bookkeeping file.
    pub store: StoreConfig,

    #[serde(skip)]
    base_dir: PathBuf,
}

/// Kind of content source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A text file of phrases.
    #[default]
    Text,
    /// Images run through OCR.
    Image,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Text or image.
    pub kind: SourceKind,
    /// Phrase file for the text source.
    pub text_file: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Text,
            text_file: PathBuf::from("phrases.txt"),
        }
    }
}

/// Where images are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// A local folder.
    #[default]
    Local,
    /// A Google Drive folder.
    Drive,
}

/// `[image]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Local folder or Drive folder.
    pub kind: ImageKind,
    /// Local folder path, or Drive folder name.
    pub folder: String,
    /// Accepted extensions for local folders.
    pub extensions: Vec<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            kind: ImageKind::Local,
            folder: String::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// `[vision]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Google Cloud API key.
    pub api_key: String,
    /// Vision REST endpoint.
    pub endpoint: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: VISION_URL.to_string(),
        }
    }
}

/// `[drive]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// OAuth2 refresh token.
    pub refresh_token: String,
    /// Drive REST endpoint.
    pub endpoint: String,
    /// OAuth2 token endpoint.
    pub token_endpoint: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            endpoint: DRIVE_URL.to_string(),
            token_endpoint: GOOGLE_TOKEN_URL.to_string(),
        }
    }
}

/// Delivery backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryTarget {
    /// A local Anki with the AnkiConnect add-on.
    #[default]
    AnkiConnect,
    /// AnkiWeb through a browser.
    AnkiWeb,
}

/// `[delivery]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Backend used to insert cards.
    pub target: DeliveryTarget,
}

/// `[deck]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Deck name. Empty keeps the service's default deck.
    pub name: String,
    /// Create the deck if it is missing.
    pub create_if_missing: bool,
}

/// `[card]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Text for the back of every card.
    pub back: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            back: DEFAULT_BACK.to_string(),
        }
    }
}

/// `[anki_connect]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnkiConnectConfig {
    /// AnkiConnect URL.
    pub url: String,
    /// Optional API key.
    pub api_key: Option<String>,
    /// Note type.
    pub model: String,
    /// Field for the card front.
    pub front_field: String,
    /// Field for the card back.
    pub back_field: String,
    /// Tags added to every note.
    pub tags: Vec<String>,
    /// Sync with AnkiWeb after delivering.
    pub sync: bool,
}

impl Default for AnkiConnectConfig {
    fn default() -> Self {
        let options = AnkiConnectOptions::default();
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: None,
            model: options.model,
            front_field: options.front_field,
            back_field: options.back_field,
            tags: Vec::new(),
            sync: false,
        }
    }
}

/// `[anki_web]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnkiWebConfig {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// WebDriver server URL.
    pub webdriver_url: String,
    /// `firefox` or `chrome`.
    pub browser: String,
    /// Run the browser without a window.
    pub headless: bool,
    /// Login page.
    pub login_url: String,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Implicit wait for element lookups, in seconds.
    pub implicit_wait_secs: u64,
    /// Pause between page actions, in milliseconds.
    pub pause_millis: u64,
}

impl Default for AnkiWebConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            webdriver_url: "http://localhost:4444".to_string(),
            browser: "firefox".to_string(),
            headless: true,
            login_url: ANKIWEB_LOGIN_URL.to_string(),
            window_width: 1366,
            window_height: 747,
            implicit_wait_secs: 30,
            pause_millis: 1000,
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON bookkeeping file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("autocards.json"),
        }
    }
}

impl Config {
    /// Load and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse and validate a configuration string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the selected source and delivery have what they need.
    pub fn validate(&self) -> Result<()> {
        match self.source.kind {
            SourceKind::Text => {
                if self.source.text_file.as_os_str().is_empty() {
                    return Err(Error::Config("source.text_file is empty".into()));
                }
            }
            SourceKind::Image => {
                if self.image.folder.trim().is_empty() {
                    return Err(Error::Config("image.folder is required for image sources".into()));
                }
                if self.vision.api_key.trim().is_empty() {
                    return Err(Error::Config("vision.api_key is required for image sources".into()));
                }
                if self.image.kind == ImageKind::Drive
                    && [
                        &self.drive.client_id,
                        &self.drive.client_secret,
                        &self.drive.refresh_token,
                    ]
                    .iter()
                    .any(|v| v.trim().is_empty())
                {
                    return Err(Error::Config(
                        "drive.client_id, drive.client_secret and drive.refresh_token are required for drive images"
                            .into(),
                    ));
                }
            }
        }

        if self.delivery.target == DeliveryTarget::AnkiWeb {
            self.anki_web.browser.parse::<Browser>()?;
            if self.anki_web.email.trim().is_empty() || self.anki_web.password.is_empty() {
                return Err(Error::Config(
                    "anki_web.email and anki_web.password are required for anki-web delivery".into(),
                ));
            }
        }

        Ok(())
    }

    /// Resolve a configured path against the configuration file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// The configured deck, if any.
    pub fn deck_name(&self) -> Option<String> {
        let name = self.deck.name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// The bookkeeping key-value file.
    pub fn kv_store(&self) -> KvStore {
        KvStore::new(self.resolve(&self.store.path))
    }

    /// The card store.
    pub fn card_store(&self) -> CardStore {
        CardStore::new(self.kv_store())
    }

    /// A writer with the configured back text.
    pub fn writer(&self) -> PhraseWriter {
        PhraseWriter::with_back(self.card.back.clone())
    }

    /// Build the configured source admin.
    pub fn source_admin(&self) -> Result<Box<dyn SourceAdmin>> {
        match self.source.kind {
            SourceKind::Text => Ok(Box::new(TextSourceAdmin::new(
                self.resolve(&self.source.text_file),
                self.writer(),
            ))),
            SourceKind::Image => {
                let extractor =
                    VisionClient::new(self.vision.api_key.clone()).url(self.vision.endpoint.clone());
                Ok(Box::new(ImageSourceAdmin::new(
                    self.image_source(),
                    self.writer(),
                    extractor,
                )))
            }
        }
    }

    /// Build the configured image source.
    pub fn image_source(&self) -> Box<dyn ImageSource> {
        match self.image.kind {
            ImageKind::Local => Box::new(
                LocalFolderSource::new(self.resolve(Path::new(&self.image.folder)))
                    .extensions(self.image.extensions.clone()),
            ),
            ImageKind::Drive => {
                let auth = GoogleAuth::new(
                    self.drive.client_id.clone(),
                    self.drive.client_secret.clone(),
                    self.drive.refresh_token.clone(),
                )
                .token_url(self.drive.token_endpoint.clone());
                let drive = DriveClient::new(auth).url(self.drive.endpoint.clone());
                Box::new(GoogleDriveSource::new(
                    self.image.folder.clone(),
                    drive,
                    IdStore::new(self.kv_store()),
                ))
            }
        }
    }

    /// Build the configured deliverer.
    pub fn deliverer(&self) -> Result<Box<dyn CardDeliverer>> {
        match self.delivery.target {
            DeliveryTarget::AnkiConnect => {
                let c = &self.anki_connect;
                let client = AnkiClient::with_url(c.url.clone(), c.api_key.clone());
                let options = AnkiConnectOptions {
                    deck: self.deck_name(),
                    create_deck: self.deck.create_if_missing,
                    model: c.model.clone(),
                    front_field: c.front_field.clone(),
                    back_field: c.back_field.clone(),
                    tags: c.tags.clone(),
                    sync: c.sync,
                };
                Ok(Box::new(AnkiConnectDeliverer::new(client, options)))
            }
            DeliveryTarget::AnkiWeb => {
                let w = &self.anki_web;
                let browser = w.browser.parse::<Browser>()?;
                let options = AnkiWebOptions {
                    webdriver_url: w.webdriver_url.clone(),
                    capabilities: Capabilities::new(browser, w.headless),
                    email: w.email.clone(),
                    password: w.password.clone(),
                    deck: self.deck_name(),
                    login_url: w.login_url.clone(),
                    window_size: (w.window_width, w.window_height),
                    implicit_wait: Duration::from_secs(w.implicit_wait_secs),
                    pause: Duration::from_millis(w.pause_millis),
                };
                Ok(Box::new(AnkiWebDeliverer::new(options)))
            }
        }
    }

    /// Build the whole pipeline.
    pub fn automaton(&self) -> Result<ConfiguredAutoCards> {
        Ok(AutoCards::new(
            self.deliverer()?,
            self.source_admin()?,
            self.card_store(),
        ))
    }
}
