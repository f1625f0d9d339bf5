//! Bulk flashcard creation for Anki.
//!
//! `autocards` reads phrases from a text file, or from images through OCR
//! (local folder or Google Drive), turns them into cards, and inserts them
//! into Anki, either through the AnkiConnect add-on or by filling AnkiWeb's
//! add page in a browser. Created cards are persisted until they are
//! inserted, so re-runs neither duplicate nor lose work.
//!
//! The pieces are pluggable:
//!
//! - a [`SourceAdmin`] produces cards ([`TextSourceAdmin`], [`ImageSourceAdmin`])
//! - a [`CardWriter`] turns phrases into cards ([`PhraseWriter`])
//! - a [`CardDeliverer`] inserts them ([`AnkiConnectDeliverer`], [`AnkiWebDeliverer`])
//! - a [`CardStore`] remembers what is still pending
//!
//! [`AutoCards`] wires them into one run.
//!
//! # Quick Start
//!
//! ```no_run
//! use autocards::Config;
//!
//! # async fn example() -> autocards::Result<()> {
//! let config = Config::from_file("autocards.toml")?;
//! let mut automaton = config.automaton()?;
//!
//! let report = automaton.run_task().await?;
//! println!("Inserted {} cards", report.inserted);
//! # Ok(())
//! # }
//! ```

pub mod anki;
mod automaton;
mod card;
pub mod config;
pub mod deliver;
mod error;
pub mod google;
pub mod image;
pub mod ocr;
pub mod source;
pub mod store;
pub mod text;
pub mod webdriver;
mod writer;

pub use anki::AnkiClient;
pub use automaton::{AutoCards, RunReport};
pub use card::{Card, DEFAULT_BACK};
pub use config::Config;
pub use deliver::{
    AnkiConnectDeliverer, AnkiConnectOptions, AnkiWebDeliverer, AnkiWebOptions, CardDeliverer,
    CardList,
};
pub use error::{Error, Result};
pub use image::{GoogleDriveSource, ImageData, ImageSource, LocalFolderSource};
pub use ocr::TextExtractor;
pub use source::{ImageSourceAdmin, SourceAdmin, TextSourceAdmin};
pub use store::{CardStore, IdStore, KvStore};
pub use writer::{CardWriter, Content, PhraseWriter};
